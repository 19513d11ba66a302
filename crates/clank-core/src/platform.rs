//! Platform lookup tables for artifact naming and binary filenames

/// Platform detection for release-artifact and binary naming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
}

impl Platform {
    /// Get the current platform
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
        }
    }

    /// Token used in release artifact names.
    ///
    /// macOS builds are published under "mac"; the remap is part of the
    /// artifact naming contract, not a cosmetic choice.
    pub fn artifact_token(&self) -> &str {
        match self.os.as_str() {
            "macos" => "mac",
            "windows" => "windows",
            "linux" => "linux",
            other => other,
        }
    }

    /// Filename of the server binary on this platform
    pub fn binary_name(&self, server: &str) -> String {
        if self.os == "windows" {
            format!("{}.exe", server)
        } else {
            server.to_string()
        }
    }
}
