//! Read-only resolution of a usable server binary

use crate::config::{BinaryStrategy, SESSION_NAME};
use crate::platform::Platform;
use std::path::{Path, PathBuf};
use which::which;

/// Resolves the server binary for a strategy without touching anything
#[derive(Debug, Clone)]
pub struct BinaryLocator {
    managed_root: PathBuf,
    pinned_version: String,
    platform: Platform,
}

impl BinaryLocator {
    pub fn new(managed_root: PathBuf, pinned_version: impl Into<String>) -> Self {
        Self {
            managed_root,
            pinned_version: pinned_version.into(),
            platform: Platform::current(),
        }
    }

    /// Override the detected platform (used by tests)
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Expected path of the managed binary for the pinned release
    pub fn managed_binary_path(&self) -> PathBuf {
        self.managed_root
            .join(format!("{}_{}", SESSION_NAME, self.pinned_version))
            .join("bin")
            .join(self.platform.binary_name(SESSION_NAME))
    }

    /// Resolve the binary for `strategy`, or report unresolved.
    ///
    /// `custom` always resolves to `None`: the caller uses the configured
    /// launch command verbatim and never consults the locator.
    pub fn resolve(&self, strategy: BinaryStrategy, system_hint: Option<&str>) -> Option<PathBuf> {
        match strategy {
            BinaryStrategy::System => self.resolve_system(system_hint),
            BinaryStrategy::Managed => self.resolve_managed(),
            BinaryStrategy::Auto => self
                .resolve_system(system_hint)
                .or_else(|| self.resolve_managed()),
            BinaryStrategy::Custom => None,
        }
    }

    /// Search PATH for the server, or honor the configured hint.
    ///
    /// The hint wins when it names an existing file; otherwise it is treated
    /// as an executable name and searched for on PATH.
    fn resolve_system(&self, system_hint: Option<&str>) -> Option<PathBuf> {
        match system_hint {
            Some(hint) => {
                let candidate = Path::new(hint);
                if candidate.is_file() {
                    return Some(candidate.to_path_buf());
                }
                which(hint).ok()
            }
            None => which(SESSION_NAME).ok(),
        }
    }

    fn resolve_managed(&self) -> Option<PathBuf> {
        let binary_path = self.managed_binary_path();
        if binary_path.is_file() {
            Some(binary_path)
        } else {
            None
        }
    }
}
