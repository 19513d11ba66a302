//! Error types for the binary lifecycle manager
//!
//! Every failure mode of resolution, installation, and command compilation is
//! represented here so callers can distinguish "nothing to launch yet" from
//! genuine defects. `InstallationInvariant` in particular marks a broken
//! managed installation after a nominally successful extraction, which is an
//! unrecoverable condition the host must surface loudly rather than fold into
//! a generic "not installed" message.

use thiserror::Error;

/// Errors that can occur while resolving, installing, or launching the server
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Release feed request failed: {message}")]
    Network { message: String },

    #[error("No numeric components in release tag '{tag}'")]
    Parse { tag: String },

    #[error("Failed to download server archive: {message}")]
    Download { message: String },

    #[error("Failed to extract server archive: {message}")]
    Extraction { message: String },

    #[error("Managed installation is invalid after extraction: {message}")]
    InstallationInvariant { message: String },

    #[error("Type {type_name} not supported for setting {key}")]
    UnsupportedValueType { key: String, type_name: String },

    #[error("clangd is currently not installed: {reason}")]
    NotInstalled { reason: String },

    #[error("I/O error during installation: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for ManagerError {
    fn from(err: std::io::Error) -> Self {
        ManagerError::Io {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ManagerError {
    fn from(err: reqwest::Error) -> Self {
        ManagerError::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for manager operations
pub type ManagerResult<T> = Result<T, ManagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ManagerError = io.into();
        assert!(matches!(err, ManagerError::Io { .. }));
    }

    #[test]
    fn unsupported_value_type_names_the_key() {
        let err = ManagerError::UnsupportedValueType {
            key: "clangd.header-insertion".to_string(),
            type_name: "array".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("clangd.header-insertion"));
        assert!(rendered.contains("array"));
    }
}
