//! Binary resolution and installation for the managed server
//!
//! The locator performs read-only strategy-driven resolution; the installer
//! is the only component that touches the network beyond the release feed and
//! the only one mutating persistent storage. Installation is not safe to run
//! concurrently against the same managed root; the host serializes install
//! requests per storage subpath.

pub mod installer;
pub mod locator;


use crate::errors::ManagerError;
use async_trait::async_trait;
use std::path::PathBuf;

// Re-exports for convenience
pub use installer::Installer;
pub use locator::BinaryLocator;

/// Seam between the lifecycle controller and the concrete installer
#[async_trait]
pub trait ServerProvisioner: Send + Sync {
    /// Install the pinned server release, returning the new binary path
    async fn provision(&self, version: &str) -> Result<PathBuf, ManagerError>;
}

/// Default managed storage root: `~/.clank/LSP-clangd`
pub fn default_managed_root() -> Result<PathBuf, ManagerError> {
    dirs::home_dir()
        .map(|home| home.join(".clank").join(crate::config::STORAGE_DIR))
        .ok_or_else(|| ManagerError::Io {
            message: "could not determine home directory".to_string(),
        })
}
