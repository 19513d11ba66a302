//! Configuration type definitions for the lifecycle manager

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the managed language server
pub const SESSION_NAME: &str = "clangd";

/// Directory under the host's storage root holding the managed installation
pub const STORAGE_DIR: &str = "LSP-clangd";

/// Release the managed installation is pinned to
pub const PINNED_RELEASE: &str = "15.0.1";

/// Prefix of the settings keys forwarded to the server command line
pub const SETTING_PREFIX: &str = "clangd.";

/// GitHub repository the managed binary is published from
pub const SERVER_REPOSITORY: &str = "clangd/clangd";

/// User-selected policy governing which binary source is trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BinaryStrategy {
    /// The binary must already be on PATH or at the configured path
    System,
    /// The binary must live in the managed storage location
    Managed,
    /// PATH first, managed installation as fallback
    #[default]
    Auto,
    /// The configured launch command is used verbatim, no resolution
    Custom,
}

/// One snapshot of the host configuration, read at the start of a cycle
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClangdConfig {
    #[serde(default)]
    pub binary: BinaryStrategy,

    /// Path or executable name to prefer under the `system` strategy
    #[serde(default)]
    pub system_binary: Option<String>,

    /// Full launch command used verbatim when `binary` is `custom`
    #[serde(default)]
    pub custom_command: Vec<String>,

    /// `clangd.*` settings in declaration order
    #[serde(default)]
    pub settings: Map<String, Value>,
}
