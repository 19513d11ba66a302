//! Binary resolution and lifecycle management for the clangd language server.
//!
//! This crate decides whether a usable server binary exists, where it comes
//! from (system PATH, a managed download, or a user-supplied custom launch
//! command), fetches and installs it when missing, and compiles declarative
//! configuration into a deterministic process launch command on behalf of an
//! editor integration.
//!
//! # Architecture Overview
//!
//! - **Release feed**: latest published release lookup and version parsing
//! - **Binary location**: strategy-driven, read-only resolution of the server
//! - **Installation**: download, staged extraction, and atomic replacement of
//!   the managed server tree
//! - **Command compilation**: ordered mapping of `clangd.*` settings onto
//!   command-line flags
//! - **Lifecycle control**: per-start-cycle orchestration of the above
//!
//! The editor's plugin hooks, settings persistence, and the transport to the
//! running server process are external collaborators; each cycle receives one
//! explicit configuration snapshot and returns a freshly built launch command.

pub mod command;
pub mod config;
pub mod errors;
pub mod installation;
pub mod lifecycle;
pub mod lsp;
pub mod platform;
pub mod release;

pub use config::{BinaryStrategy, ClangdConfig};
pub use errors::{ManagerError, ManagerResult};
pub use installation::{default_managed_root, BinaryLocator, Installer, ServerProvisioner};
pub use lifecycle::{FallbackDecision, InstallConsent, LifecycleController, NeverInstall};
pub use platform::Platform;
pub use release::{ReleaseFeed, ReleaseVersion};
