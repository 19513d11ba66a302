//! Configuration snapshot types for server resolution and launch
//!
//! The host's settings store is an external collaborator; each start cycle
//! reads one immutable [`ClangdConfig`] snapshot and passes it down
//! explicitly, so resolution and command compilation stay pure functions of
//! their inputs.

pub mod types;

pub use types::*;
