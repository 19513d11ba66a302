//! Pass-through request surface for the running server
//!
//! The host owns the connection to the server process; this module only
//! defines the one custom request the manager forwards and how its response
//! is turned into a file path. Transport failures and empty responses are
//! reported, never raised.

use crate::config::SESSION_NAME;
use crate::errors::ManagerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Method name of the source/header counterpart request
pub const SWITCH_SOURCE_HEADER_METHOD: &str = "textDocument/switchSourceHeader";

/// Request params: the document whose counterpart is wanted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

/// Seam to the already-running server process, owned by the host session
#[async_trait]
pub trait ServerTransport: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ManagerError>;
}

/// Ask the server for the counterpart of `uri` (header for a source file and
/// vice versa). Returns `None` when the server knows no counterpart or the
/// transport fails.
pub async fn switch_source_header(
    transport: &dyn ServerTransport,
    uri: &str,
) -> Option<PathBuf> {
    let params = serde_json::to_value(TextDocumentIdentifier {
        uri: uri.to_string(),
    })
    .ok()?;

    match transport.request(SWITCH_SOURCE_HEADER_METHOD, params).await {
        Ok(response) => {
            let target = target_file_path(&response);
            if target.is_none() {
                log::info!("{}: no corresponding file found", SESSION_NAME);
            }
            target
        }
        Err(e) => {
            log::warn!("{}: switchSourceHeader request failed: {}", SESSION_NAME, e);
            None
        }
    }
}

/// Parse the server's response, a file URI string that may be empty or null
pub fn target_file_path(response: &Value) -> Option<PathBuf> {
    let uri = response.as_str()?;
    if uri.is_empty() {
        return None;
    }
    url::Url::parse(uri)
        .ok()
        .and_then(|parsed| parsed.to_file_path().ok())
}
