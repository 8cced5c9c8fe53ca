//! Ledger client error types.

use thiserror::Error;
use xrpmm_core::CoreError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Not connected to ledger node")]
    NotConnected,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: String, message: String },

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Secret error: {0}")]
    Secret(String),

    #[error("Invalid ledger configuration: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
