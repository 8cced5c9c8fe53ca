//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] xrpmm_ledger::LedgerError),

    #[error("Maker error: {0}")]
    Maker(#[from] xrpmm_mm::MakerError),

    #[error("Core error: {0}")]
    Core(#[from] xrpmm_core::CoreError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] xrpmm_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
