//! Decision engine error types.

use thiserror::Error;
use xrpmm_core::CoreError;
use xrpmm_ledger::LedgerError;

/// Errors that end the current cycle.
///
/// Submission failures are not errors here; they are reported as
/// `SubmitOutcome` values inside the cycle report.
#[derive(Debug, Error)]
pub enum MakerError {
    #[error("Balance read failed: {0}")]
    BalanceRead(#[source] LedgerError),

    #[error("Open offer read failed: {0}")]
    OfferRead(#[source] LedgerError),

    #[error("Invalid maker config: {0}")]
    InvalidConfig(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type MakerResult<T> = Result<T, MakerError>;
