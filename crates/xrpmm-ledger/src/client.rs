//! Ledger client trait.
//!
//! The decision engine only talks to the ledger through [`LedgerClient`],
//! which lets tests drive full cycles against [`crate::MockLedger`].

use std::pin::Pin;
use std::sync::Arc;

use rust_decimal::Decimal;
use xrpmm_core::{BookSide, IssuedAsset, OfferRequest, OpenOffer, TopOfBook};

use crate::error::LedgerResult;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Engine results the ledger reports for an applied or queued transaction.
const ACCEPTED_ENGINE_RESULTS: &[&str] = &["tesSUCCESS", "terQUEUED"];

/// Result of a cancel or create submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The node applied or queued the transaction.
    Accepted { engine_result: String },
    /// The node answered with a non-success engine result.
    Rejected {
        engine_result: String,
        message: String,
    },
    /// The request never produced an engine result.
    Failed(String),
}

impl SubmitOutcome {
    /// Classify an engine result code.
    pub fn from_engine_result(engine_result: String, message: String) -> Self {
        if ACCEPTED_ENGINE_RESULTS.contains(&engine_result.as_str()) {
            Self::Accepted { engine_result }
        } else {
            Self::Rejected {
                engine_result,
                message,
            }
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "accepted",
            Self::Rejected { .. } => "rejected",
            Self::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted { engine_result } => write!(f, "accepted ({engine_result})"),
            Self::Rejected {
                engine_result,
                message,
            } => write!(f, "rejected ({engine_result}: {message})"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Operations the market maker needs from the ledger.
///
/// The operating account is a property of the client, not a parameter.
pub trait LedgerClient: Send + Sync {
    /// Establish the session. Fatal at startup when it fails.
    fn connect(&self) -> BoxFuture<'_, LedgerResult<()>>;

    fn disconnect(&self) -> BoxFuture<'_, LedgerResult<()>>;

    /// All offers currently resting for the account.
    fn list_open_offers(&self) -> BoxFuture<'_, LedgerResult<Vec<OpenOffer>>>;

    /// Best entry of one side of the native/`asset` book; `None` when empty.
    fn top_of_book<'a>(
        &'a self,
        side: BookSide,
        asset: &'a IssuedAsset,
    ) -> BoxFuture<'a, LedgerResult<Option<TopOfBook>>>;

    /// Spendable native balance from validated state, reserve subtracted.
    fn native_balance(&self) -> BoxFuture<'_, LedgerResult<Decimal>>;

    /// Trust line balance for `asset`; zero when no line exists.
    fn asset_balance<'a>(&'a self, asset: &'a IssuedAsset) -> BoxFuture<'a, LedgerResult<Decimal>>;

    fn cancel_offer(&self, sequence: u32) -> BoxFuture<'_, SubmitOutcome>;

    fn create_offer(&self, request: OfferRequest) -> BoxFuture<'_, SubmitOutcome>;
}

/// Arc wrapper for LedgerClient trait objects.
pub type DynLedgerClient = Arc<dyn LedgerClient>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_result_classification() {
        let ok = SubmitOutcome::from_engine_result("tesSUCCESS".into(), String::new());
        assert!(ok.is_success());

        let queued = SubmitOutcome::from_engine_result("terQUEUED".into(), String::new());
        assert!(queued.is_success());

        let unfunded = SubmitOutcome::from_engine_result(
            "tecUNFUNDED_OFFER".into(),
            "Insufficient balance to fund created offer.".into(),
        );
        assert!(!unfunded.is_success());
        assert_eq!(unfunded.label(), "rejected");
    }

    #[test]
    fn test_failed_is_not_success() {
        let failed = SubmitOutcome::Failed("connection reset".into());
        assert!(!failed.is_success());
        assert_eq!(failed.to_string(), "failed (connection reset)");
    }
}
