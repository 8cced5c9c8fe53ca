//! Market making decision engine for a single XRPL pair.
//!
//! Provides:
//! - Quote calculation toward a target inventory ratio
//! - Market snapshot reading with explicit no-liquidity handling
//! - Offer reconciliation (fill detection and periodic reset)
//!
//! # Architecture
//!
//! ```text
//! Scheduler tick → CycleEngine.run_cycle()
//!                  ├─ SnapshotReader: books, balances, pair offers
//!                  ├─ OrderReconciler: cancel-all decision
//!                  └─ QuoteEngine: sell/buy quotes
//!                       ↓
//!                  LedgerClient.create_offer()
//! ```

pub mod config;
pub mod cycle;
pub mod error;
pub mod quote_engine;
pub mod reconciler;
pub mod snapshot;

pub use config::MakerConfig;
pub use cycle::{CycleEngine, CycleReport, CycleSkip, QuoteSubmission};
pub use error::{MakerError, MakerResult};
pub use quote_engine::{
    buy_quote, compute_quotes, evaluate_quotes, sell_quote, DesiredQuote, QuoteDecision, QuoteSkip,
};
pub use reconciler::{CancelReason, CancelResult, OrderReconciler, ReconcileOutcome};
pub use snapshot::{BookTop, MarketRead, SnapshotReader};
