//! One market making cycle.
//!
//! ```text
//! read books, balances, pair offers
//!   ├─ reconcile: cancel all pair offers if balance moved or reset minute
//!   ├─ offers still open? → skip quoting
//!   ├─ either book empty? → skip quoting
//!   └─ evaluate sell/buy, submit each eligible quote
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use xrpmm_core::{BookSide, Clock, IssuedAsset, MarketSnapshot, OrderSide};
use xrpmm_ledger::{DynLedgerClient, SubmitOutcome};

use crate::config::MakerConfig;
use crate::error::MakerResult;
use crate::quote_engine::{evaluate_quotes, DesiredQuote, QuoteDecision};
use crate::reconciler::{OrderReconciler, ReconcileOutcome};
use crate::snapshot::{BookTop, SnapshotReader};

/// Why a cycle placed no quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "skip", rename_all = "snake_case")]
pub enum CycleSkip {
    /// One or both books had no usable liquidity.
    NoLiquidity { missing: Vec<BookSide> },
    /// Pair offers still rest after reconciliation.
    OffersStillOpen { count: usize },
    /// Both sides were filtered out.
    NothingToQuote,
}

impl CycleSkip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoLiquidity { .. } => "no_liquidity",
            Self::OffersStillOpen { .. } => "offers_still_open",
            Self::NothingToQuote => "nothing_to_quote",
        }
    }
}

impl fmt::Display for CycleSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quote that was sent to the ledger and what came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSubmission {
    pub quote: DesiredQuote,
    pub outcome: SubmitOutcome,
}

/// Everything a cycle saw and did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub minute: u32,
    pub book: BookTop,
    pub snapshot: Option<MarketSnapshot>,
    pub reconcile: ReconcileOutcome,
    /// Per-side evaluation; empty when quoting was skipped before pricing.
    pub evaluations: Vec<(OrderSide, QuoteDecision)>,
    pub submissions: Vec<QuoteSubmission>,
    pub skip: Option<CycleSkip>,
}

impl CycleReport {
    pub fn quotes_accepted(&self) -> usize {
        self.submissions
            .iter()
            .filter(|s| s.outcome.is_success())
            .count()
    }

    /// Log the cycle summary.
    pub fn log(&self) {
        info!(
            minute = self.minute,
            ask = ?self.book.ask,
            bid = ?self.book.bid,
            mid = ?self.snapshot.as_ref().map(|s| s.mid_rate),
            cancel_reason = self.reconcile.reason.map(|r| r.as_str()).unwrap_or("-"),
            cancelled = self.reconcile.accepted(),
            cancel_failed = self.reconcile.failed(),
            submitted = self.submissions.len(),
            accepted = self.quotes_accepted(),
            skip = self.skip.as_ref().map(|s| s.as_str()).unwrap_or("-"),
            "Cycle complete"
        );
    }
}

/// Runs cycles for one pair. Holds the only cross-cycle state: the
/// reconciler's cached balance.
pub struct CycleEngine {
    ledger: DynLedgerClient,
    clock: Arc<dyn Clock>,
    reader: SnapshotReader,
    reconciler: OrderReconciler,
    asset: IssuedAsset,
    config: MakerConfig,
}

impl CycleEngine {
    pub fn new(
        ledger: DynLedgerClient,
        clock: Arc<dyn Clock>,
        asset: IssuedAsset,
        config: MakerConfig,
    ) -> MakerResult<Self> {
        config.validate()?;
        Ok(Self {
            reader: SnapshotReader::new(Arc::clone(&ledger), asset.clone()),
            reconciler: OrderReconciler::new(config.reset_interval_minutes),
            ledger,
            clock,
            asset,
            config,
        })
    }

    pub fn config(&self) -> &MakerConfig {
        &self.config
    }

    pub fn asset(&self) -> &IssuedAsset {
        &self.asset
    }

    pub fn reconciler(&self) -> &OrderReconciler {
        &self.reconciler
    }

    /// Run one cycle. Errors only for failed balance or offer reads.
    pub async fn run_cycle(&mut self) -> MakerResult<CycleReport> {
        let started_at = self.clock.now();
        let minute = self.clock.minute_of_hour();

        let read = self.reader.read().await?;
        let snapshot = read.snapshot()?;

        let reconcile = self
            .reconciler
            .reconcile(
                self.ledger.as_ref(),
                &read.offers,
                read.asset_balance,
                minute,
            )
            .await;

        let mut report = CycleReport {
            started_at,
            minute,
            book: read.book,
            snapshot,
            reconcile,
            evaluations: Vec::new(),
            submissions: Vec::new(),
            skip: None,
        };

        // Re-read only if something was resting at the start.
        let remaining = if read.offers.is_empty() {
            0
        } else {
            self.reader.pair_offers().await?.len()
        };
        if remaining > 0 {
            debug!(remaining, "Pair offers still open, not quoting");
            report.skip = Some(CycleSkip::OffersStillOpen { count: remaining });
            return Ok(report);
        }

        let Some(snapshot) = report.snapshot.clone() else {
            let missing = report.book.missing();
            info!(?missing, "No liquidity, not quoting");
            report.skip = Some(CycleSkip::NoLiquidity { missing });
            return Ok(report);
        };

        for (side, decision) in evaluate_quotes(&snapshot, &self.config) {
            match &decision {
                Ok(quote) => {
                    let outcome = self.ledger.create_offer(quote.to_request(&self.asset)).await;
                    if outcome.is_success() {
                        info!(
                            %side,
                            rate = %quote.rate,
                            size = %quote.size,
                            notional = %quote.notional,
                            "Offer placed"
                        );
                    } else {
                        warn!(%side, rate = %quote.rate, size = %quote.size, %outcome, "Offer create failed");
                    }
                    report.submissions.push(QuoteSubmission {
                        quote: quote.clone(),
                        outcome,
                    });
                }
                Err(skip) => debug!(%side, reason = %skip, "No quote"),
            }
            report.evaluations.push((side, decision));
        }

        if report.submissions.is_empty() {
            report.skip = Some(CycleSkip::NothingToQuote);
        }

        Ok(report)
    }
}
