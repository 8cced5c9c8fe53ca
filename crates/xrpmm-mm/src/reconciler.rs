//! Offer reconciliation.
//!
//! Cancels every resting offer for the pair when the traded-asset balance
//! moved since the last cancellation pass (a fill happened) or when the
//! wall-clock minute hits the periodic reset interval.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use xrpmm_core::{OpenOffer, OrderSide};
use xrpmm_ledger::{LedgerClient, SubmitOutcome};

/// Why a cancellation pass ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CancelReason {
    /// Observed balance differs from the one cached at the last pass.
    /// `previous` is `None` before the first pass.
    BalanceChanged {
        previous: Option<Decimal>,
        observed: Decimal,
    },
    /// Minute of the hour is a multiple of the reset interval.
    PeriodicReset { minute: u32 },
}

impl CancelReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BalanceChanged { .. } => "balance_changed",
            Self::PeriodicReset { .. } => "periodic_reset",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BalanceChanged {
                previous: Some(previous),
                observed,
            } => write!(f, "balance changed {previous} -> {observed}"),
            Self::BalanceChanged {
                previous: None,
                observed,
            } => write!(f, "no cached balance (observed {observed})"),
            Self::PeriodicReset { minute } => write!(f, "periodic reset at minute {minute}"),
        }
    }
}

/// Outcome of cancelling one offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelResult {
    pub sequence: u32,
    pub side: Option<OrderSide>,
    pub outcome: SubmitOutcome,
}

/// Aggregated result of one reconciliation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// `None` when no pass ran.
    pub reason: Option<CancelReason>,
    pub results: Vec<CancelResult>,
}

impl ReconcileOutcome {
    pub fn ran(&self) -> bool {
        self.reason.is_some()
    }

    pub fn accepted(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.accepted()
    }
}

/// Cancel policy plus the balance cached at the last cancellation pass.
#[derive(Debug)]
pub struct OrderReconciler {
    reset_interval_minutes: u32,
    last_asset_balance: Option<Decimal>,
}

impl OrderReconciler {
    /// `reset_interval_minutes` must be at least 1; zero is treated as 1.
    pub fn new(reset_interval_minutes: u32) -> Self {
        Self {
            reset_interval_minutes: reset_interval_minutes.max(1),
            last_asset_balance: None,
        }
    }

    pub fn last_asset_balance(&self) -> Option<Decimal> {
        self.last_asset_balance
    }

    /// True at minutes that are exact multiples of the reset interval.
    pub fn is_reset_minute(&self, minute: u32) -> bool {
        minute % self.reset_interval_minutes == 0
    }

    /// Decide whether resting offers must go. Balance change wins over the
    /// periodic reset when both apply.
    pub fn cancel_reason(&self, observed: Decimal, minute: u32) -> Option<CancelReason> {
        if self.last_asset_balance != Some(observed) {
            return Some(CancelReason::BalanceChanged {
                previous: self.last_asset_balance,
                observed,
            });
        }
        if self.is_reset_minute(minute) {
            return Some(CancelReason::PeriodicReset { minute });
        }
        None
    }

    /// Cancel `offers` one by one if policy says so.
    ///
    /// A failed cancel is logged and the rest are still attempted. The
    /// cached balance is updated only when a pass runs.
    pub async fn reconcile(
        &mut self,
        ledger: &dyn LedgerClient,
        offers: &[OpenOffer],
        observed: Decimal,
        minute: u32,
    ) -> ReconcileOutcome {
        if offers.is_empty() {
            return ReconcileOutcome::default();
        }
        let Some(reason) = self.cancel_reason(observed, minute) else {
            return ReconcileOutcome::default();
        };

        info!(%reason, offers = offers.len(), "Cancelling resting offers");

        let mut results = Vec::with_capacity(offers.len());
        for offer in offers {
            let outcome = ledger.cancel_offer(offer.sequence).await;
            if outcome.is_success() {
                info!(seq = offer.sequence, side = ?offer.side(), "Offer cancelled");
            } else {
                warn!(seq = offer.sequence, %outcome, "Offer cancel failed");
            }
            results.push(CancelResult {
                sequence: offer.sequence,
                side: offer.side(),
                outcome,
            });
        }

        self.last_asset_balance = Some(observed);

        ReconcileOutcome {
            reason: Some(reason),
            results,
        }
    }
}
