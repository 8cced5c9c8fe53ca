//! Prometheus metrics for the market maker.
//!
//! Covers:
//! - Cycle outcomes, durations and skipped ticks
//! - Cancel and create submissions
//! - Quote skips by reason
//! - Balances and mid rate of the last cycle
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, which is a startup-time programming error.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_histogram, CounterVec,
    Encoder, Gauge, GaugeVec, Histogram, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Completed cycles.
/// Labels: outcome (quoted/skipped/failed)
pub static CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xrpmm_cycles_total",
        "Total market making cycles by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Timer ticks dropped because a cycle was still running.
pub static TICKS_SKIPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xrpmm_ticks_skipped_total",
        "Scheduler ticks skipped while a cycle was in flight",
        &["reason"]
    )
    .unwrap()
});

/// Cycle wall time in milliseconds.
pub static CYCLE_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "xrpmm_cycle_duration_ms",
        "Market making cycle duration in milliseconds",
        vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 20000.0, 40000.0]
    )
    .unwrap()
});

/// Offer cancellations.
/// Labels: reason (balance_changed/periodic_reset), result (accepted/rejected/failed)
pub static CANCELS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xrpmm_cancels_total",
        "Total offer cancel submissions",
        &["reason", "result"]
    )
    .unwrap()
});

/// Offer creations.
/// Labels: side (buy/sell), result (accepted/rejected/failed)
pub static CREATES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xrpmm_creates_total",
        "Total offer create submissions",
        &["side", "result"]
    )
    .unwrap()
});

/// Sides or cycles that produced no quote.
pub static QUOTE_SKIPS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xrpmm_quote_skips_total",
        "Quotes not placed, by side and reason",
        &["side", "reason"]
    )
    .unwrap()
});

/// Balances seen by the last successful read.
/// Labels: asset (native/issued)
pub static BALANCE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "xrpmm_balance",
        "Balance observed in the last cycle",
        &["asset"]
    )
    .unwrap()
});

/// Mid rate of the last priced cycle.
pub static MID_RATE: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("xrpmm_mid_rate", "Mid rate observed in the last cycle").unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    pub fn cycle_completed(outcome: &str, duration_ms: f64) {
        CYCLES_TOTAL.with_label_values(&[outcome]).inc();
        CYCLE_DURATION_MS.observe(duration_ms);
    }

    pub fn tick_skipped(reason: &str) {
        TICKS_SKIPPED_TOTAL.with_label_values(&[reason]).inc();
    }

    pub fn offer_cancelled(reason: &str, result: &str) {
        CANCELS_TOTAL.with_label_values(&[reason, result]).inc();
    }

    pub fn offer_created(side: &str, result: &str) {
        CREATES_TOTAL.with_label_values(&[side, result]).inc();
    }

    /// `side` is "buy", "sell" or "both" for cycle-level skips.
    pub fn quote_skipped(side: &str, reason: &str) {
        QUOTE_SKIPS_TOTAL.with_label_values(&[side, reason]).inc();
    }

    pub fn balances(native: f64, issued: f64) {
        BALANCE.with_label_values(&["native"]).set(native);
        BALANCE.with_label_values(&["issued"]).set(issued);
    }

    pub fn mid_rate(rate: f64) {
        MID_RATE.set(rate);
    }

    /// Render all registered metrics in the text exposition format.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
