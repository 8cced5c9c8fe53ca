//! Fixed-interval cycle scheduler.
//!
//! Runs one cycle immediately, then one per interval. A tick that lands
//! while the previous cycle is still running is dropped, never queued.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::prelude::ToPrimitive;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use xrpmm_mm::{CycleEngine, CycleReport, CycleSkip, MakerError};
use xrpmm_telemetry::Metrics;

/// Result of one timer tick.
#[derive(Debug)]
pub enum TickOutcome {
    Ran(Box<CycleReport>),
    /// A cycle was already in flight.
    Skipped,
    Failed(MakerError),
}

/// Holds the in-flight flag for the lifetime of a cycle.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Drives [`CycleEngine`] on a fixed interval.
#[derive(Clone)]
pub struct Scheduler {
    engine: Arc<Mutex<CycleEngine>>,
    in_flight: Arc<AtomicBool>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(engine: CycleEngine) -> Self {
        let interval = Duration::from_secs(engine.config().cycle_interval_secs);
        Self {
            engine: Arc::new(Mutex::new(engine)),
            in_flight: Arc::new(AtomicBool::new(false)),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one cycle unless another is in flight.
    pub async fn fire(&self) -> TickOutcome {
        match InFlightGuard::try_acquire(&self.in_flight) {
            Some(guard) => self.run_guarded(guard).await,
            None => skipped(),
        }
    }

    async fn run_guarded(&self, _guard: InFlightGuard) -> TickOutcome {
        let started = Instant::now();
        let result = self.engine.lock().await.run_cycle().await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(report) => {
                report.log();
                record_report(&report, elapsed_ms);
                TickOutcome::Ran(Box::new(report))
            }
            Err(e) => {
                error!(error = %e, "Cycle failed");
                Metrics::cycle_completed("failed", elapsed_ms);
                TickOutcome::Failed(e)
            }
        }
    }

    /// Tick until `shutdown` resolves, then wait for the running cycle.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut running: Option<JoinHandle<TickOutcome>> = None;

        info!(interval_secs = self.interval.as_secs(), "Scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match InFlightGuard::try_acquire(&self.in_flight) {
                        Some(guard) => {
                            let this = self.clone();
                            running = Some(tokio::spawn(async move { this.run_guarded(guard).await }));
                        }
                        None => {
                            skipped();
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping scheduler");
                    break;
                }
            }
        }

        if let Some(handle) = running.take() {
            if !handle.is_finished() {
                info!("Waiting for in-flight cycle to finish");
            }
            if let Err(e) = handle.await {
                error!(error = %e, "Cycle task aborted");
            }
        }
    }
}

fn skipped() -> TickOutcome {
    debug!("Previous cycle still running, tick skipped");
    Metrics::tick_skipped("in_flight");
    TickOutcome::Skipped
}

fn record_report(report: &CycleReport, elapsed_ms: f64) {
    let outcome = if report.submissions.is_empty() {
        "skipped"
    } else {
        "quoted"
    };
    Metrics::cycle_completed(outcome, elapsed_ms);

    if let Some(reason) = report.reconcile.reason {
        for result in &report.reconcile.results {
            Metrics::offer_cancelled(reason.as_str(), result.outcome.label());
        }
    }

    for submission in &report.submissions {
        Metrics::offer_created(submission.quote.side.as_str(), submission.outcome.label());
    }

    for (side, decision) in &report.evaluations {
        if let Err(skip) = decision {
            Metrics::quote_skipped(side.as_str(), skip.as_str());
        }
    }

    if let Some(skip @ (CycleSkip::NoLiquidity { .. } | CycleSkip::OffersStillOpen { .. })) =
        &report.skip
    {
        Metrics::quote_skipped("both", skip.as_str());
    }

    if let Some(snapshot) = &report.snapshot {
        Metrics::balances(
            snapshot.native_balance.to_f64().unwrap_or(0.0),
            snapshot.asset_balance.to_f64().unwrap_or(0.0),
        );
        Metrics::mid_rate(snapshot.mid_rate.inner().to_f64().unwrap_or(0.0));
    }
}
