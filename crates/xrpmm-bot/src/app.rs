//! Main application orchestration.
//!
//! Coordinates:
//! - Ledger connection lifecycle
//! - The cycle scheduler
//! - Shutdown on Ctrl-C

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info, warn};
use xrpmm_core::{Clock, SystemClock};
use xrpmm_ledger::{AccountSecret, DynLedgerClient, JsonRpcLedger};
use xrpmm_mm::CycleEngine;
use xrpmm_telemetry::Metrics;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::scheduler::Scheduler;

/// Main application.
pub struct Application {
    config: AppConfig,
    ledger: DynLedgerClient,
    scheduler: Scheduler,
}

impl Application {
    /// Create the application with the JSON-RPC ledger client.
    ///
    /// Loads the account secret; does not touch the network.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let secret = AccountSecret::load(&config.ledger.secret)?;
        let ledger: DynLedgerClient = Arc::new(JsonRpcLedger::new(config.ledger.clone(), secret)?);
        Self::with_ledger(config, ledger, Arc::new(SystemClock))
    }

    /// Create the application around an existing ledger client.
    pub fn with_ledger(
        config: AppConfig,
        ledger: DynLedgerClient,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let asset = config.pair.asset()?;
        let engine = CycleEngine::new(Arc::clone(&ledger), clock, asset, config.maker.clone())?;

        Ok(Self {
            config,
            ledger,
            scheduler: Scheduler::new(engine),
        })
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Connect, schedule cycles until `shutdown` resolves, disconnect.
    ///
    /// A failed initial connect is returned as an error.
    pub async fn run_until<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()>,
    {
        self.ledger.connect().await?;

        info!(
            pair = %format!("XRP/{}", self.config.pair.currency),
            issuer = %self.config.pair.issuer,
            account = %self.config.ledger.account,
            spread_pct = %self.config.maker.spread_pct,
            target_ratio = %self.config.maker.target_ratio,
            reset_interval_minutes = self.config.maker.reset_interval_minutes,
            cycle_interval_secs = self.config.maker.cycle_interval_secs,
            "Market maker running"
        );

        self.scheduler.run(shutdown).await;

        if let Err(e) = self.ledger.disconnect().await {
            warn!(error = %e, "Disconnect failed");
        }

        if self.config.telemetry.log_metrics_on_shutdown {
            match Metrics::render() {
                Ok(text) => info!(metrics = %text, "Final metrics"),
                Err(e) => warn!(error = %e, "Failed to render metrics"),
            }
        }

        info!("Market maker stopped");
        Ok(())
    }
}
