//! Application lifecycle tests.
//!
//! Runs the full application against the in-memory ledger:
//! - Connect, first cycle, disconnect on shutdown
//! - Fatal startup connect failure
//! - Resting offers across consecutive cycles

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use xrpmm_bot::{AppConfig, AppError, Application, TickOutcome};
use xrpmm_core::{ManualClock, OrderSide};
use xrpmm_ledger::{LedgerError, MockLedger};
use xrpmm_mm::{CancelReason, CycleSkip};

const CONFIG: &str = r#"
[ledger]
account = "rPEPPER7kfTD9w2To4CQk6UCfuHM9c6GDY"

[pair]
currency = "USD"
issuer = "rhub8VRN55s94qWKDv6jmDy1pUykJzF3wq"

[maker]
cycle_interval_secs = 1

[telemetry]
log_metrics_on_shutdown = false
"#;

fn funded_ledger() -> Arc<MockLedger> {
    let ledger = Arc::new(MockLedger::new());
    ledger.set_ask_price(Some(dec!(0.6)));
    ledger.set_bid_price(Some(dec!(0.4)));
    ledger.set_native_balance(dec!(1000));
    ledger.set_asset_balance(dec!(500));
    ledger
}

fn app(ledger: &Arc<MockLedger>) -> Application {
    let config = AppConfig::from_toml_str(CONFIG, "XRPMM_APP_TEST").unwrap();
    Application::with_ledger(config, ledger.clone(), Arc::new(ManualClock::at_minute(7))).unwrap()
}

#[tokio::test]
async fn test_runs_first_cycle_and_disconnects() {
    let ledger = funded_ledger();
    let app = app(&ledger);

    app.run_until(tokio::time::sleep(Duration::from_millis(200)))
        .await
        .unwrap();

    let creates = ledger.creates();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].side, OrderSide::Buy);
    assert!(!ledger.is_connected());
}

#[tokio::test]
async fn test_connect_failure_is_fatal() {
    let ledger = funded_ledger();
    ledger.set_refuse_connect(true);
    let app = app(&ledger);

    let result = app
        .run_until(tokio::time::sleep(Duration::from_millis(50)))
        .await;

    assert!(matches!(
        result,
        Err(AppError::Ledger(LedgerError::HttpClient(_)))
    ));
    assert_eq!(ledger.offer_reads(), 0);
    assert!(ledger.creates().is_empty());
}

#[tokio::test]
async fn test_resting_offer_survives_until_balance_moves() {
    let ledger = funded_ledger();
    ledger.set_rest_created(true);
    let app = app(&ledger);
    let scheduler = app.scheduler().clone();

    assert!(matches!(scheduler.fire().await, TickOutcome::Ran(_)));
    assert_eq!(ledger.offers().len(), 1);

    // No cached balance yet: the first pass with offers cancels and requotes.
    match scheduler.fire().await {
        TickOutcome::Ran(report) => assert!(report.reconcile.ran()),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(ledger.cancels().len(), 1);
    assert_eq!(ledger.creates().len(), 2);

    // Balance unchanged at minute 7: the buy keeps resting.
    match scheduler.fire().await {
        TickOutcome::Ran(report) => {
            assert!(!report.reconcile.ran());
            assert!(matches!(
                report.skip,
                Some(CycleSkip::OffersStillOpen { count: 1 })
            ));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(ledger.creates().len(), 2);

    // A fill moves the asset balance and the next pass cancels again.
    ledger.set_asset_balance(dec!(480));
    match scheduler.fire().await {
        TickOutcome::Ran(report) => assert!(matches!(
            report.reconcile.reason,
            Some(CancelReason::BalanceChanged { .. })
        )),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(ledger.cancels().len(), 2);
}
