//! Cycle integration tests against the in-memory ledger.
//!
//! Covers the full read → reconcile → quote path:
//! - Quoting from a clean account, one side or both
//! - Out-of-range book prices
//! - No-liquidity and still-open skips
//! - Fill detection and periodic reset cancellation
//! - Fatal balance reads

use std::sync::Arc;

use rust_decimal_macros::dec;
use xrpmm_core::{
    IssuedAsset, ManualClock, OfferAmount, OpenOffer, OrderSide, Price, Size,
};
use xrpmm_ledger::{MockLedger, SubmitOutcome};
use xrpmm_mm::{CancelReason, CycleEngine, CycleSkip, MakerConfig, MakerError, QuoteSkip};

const ISSUER: &str = "rhub8VRN55s94qWKDv6jmDy1pUykJzF3wq";

fn usd() -> IssuedAsset {
    IssuedAsset::new("USD", ISSUER).unwrap()
}

fn resting(sequence: u32) -> OpenOffer {
    OpenOffer {
        sequence,
        taker_gets: OfferAmount::Native(10_000_000),
        taker_pays: OfferAmount::Issued {
            asset: usd(),
            value: dec!(5.03),
        },
    }
}

/// Mid 0.5, 1000 native, 500 USD: total 1000, native underweight.
fn funded_ledger() -> Arc<MockLedger> {
    let ledger = Arc::new(MockLedger::new());
    ledger.set_ask_price(Some(dec!(0.6)));
    ledger.set_bid_price(Some(dec!(0.4)));
    ledger.set_native_balance(dec!(1000));
    ledger.set_asset_balance(dec!(500));
    ledger
}

fn engine(ledger: &Arc<MockLedger>, clock: &Arc<ManualClock>) -> CycleEngine {
    CycleEngine::new(
        ledger.clone(),
        clock.clone(),
        usd(),
        MakerConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_clean_account_places_buy_only() {
    let ledger = funded_ledger();
    let clock = Arc::new(ManualClock::at_minute(7));
    let mut engine = engine(&ledger, &clock);

    let report = engine.run_cycle().await.unwrap();

    assert!(report.skip.is_none());
    assert!(!report.reconcile.ran());
    assert_eq!(
        report.evaluations[0],
        (OrderSide::Sell, Err(QuoteSkip::NoImbalance))
    );

    let creates = ledger.creates();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].side, OrderSide::Buy);
    assert_eq!(creates[0].rate, Price::new(dec!(0.497018)));
    assert_eq!(creates[0].size, Size::new(dec!(171.666486)));
    assert_eq!(creates[0].asset, usd());

    // Nothing was resting, so the first offer read is reused.
    assert_eq!(ledger.offer_reads(), 1);
}

#[tokio::test]
async fn test_balanced_inventory_quotes_both_sides() {
    let ledger = funded_ledger();
    ledger.set_asset_balance(dec!(250));
    let clock = Arc::new(ManualClock::at_minute(7));
    let mut engine = engine(&ledger, &clock);

    let report = engine.run_cycle().await.unwrap();

    assert!(report.skip.is_none());
    assert_eq!(report.quotes_accepted(), 2);

    let creates = ledger.creates();
    assert_eq!(creates.len(), 2);
    assert_eq!(creates[0].side, OrderSide::Sell);
    assert_eq!(creates[0].rate, Price::new(dec!(0.503)));
    assert_eq!(creates[1].side, OrderSide::Buy);
    assert_eq!(creates[1].rate, Price::new(dec!(0.497018)));
}

#[tokio::test]
async fn test_extreme_ask_skips_quoting_without_failing() {
    // One drop offered for 1e20 USD alone in the ask book.
    let ledger = funded_ledger();
    ledger.set_ask_price(Some(dec!(100000000000000000000000000)));
    ledger.set_native_balance(dec!(10000));
    ledger.add_offer(resting(4));
    let clock = Arc::new(ManualClock::at_minute(7));
    let mut engine = engine(&ledger, &clock);

    let report = engine.run_cycle().await.unwrap();

    // Reconciliation is unaffected by the unusable price.
    assert!(report.reconcile.ran());
    assert_eq!(ledger.cancels(), vec![4]);

    assert_eq!(report.skip, Some(CycleSkip::NothingToQuote));
    assert_eq!(
        report.evaluations,
        vec![
            (OrderSide::Sell, Err(QuoteSkip::OutOfRange)),
            (OrderSide::Buy, Err(QuoteSkip::OutOfRange)),
        ]
    );
    assert!(ledger.creates().is_empty());
}

#[tokio::test]
async fn test_empty_ask_book_quotes_nothing() {
    let ledger = funded_ledger();
    ledger.set_ask_price(None);
    let clock = Arc::new(ManualClock::at_minute(7));
    let mut engine = engine(&ledger, &clock);

    let report = engine.run_cycle().await.unwrap();

    assert!(matches!(report.skip, Some(CycleSkip::NoLiquidity { .. })));
    assert!(report.snapshot.is_none());
    assert!(ledger.creates().is_empty());
}

#[tokio::test]
async fn test_open_offers_block_quoting() {
    let ledger = funded_ledger();
    ledger.add_offer(resting(11));
    ledger.add_offer(resting(12));
    ledger.set_cancel_result(Some(SubmitOutcome::Rejected {
        engine_result: "tecNO_ENTRY".to_string(),
        message: "Specified object does not exist".to_string(),
    }));
    let clock = Arc::new(ManualClock::at_minute(7));
    let mut engine = engine(&ledger, &clock);

    // First cycle has no cached balance: it tries to cancel, both fail.
    let first = engine.run_cycle().await.unwrap();
    assert_eq!(first.reconcile.failed(), 2);
    assert_eq!(first.skip, Some(CycleSkip::OffersStillOpen { count: 2 }));
    assert_eq!(engine.reconciler().last_asset_balance(), Some(dec!(500)));

    // Same balance, off-reset minute: no cancels, no quotes.
    ledger.set_cancel_result(None);
    let second = engine.run_cycle().await.unwrap();
    assert!(!second.reconcile.ran());
    assert_eq!(second.skip, Some(CycleSkip::OffersStillOpen { count: 2 }));
    assert_eq!(ledger.cancels().len(), 2);
    assert!(ledger.creates().is_empty());
}

#[tokio::test]
async fn test_fill_triggers_cancel_then_requote() {
    let ledger = funded_ledger();
    ledger.set_rest_created(true);
    let clock = Arc::new(ManualClock::at_minute(7));
    let mut engine = engine(&ledger, &clock);

    // Seed the cache with a failed-cancel cycle.
    ledger.add_offer(resting(3));
    ledger.set_cancel_result(Some(SubmitOutcome::Failed("timeout".to_string())));
    engine.run_cycle().await.unwrap();
    ledger.set_cancel_result(None);

    // A partial fill moves the asset balance.
    ledger.set_asset_balance(dec!(520));
    clock.advance(chrono::Duration::minutes(1));

    let report = engine.run_cycle().await.unwrap();

    assert!(matches!(
        report.reconcile.reason,
        Some(CancelReason::BalanceChanged { .. })
    ));
    assert_eq!(report.reconcile.accepted(), 1);
    assert!(report.skip.is_none());
    assert!(!report.submissions.is_empty());
    assert_eq!(engine.reconciler().last_asset_balance(), Some(dec!(520)));
}

#[tokio::test]
async fn test_reset_minute_cancels_unchanged_offers() {
    let ledger = funded_ledger();
    let clock = Arc::new(ManualClock::at_minute(14));
    let mut engine = engine(&ledger, &clock);

    ledger.add_offer(resting(5));
    ledger.set_cancel_result(Some(SubmitOutcome::Failed("timeout".to_string())));
    engine.run_cycle().await.unwrap();
    ledger.set_cancel_result(None);

    clock.advance(chrono::Duration::minutes(1));
    let report = engine.run_cycle().await.unwrap();

    assert_eq!(
        report.reconcile.reason,
        Some(CancelReason::PeriodicReset { minute: 15 })
    );
    assert!(ledger.offers().is_empty());
    assert_eq!(ledger.creates().len(), 1);
}

#[tokio::test]
async fn test_other_pair_offers_ignored() {
    let ledger = funded_ledger();
    ledger.add_offer(OpenOffer {
        sequence: 99,
        taker_gets: OfferAmount::Native(1_000_000),
        taker_pays: OfferAmount::Issued {
            asset: IssuedAsset::new("EUR", ISSUER).unwrap(),
            value: dec!(0.45),
        },
    });
    let clock = Arc::new(ManualClock::at_minute(0));
    let mut engine = engine(&ledger, &clock);

    let report = engine.run_cycle().await.unwrap();

    assert!(ledger.cancels().is_empty());
    assert!(report.skip.is_none());
    assert_eq!(ledger.creates().len(), 1);
}

#[tokio::test]
async fn test_balance_failure_ends_cycle() {
    let ledger = funded_ledger();
    ledger.add_offer(resting(1));
    ledger.set_fail_balances(true);
    let clock = Arc::new(ManualClock::at_minute(0));
    let mut engine = engine(&ledger, &clock);

    let result = engine.run_cycle().await;

    assert!(matches!(result, Err(MakerError::BalanceRead(_))));
    assert!(ledger.cancels().is_empty());
    assert!(ledger.creates().is_empty());
}
