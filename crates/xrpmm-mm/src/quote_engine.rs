//! Quote calculation engine.
//!
//! Computes at most one sell and one buy quote from a market snapshot:
//! - Rate: mid shifted out by `spread_pct` and rounded
//! - Size: half-step correction of the inventory imbalance toward
//!   `target_ratio`, damped so the book is walked back gradually
//! - Filters: minimum lot and minimum notional against total value

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

use xrpmm_core::{round_dp, IssuedAsset, MarketSnapshot, OfferRequest, OrderSide, Price, Size};

use crate::config::MakerConfig;

/// A quote the engine wants resting on the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredQuote {
    pub side: OrderSide,
    /// Traded-asset units per native unit.
    pub rate: Price,
    /// Native units.
    pub size: Size,
    /// rate × size, rounded like the rate.
    pub notional: Decimal,
}

impl DesiredQuote {
    /// Offer request for `asset`.
    pub fn to_request(&self, asset: &IssuedAsset) -> OfferRequest {
        OfferRequest {
            side: self.side,
            size: self.size,
            rate: self.rate,
            notional: self.notional,
            asset: asset.clone(),
        }
    }
}

/// Why a side produced no quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSkip {
    /// Inventory already leans the other way.
    NoImbalance,
    /// Buy correction would spend at least the whole traded-asset balance.
    InsufficientInventory,
    /// Lot at or below `min_lot`.
    BelowMinLot,
    /// Notional at or below `min_notional_ratio` of total value.
    BelowMinNotional,
    /// Book price or balances too large to value in a `Decimal`.
    OutOfRange,
}

impl QuoteSkip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoImbalance => "no_imbalance",
            Self::InsufficientInventory => "insufficient_inventory",
            Self::BelowMinLot => "below_min_lot",
            Self::BelowMinNotional => "below_min_notional",
            Self::OutOfRange => "out_of_range",
        }
    }
}

impl fmt::Display for QuoteSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-side result of a quote evaluation.
pub type QuoteDecision = Result<DesiredQuote, QuoteSkip>;

fn spread_factor(config: &MakerConfig) -> Decimal {
    Decimal::ONE + config.spread_pct / dec!(100)
}

/// Sell-side work rate: mid marked up by the spread. `None` on overflow.
pub fn sell_rate(mid: Price, config: &MakerConfig) -> Option<Price> {
    let rate = mid.inner().checked_mul(spread_factor(config))?;
    Some(Price::new(round_dp(rate, config.price_decimals)))
}

/// Buy-side work rate: mid marked down by the spread.
pub fn buy_rate(mid: Price, config: &MakerConfig) -> Price {
    Price::new(round_dp(mid.inner() / spread_factor(config), config.price_decimals))
}

/// Portfolio values shared by both sides.
struct Valuation {
    total: Decimal,
    native_value: Decimal,
    /// Native value at target: total / target_ratio.
    target: Decimal,
}

impl Valuation {
    fn of(snapshot: &MarketSnapshot, config: &MakerConfig) -> Option<Self> {
        let total = snapshot.total_value()?;
        Some(Self {
            total,
            native_value: snapshot.native_value()?,
            target: total.checked_div(config.target_ratio)?,
        })
    }

    /// Total value with native holdings priced at `rate` instead of mid.
    fn at_rate(&self, snapshot: &MarketSnapshot, rate: Price) -> Option<Decimal> {
        snapshot
            .native_balance
            .checked_mul(rate.inner())?
            .checked_add(snapshot.asset_balance)
    }
}

fn sell_work(
    snapshot: &MarketSnapshot,
    value: &Valuation,
    rate: Price,
    config: &MakerConfig,
) -> Option<Decimal> {
    let imbalance = value.native_value.checked_sub(value.target)?;
    value
        .at_rate(snapshot, rate)?
        .checked_sub(value.total)?
        .checked_div(config.target_ratio)?
        .checked_add(imbalance / Decimal::TWO)
}

fn buy_work(
    snapshot: &MarketSnapshot,
    value: &Valuation,
    rate: Price,
    config: &MakerConfig,
) -> Option<Decimal> {
    let imbalance = value.target.checked_sub(value.native_value)?;
    value
        .total
        .checked_sub(value.at_rate(snapshot, rate)?)?
        .checked_div(config.target_ratio)?
        .checked_add(imbalance / Decimal::TWO)
}

/// Evaluate the sell side (give native, receive traded asset).
pub fn sell_quote(snapshot: &MarketSnapshot, config: &MakerConfig) -> QuoteDecision {
    let value = Valuation::of(snapshot, config).ok_or(QuoteSkip::OutOfRange)?;
    let rate = sell_rate(snapshot.mid_rate, config).ok_or(QuoteSkip::OutOfRange)?;
    let work = sell_work(snapshot, &value, rate, config).ok_or(QuoteSkip::OutOfRange)?;

    if work <= Decimal::ZERO {
        return Err(QuoteSkip::NoImbalance);
    }
    size_quote(OrderSide::Sell, work, rate, value.total, config)
}

/// Evaluate the buy side (give traded asset, receive native).
pub fn buy_quote(snapshot: &MarketSnapshot, config: &MakerConfig) -> QuoteDecision {
    let value = Valuation::of(snapshot, config).ok_or(QuoteSkip::OutOfRange)?;
    let rate = buy_rate(snapshot.mid_rate, config);
    let work = buy_work(snapshot, &value, rate, config).ok_or(QuoteSkip::OutOfRange)?;

    if work <= Decimal::ZERO {
        return Err(QuoteSkip::NoImbalance);
    }
    if work >= snapshot.asset_balance {
        return Err(QuoteSkip::InsufficientInventory);
    }
    size_quote(OrderSide::Buy, work, rate, value.total, config)
}

/// Turn a traded-asset correction into a lot and apply the filters.
fn size_quote(
    side: OrderSide,
    work: Decimal,
    rate: Price,
    total: Decimal,
    config: &MakerConfig,
) -> QuoteDecision {
    if !rate.is_positive() {
        return Err(QuoteSkip::BelowMinLot);
    }
    let raw_lot = work
        .checked_div(rate.inner())
        .ok_or(QuoteSkip::OutOfRange)?;
    if raw_lot <= config.min_lot {
        return Err(QuoteSkip::BelowMinLot);
    }

    let size = Size::new(round_dp(raw_lot, config.price_decimals));
    let raw_notional = size.notional(rate).ok_or(QuoteSkip::OutOfRange)?;
    let threshold = total
        .checked_mul(config.min_notional_ratio)
        .ok_or(QuoteSkip::OutOfRange)?;
    if raw_notional <= threshold {
        return Err(QuoteSkip::BelowMinNotional);
    }

    Ok(DesiredQuote {
        side,
        rate,
        size,
        notional: round_dp(raw_notional, config.price_decimals),
    })
}

/// Evaluate both sides, sell first.
pub fn evaluate_quotes(
    snapshot: &MarketSnapshot,
    config: &MakerConfig,
) -> [(OrderSide, QuoteDecision); 2] {
    [
        (OrderSide::Sell, sell_quote(snapshot, config)),
        (OrderSide::Buy, buy_quote(snapshot, config)),
    ]
}

/// Quotes eligible for submission, sell first. At most one per side.
pub fn compute_quotes(snapshot: &MarketSnapshot, config: &MakerConfig) -> Vec<DesiredQuote> {
    evaluate_quotes(snapshot, config)
        .into_iter()
        .filter_map(|(_, decision)| decision.ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(mid: Decimal, native: Decimal, asset: Decimal) -> MarketSnapshot {
        MarketSnapshot::new(Price::new(mid), Price::new(mid), native, asset).unwrap()
    }

    #[test]
    fn test_work_rates_straddle_mid() {
        let config = MakerConfig::default();
        for mid in [dec!(0.000123), dec!(0.5), dec!(1), dec!(2.345678), dec!(1234.5)] {
            let mid = Price::new(mid);
            assert!(sell_rate(mid, &config).unwrap() > mid, "sell rate at mid {mid}");
            assert!(buy_rate(mid, &config) < mid, "buy rate at mid {mid}");
        }
    }

    #[test]
    fn test_work_rates_are_rounded() {
        let config = MakerConfig::default();
        assert_eq!(sell_rate(Price::new(dec!(0.5)), &config), Some(Price::new(dec!(0.503))));
        // 0.5 / 1.006 = 0.49701789...
        assert_eq!(buy_rate(Price::new(dec!(0.5)), &config), Price::new(dec!(0.497018)));
    }

    #[test]
    fn test_underweight_native_buys_only() {
        // total = 1000, target native value 666.67, current 500
        let config = MakerConfig::default();
        let snap = snapshot(dec!(0.5), dec!(1000), dec!(500));

        assert_eq!(sell_quote(&snap, &config), Err(QuoteSkip::NoImbalance));

        let buy = buy_quote(&snap, &config).unwrap();
        assert_eq!(buy.side, OrderSide::Buy);
        assert_eq!(buy.rate, Price::new(dec!(0.497018)));
        // work = (1000 - 997.018) / 1.5 + 166.666.../2 = 85.32133...
        assert_eq!(buy.size, Size::new(dec!(171.666486)));
        assert_eq!(buy.notional, round_dp(dec!(171.666486) * dec!(0.497018), 6));

        let quotes = compute_quotes(&snap, &config);
        assert_eq!(quotes, vec![buy]);
    }

    #[test]
    fn test_overweight_native_sells() {
        // native value 900 of total 1000: above the 666.67 target
        let config = MakerConfig::default();
        let snap = snapshot(dec!(0.5), dec!(1800), dec!(100));

        let sell = sell_quote(&snap, &config).unwrap();
        assert_eq!(sell.side, OrderSide::Sell);
        assert_eq!(sell.rate, Price::new(dec!(0.503)));
        assert!(sell.size.is_positive());
        assert!(sell.notional > dec!(0.95));

        assert!(buy_quote(&snap, &config).is_err());
    }

    #[test]
    fn test_balanced_inventory_quotes_both_sides() {
        // native value 500 of total 750 sits exactly on the 1:1.5 target
        let config = MakerConfig::default();
        let snap = snapshot(dec!(0.5), dec!(1000), dec!(250));

        let quotes = compute_quotes(&snap, &config);
        assert_eq!(quotes.len(), 2);

        let (sell, buy) = (&quotes[0], &quotes[1]);
        assert_eq!(sell.side, OrderSide::Sell);
        assert_eq!(sell.rate, Price::new(dec!(0.503)));
        // work = (1003 - 1000) / 1.5 = 2, lot = 2 / 0.503
        assert_eq!(sell.size, Size::new(round_dp(dec!(2) / dec!(0.503), 6)));

        assert_eq!(buy.side, OrderSide::Buy);
        assert_eq!(buy.rate, Price::new(dec!(0.497018)));
        // work = (1000 - 997.018) / 1.5 = 1.988, lot = 1.988 / 0.497018
        assert_eq!(
            buy.size,
            Size::new(round_dp(dec!(2.982) / dec!(1.5) / dec!(0.497018), 6))
        );
    }

    #[test]
    fn test_extreme_ask_skips_both_sides() {
        // a single 1-drop ask priced at 1e20 USD per drop
        let config = MakerConfig::default();
        let snap = MarketSnapshot::new(
            Price::new(dec!(100000000000000000000000000)),
            Price::new(dec!(0.4)),
            dec!(10000),
            dec!(500),
        )
        .unwrap();

        let [(_, sell), (_, buy)] = evaluate_quotes(&snap, &config);
        assert_eq!(sell, Err(QuoteSkip::OutOfRange));
        assert_eq!(buy, Err(QuoteSkip::OutOfRange));
    }

    #[test]
    fn test_sell_rate_overflow_is_none() {
        let config = MakerConfig::default();
        assert_eq!(sell_rate(Price::new(Decimal::MAX), &config), None);
    }

    #[test]
    fn test_buy_needs_asset_inventory() {
        let config = MakerConfig::default();
        let snap = snapshot(dec!(0.5), dec!(1000), dec!(0));
        assert!(matches!(
            buy_quote(&snap, &config),
            Err(QuoteSkip::InsufficientInventory) | Err(QuoteSkip::NoImbalance)
        ));
    }

    #[test]
    fn test_min_notional_filter() {
        let snap = snapshot(dec!(0.5), dec!(1800), dec!(100));
        let loose = MakerConfig {
            min_notional_ratio: Decimal::ZERO,
            ..Default::default()
        };
        let quote = sell_quote(&snap, &loose).unwrap();
        let total = snap.total_value().unwrap();
        let raw_notional = quote.size.notional(quote.rate).unwrap();

        // Threshold exactly at the notional: rejected.
        let at = MakerConfig {
            min_notional_ratio: raw_notional / total,
            ..Default::default()
        };
        assert_eq!(sell_quote(&snap, &at), Err(QuoteSkip::BelowMinNotional));

        // Just below: accepted.
        let below = MakerConfig {
            min_notional_ratio: (raw_notional - dec!(0.000001)) / total,
            ..Default::default()
        };
        assert!(sell_quote(&snap, &below).is_ok());
    }

    #[test]
    fn test_min_lot_filter() {
        let snap = snapshot(dec!(0.5), dec!(1000), dec!(250));
        let strict = MakerConfig {
            min_lot: dec!(1000000),
            min_notional_ratio: Decimal::ZERO,
            ..Default::default()
        };
        assert_eq!(sell_quote(&snap, &strict), Err(QuoteSkip::BelowMinLot));
    }

    #[test]
    fn test_empty_balances_quote_nothing() {
        let config = MakerConfig::default();
        let snap = snapshot(dec!(0.5), Decimal::ZERO, Decimal::ZERO);
        assert!(compute_quotes(&snap, &config).is_empty());
    }

    #[test]
    fn test_request_carries_quote() {
        let asset = IssuedAsset::new("USD", "rhub8VRN55s94qWKDv6jmDy1pUykJzF3wq").unwrap();
        let quote = DesiredQuote {
            side: OrderSide::Sell,
            rate: Price::new(dec!(0.503)),
            size: Size::new(dec!(10)),
            notional: dec!(5.03),
        };
        let request = quote.to_request(&asset);
        assert_eq!(request.side, OrderSide::Sell);
        assert_eq!(request.notional, dec!(5.03));
        assert_eq!(request.asset, asset);
    }
}
