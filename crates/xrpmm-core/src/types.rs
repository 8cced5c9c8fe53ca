//! Market data types for the quoted pair.
//!
//! Prices are always traded-asset units per native unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Price, DROPS_PER_NATIVE};
use crate::error::{CoreError, Result};

/// Which side of the pair's order book to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    /// Offers selling the native asset (taker gets native).
    Ask,
    /// Offers buying the native asset (taker gets the traded asset).
    Bid,
}

impl std::fmt::Display for BookSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ask => write!(f, "ask"),
            Self::Bid => write!(f, "bid"),
        }
    }
}

/// Best entry of one book, as reported by the ledger.
///
/// `quality` is taker_pays / taker_gets in raw ledger units, so native
/// legs are counted in drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopOfBook {
    pub side: BookSide,
    pub quality: Decimal,
}

impl TopOfBook {
    /// Price in traded-asset units per native unit.
    ///
    /// Ask quality is traded-per-drop, bid quality is drops-per-traded;
    /// both are rescaled to whole native units. A quality whose price
    /// does not fit a `Decimal` is rejected like a non-positive one.
    pub fn price(&self) -> Result<Price> {
        if self.quality <= Decimal::ZERO {
            return Err(CoreError::InvalidPrice(format!(
                "non-positive {} quality: {}",
                self.side, self.quality
            )));
        }
        let price = match self.side {
            BookSide::Ask => self.quality.checked_mul(DROPS_PER_NATIVE),
            BookSide::Bid => DROPS_PER_NATIVE.checked_div(self.quality),
        };
        price.map(Price::new).ok_or_else(|| {
            CoreError::InvalidPrice(format!(
                "{} quality {} is out of range",
                self.side, self.quality
            ))
        })
    }
}

/// Everything the quote calculator needs for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketSnapshot {
    pub ask_price: Price,
    pub bid_price: Price,
    /// Arithmetic mean of ask and bid.
    pub mid_rate: Price,
    /// Spendable native balance, reserve already excluded.
    pub native_balance: Decimal,
    /// Balance of the configured traded asset.
    pub asset_balance: Decimal,
}

impl MarketSnapshot {
    /// Build a snapshot; the mid rate is derived, never supplied.
    pub fn new(
        ask_price: Price,
        bid_price: Price,
        native_balance: Decimal,
        asset_balance: Decimal,
    ) -> Result<Self> {
        if !ask_price.is_positive() || !bid_price.is_positive() {
            return Err(CoreError::InvalidPrice(format!(
                "ask {ask_price} and bid {bid_price} must be positive"
            )));
        }
        let (ask, bid) = (ask_price.inner(), bid_price.inner());
        let mid = match ask.checked_add(bid) {
            Some(sum) => sum / Decimal::TWO,
            None => {
                let (lo, hi) = (ask.min(bid), ask.max(bid));
                lo.checked_add((hi - lo) / Decimal::TWO).unwrap_or(hi)
            }
        };
        let mid_rate = Price::new(mid);
        Ok(Self {
            ask_price,
            bid_price,
            mid_rate,
            native_balance,
            asset_balance,
        })
    }

    /// Native holdings valued at the mid rate; `None` on overflow.
    pub fn native_value(&self) -> Option<Decimal> {
        self.native_balance.checked_mul(self.mid_rate.inner())
    }

    /// Total portfolio value in traded-asset units; `None` on overflow.
    pub fn total_value(&self) -> Option<Decimal> {
        self.native_value()?.checked_add(self.asset_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ask_price_from_quality() {
        // 0.000000503 USD per drop = 0.503 USD per XRP
        let top = TopOfBook {
            side: BookSide::Ask,
            quality: dec!(0.000000503),
        };
        assert_eq!(top.price().unwrap().inner(), dec!(0.503));
    }

    #[test]
    fn test_bid_price_from_quality() {
        // 2_000_000 drops per USD = 0.5 USD per XRP
        let top = TopOfBook {
            side: BookSide::Bid,
            quality: dec!(2000000),
        };
        assert_eq!(top.price().unwrap().inner(), dec!(0.5));
    }

    #[test]
    fn test_zero_quality_rejected() {
        let top = TopOfBook {
            side: BookSide::Bid,
            quality: Decimal::ZERO,
        };
        assert!(top.price().is_err());
    }

    #[test]
    fn test_snapshot_mid_is_mean() {
        let snap = MarketSnapshot::new(
            Price::new(dec!(0.51)),
            Price::new(dec!(0.49)),
            dec!(1000),
            dec!(500),
        )
        .unwrap();
        assert_eq!(snap.mid_rate.inner(), dec!(0.5));
        assert_eq!(snap.total_value(), Some(dec!(1000)));
    }

    #[test]
    fn test_extreme_qualities_rejected() {
        let ask = TopOfBook {
            side: BookSide::Ask,
            quality: dec!(100000000000000000000000),
        };
        assert!(matches!(ask.price(), Err(CoreError::InvalidPrice(_))));

        let bid = TopOfBook {
            side: BookSide::Bid,
            quality: dec!(0.00000000000000000000001),
        };
        assert!(matches!(bid.price(), Err(CoreError::InvalidPrice(_))));
    }

    #[test]
    fn test_snapshot_value_overflow_is_none() {
        // 1 drop offered for 1e20 USD: price 1e26 per XRP
        let top = TopOfBook {
            side: BookSide::Ask,
            quality: dec!(100000000000000000000),
        };
        let ask = top.price().unwrap();
        let snap = MarketSnapshot::new(ask, Price::new(dec!(0.4)), dec!(10000), dec!(500)).unwrap();
        assert!(snap.mid_rate.is_positive());
        assert_eq!(snap.native_value(), None);
        assert_eq!(snap.total_value(), None);
    }

    #[test]
    fn test_snapshot_mid_of_huge_prices() {
        let max = Price::new(Decimal::MAX);
        let snap = MarketSnapshot::new(max, max, dec!(0), dec!(0)).unwrap();
        assert!(snap.mid_rate.is_positive());
    }

    #[test]
    fn test_snapshot_rejects_non_positive_prices() {
        assert!(MarketSnapshot::new(Price::ZERO, Price::new(dec!(0.5)), dec!(1), dec!(1)).is_err());
    }
}
