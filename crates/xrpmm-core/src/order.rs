//! Order side and the offer request handed to the ledger client.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::asset::IssuedAsset;
use crate::decimal::{Price, Size};

/// Side of a quote, always from the native asset's point of view.
///
/// `Sell` gives the native asset and receives the traded asset;
/// `Buy` gives the traded asset and receives the native asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully sized offer ready for submission.
///
/// `size` is in native units; `notional` is the traded-asset leg,
/// already rounded to quote precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferRequest {
    pub side: OrderSide,
    pub size: Size,
    pub rate: Price,
    pub notional: rust_decimal::Decimal,
    pub asset: IssuedAsset,
}
