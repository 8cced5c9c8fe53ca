//! Ledger assets, amounts and resting offers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::drops_to_native;
use crate::error::{CoreError, Result};
use crate::order::OrderSide;

/// An issued (non-native) asset: currency code plus issuing account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssuedAsset {
    /// Three-letter code or 40-character hex code.
    pub currency: String,
    /// Issuing account address.
    pub issuer: String,
}

impl IssuedAsset {
    /// Create an asset, rejecting obviously malformed identifiers.
    pub fn new(currency: impl Into<String>, issuer: impl Into<String>) -> Result<Self> {
        let currency = currency.into();
        let issuer = issuer.into();

        let valid_code = (currency.len() == 3 && currency != "XRP")
            || (currency.len() == 40 && currency.chars().all(|c| c.is_ascii_hexdigit()));
        if !valid_code {
            return Err(CoreError::InvalidAsset(format!(
                "currency code must be 3 characters (not XRP) or 40 hex digits: {currency}"
            )));
        }
        if !issuer.starts_with('r') || issuer.len() < 25 {
            return Err(CoreError::InvalidAsset(format!(
                "issuer is not a classic address: {issuer}"
            )));
        }

        Ok(Self { currency, issuer })
    }

    /// True if `currency` and `issuer` identify this asset.
    pub fn is(&self, currency: &str, issuer: &str) -> bool {
        self.currency == currency && self.issuer == issuer
    }
}

impl fmt::Display for IssuedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.currency, self.issuer)
    }
}

/// One leg of an offer.
///
/// The ledger encodes native amounts as a bare drops string and issued
/// amounts as an object; both are decoded into this enum at the client
/// boundary so nothing downstream inspects the shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferAmount {
    /// Native asset, in drops.
    Native(u64),
    /// Issued asset amount.
    Issued { asset: IssuedAsset, value: Decimal },
}

impl OfferAmount {
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }

    /// True if this leg is denominated in `asset`.
    pub fn is_asset(&self, asset: &IssuedAsset) -> bool {
        match self {
            Self::Native(_) => false,
            Self::Issued { asset: a, .. } => a == asset,
        }
    }

    /// Amount in whole units (native units for drops).
    pub fn value(&self) -> Decimal {
        match self {
            Self::Native(drops) => drops_to_native(*drops),
            Self::Issued { value, .. } => *value,
        }
    }
}

impl fmt::Display for OfferAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(drops) => write!(f, "{} XRP", drops_to_native(*drops)),
            Self::Issued { asset, value } => write!(f, "{value} {}", asset.currency),
        }
    }
}

/// A resting offer owned by the operator's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOffer {
    /// Account sequence that created the offer; cancel key.
    pub sequence: u32,
    /// What the taker receives (what we give).
    pub taker_gets: OfferAmount,
    /// What the taker pays (what we receive).
    pub taker_pays: OfferAmount,
}

impl OpenOffer {
    /// Side from the native asset's point of view.
    ///
    /// `None` for offers with no native leg.
    pub fn side(&self) -> Option<OrderSide> {
        if self.taker_gets.is_native() {
            Some(OrderSide::Sell)
        } else if self.taker_pays.is_native() {
            Some(OrderSide::Buy)
        } else {
            None
        }
    }

    /// True if either leg is denominated in `asset`.
    pub fn involves(&self, asset: &IssuedAsset) -> bool {
        self.taker_gets.is_asset(asset) || self.taker_pays.is_asset(asset)
    }
}

/// Keep only offers that trade `asset`.
pub fn pair_offers(offers: Vec<OpenOffer>, asset: &IssuedAsset) -> Vec<OpenOffer> {
    offers.into_iter().filter(|o| o.involves(asset)).collect()
}
