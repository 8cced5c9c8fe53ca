//! Precision-safe decimal types for quoting.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. Rates and lot sizes
//! are both rounded to [`QUOTE_DECIMALS`] places with the same tie-break
//! rule, so a quote's notional is reproducible from its parts.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Decimal places used for quote rates and sizes.
pub const QUOTE_DECIMALS: u32 = 6;

/// Drops per unit of the native asset.
pub const DROPS_PER_NATIVE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Round `value` to `dp` decimal places, ties away from zero.
///
/// A result that rounds to zero is returned as an unsigned `0`, so callers
/// never see `-0.000000` in logs or submitted amounts.
#[inline]
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Parse a decimal as the ledger prints it.
///
/// Amount values and offer qualities come back either as plain decimals
/// (`"0.5012"`) or in exponent form (`"5012e-4"`, `"1.2E-7"`).
pub fn parse_ledger_decimal(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if let Ok(value) = Decimal::from_str(trimmed) {
        return Ok(value);
    }
    Decimal::from_scientific(&trimmed.to_ascii_lowercase()).map_err(CoreError::DecimalParse)
}

/// Convert a native-asset amount to whole drops.
///
/// Fails if the amount is negative or carries more precision than a drop.
pub fn native_to_drops(amount: Decimal) -> Result<u64> {
    let drops = amount
        .checked_mul(DROPS_PER_NATIVE)
        .ok_or_else(|| CoreError::InvalidAmount(format!("native amount out of range: {amount}")))?;
    if drops.is_sign_negative() && !drops.is_zero() {
        return Err(CoreError::InvalidAmount(format!(
            "negative native amount: {amount}"
        )));
    }
    if drops.fract() != Decimal::ZERO {
        return Err(CoreError::InvalidAmount(format!(
            "native amount {amount} is finer than one drop"
        )));
    }
    drops
        .to_u64()
        .ok_or_else(|| CoreError::InvalidAmount(format!("native amount out of range: {amount}")))
}

/// Convert whole drops to a native-asset amount.
#[inline]
pub fn drops_to_native(drops: u64) -> Decimal {
    Decimal::from(drops) / DROPS_PER_NATIVE
}

/// Exchange rate in traded-asset units per native unit.
///
/// Wraps `Decimal` to keep rates from being mixed up with sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quantity of the native asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Notional value in traded-asset units: size * rate.
    /// `None` when the product does not fit a `Decimal`.
    #[inline]
    pub fn notional(&self, price: Price) -> Option<Decimal> {
        self.0.checked_mul(price.0)
    }

    /// Size expressed in drops.
    pub fn to_drops(&self) -> Result<u64> {
        native_to_drops(self.0)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
