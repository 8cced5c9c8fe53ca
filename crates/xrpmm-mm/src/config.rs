//! Market making configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use xrpmm_core::QUOTE_DECIMALS;

use crate::error::{MakerError, MakerResult};

/// Market making configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerConfig {
    /// Total value / native value at balance.
    /// 1.5 means the native leg should hold two thirds of total value.
    #[serde(default = "default_target_ratio")]
    pub target_ratio: Decimal,

    /// Distance of each quote from mid, in percent.
    #[serde(default = "default_spread_pct")]
    pub spread_pct: Decimal,

    /// Smallest lot (native units) worth quoting.
    #[serde(default = "default_min_lot")]
    pub min_lot: Decimal,

    /// Minimum quote notional as a fraction of total value.
    #[serde(default = "default_min_notional_ratio")]
    pub min_notional_ratio: Decimal,

    /// Force a cancel-all when the host's local minute of the hour is a
    /// multiple of this.
    #[serde(default = "default_reset_interval_minutes")]
    pub reset_interval_minutes: u32,

    /// Seconds between scheduled cycles.
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,

    /// Decimal places for quote rates and lot sizes.
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            target_ratio: default_target_ratio(),
            spread_pct: default_spread_pct(),
            min_lot: default_min_lot(),
            min_notional_ratio: default_min_notional_ratio(),
            reset_interval_minutes: default_reset_interval_minutes(),
            cycle_interval_secs: default_cycle_interval_secs(),
            price_decimals: default_price_decimals(),
        }
    }
}

impl MakerConfig {
    /// Reject values the quote formula cannot work with.
    pub fn validate(&self) -> MakerResult<()> {
        if self.target_ratio <= Decimal::ZERO {
            return Err(MakerError::InvalidConfig(format!(
                "target_ratio must be > 0, got {}",
                self.target_ratio
            )));
        }
        if self.spread_pct <= Decimal::ZERO || self.spread_pct >= Decimal::ONE_HUNDRED {
            return Err(MakerError::InvalidConfig(format!(
                "spread_pct must be in (0, 100), got {}",
                self.spread_pct
            )));
        }
        if self.min_lot.is_sign_negative() || self.min_notional_ratio.is_sign_negative() {
            return Err(MakerError::InvalidConfig(
                "min_lot and min_notional_ratio must be >= 0".to_string(),
            ));
        }
        if self.reset_interval_minutes == 0 {
            return Err(MakerError::InvalidConfig(
                "reset_interval_minutes must be >= 1".to_string(),
            ));
        }
        if self.cycle_interval_secs == 0 {
            return Err(MakerError::InvalidConfig(
                "cycle_interval_secs must be >= 1".to_string(),
            ));
        }
        // Lots are submitted in drops.
        if self.price_decimals > QUOTE_DECIMALS {
            return Err(MakerError::InvalidConfig(format!(
                "price_decimals must be <= {QUOTE_DECIMALS}, got {}",
                self.price_decimals
            )));
        }
        Ok(())
    }
}

fn default_target_ratio() -> Decimal {
    Decimal::new(15, 1) // 1.5
}
fn default_spread_pct() -> Decimal {
    Decimal::new(6, 1) // 0.6%
}
fn default_min_lot() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}
fn default_min_notional_ratio() -> Decimal {
    Decimal::new(95, 5) // 0.00095
}
fn default_reset_interval_minutes() -> u32 {
    15
}
fn default_cycle_interval_secs() -> u64 {
    20
}
fn default_price_decimals() -> u32 {
    QUOTE_DECIMALS
}
