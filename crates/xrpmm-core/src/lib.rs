//! Core domain types for the XRPL market maker.
//!
//! This crate provides the types shared by the ledger client and the
//! decision engine:
//! - `Price`, `Size`: precision-safe numeric types with 6-dp quote rounding
//! - `IssuedAsset`, `OfferAmount`, `OpenOffer`: ledger assets and resting offers
//! - `TopOfBook`, `MarketSnapshot`: per-cycle market state
//! - `Clock`: injectable wall clock

pub mod asset;
pub mod clock;
pub mod decimal;
pub mod error;
pub mod order;
pub mod types;

pub use asset::{pair_offers, IssuedAsset, OfferAmount, OpenOffer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use decimal::{
    drops_to_native, native_to_drops, parse_ledger_decimal, round_dp, Price, Size,
    DROPS_PER_NATIVE, QUOTE_DECIMALS,
};
pub use error::{CoreError, Result};
pub use order::{OfferRequest, OrderSide};
pub use types::{BookSide, MarketSnapshot, TopOfBook};
