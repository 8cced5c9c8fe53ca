//! Market snapshot reader.
//!
//! Book reads degrade to "no liquidity" on any failure; balance and
//! offer reads are required and end the cycle when they fail.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use xrpmm_core::{pair_offers, BookSide, IssuedAsset, MarketSnapshot, OpenOffer, Price};
use xrpmm_ledger::DynLedgerClient;

use crate::error::{MakerError, MakerResult};

/// Best prices of both books. `None` means no usable liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookTop {
    pub ask: Option<Price>,
    pub bid: Option<Price>,
}

impl BookTop {
    /// Sides with no usable liquidity.
    pub fn missing(&self) -> Vec<BookSide> {
        let mut missing = Vec::new();
        if self.ask.is_none() {
            missing.push(BookSide::Ask);
        }
        if self.bid.is_none() {
            missing.push(BookSide::Bid);
        }
        missing
    }
}

/// Everything read from the ledger at the start of a cycle.
#[derive(Debug, Clone)]
pub struct MarketRead {
    pub book: BookTop,
    pub native_balance: Decimal,
    pub asset_balance: Decimal,
    /// Open offers trading the configured asset.
    pub offers: Vec<OpenOffer>,
}

impl MarketRead {
    /// Pricing snapshot, or `None` when either book is empty.
    pub fn snapshot(&self) -> MakerResult<Option<MarketSnapshot>> {
        match (self.book.ask, self.book.bid) {
            (Some(ask), Some(bid)) => Ok(Some(MarketSnapshot::new(
                ask,
                bid,
                self.native_balance,
                self.asset_balance,
            )?)),
            _ => Ok(None),
        }
    }
}

/// Reads book tops, balances and open offers for one asset pair.
pub struct SnapshotReader {
    ledger: DynLedgerClient,
    asset: IssuedAsset,
}

impl SnapshotReader {
    pub fn new(ledger: DynLedgerClient, asset: IssuedAsset) -> Self {
        Self { ledger, asset }
    }

    pub fn asset(&self) -> &IssuedAsset {
        &self.asset
    }

    /// Full read in ledger order: books, balances, offers.
    pub async fn read(&self) -> MakerResult<MarketRead> {
        let book = BookTop {
            ask: self.best_price(BookSide::Ask).await,
            bid: self.best_price(BookSide::Bid).await,
        };

        let native_balance = self
            .ledger
            .native_balance()
            .await
            .map_err(MakerError::BalanceRead)?;
        let asset_balance = self
            .ledger
            .asset_balance(&self.asset)
            .await
            .map_err(MakerError::BalanceRead)?;

        let offers = self.pair_offers().await?;

        debug!(
            ask = ?book.ask,
            bid = ?book.bid,
            native_balance = %native_balance,
            asset_balance = %asset_balance,
            offers = offers.len(),
            "Market read"
        );

        Ok(MarketRead {
            book,
            native_balance,
            asset_balance,
            offers,
        })
    }

    /// Best price of one book; empty books, bad qualities and transport
    /// errors all read as `None`.
    pub async fn best_price(&self, side: BookSide) -> Option<Price> {
        let top = match self.ledger.top_of_book(side, &self.asset).await {
            Ok(Some(top)) => top,
            Ok(None) => {
                debug!(%side, asset = %self.asset, "Book is empty");
                return None;
            }
            Err(e) => {
                warn!(%side, asset = %self.asset, error = %e, "Book read failed, treating as empty");
                return None;
            }
        };

        match top.price() {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(%side, quality = %top.quality, error = %e, "Unusable book quality");
                None
            }
        }
    }

    /// Open offers for the configured asset only.
    pub async fn pair_offers(&self) -> MakerResult<Vec<OpenOffer>> {
        let offers = self
            .ledger
            .list_open_offers()
            .await
            .map_err(MakerError::OfferRead)?;
        Ok(pair_offers(offers, &self.asset))
    }
}
