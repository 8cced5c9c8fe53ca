//! rippled JSON-RPC client.
//!
//! Talks to a rippled node over HTTP POST. Transactions use the node's
//! sign-and-submit mode, so the node must allow signing (an operator-run
//! node; public servers refuse it).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use xrpmm_core::{
    parse_ledger_decimal, BookSide, IssuedAsset, OfferRequest, OpenOffer, OrderSide, TopOfBook,
};

use crate::client::{BoxFuture, LedgerClient, SubmitOutcome};
use crate::error::{LedgerError, LedgerResult};
use crate::secret::{AccountSecret, SecretSource};
use crate::wire::{
    AccountInfoResult, AccountLinesResult, AccountOffersResult, AccountParams, BookAsset,
    BookOffersParams, BookOffersResult, EmptyParams, RpcEnvelope, RpcRequest, ServerInfoResult,
    SubmitParams, SubmitResult, WireAmount,
};

/// Upper bound on pages followed for a paginated account query.
const MAX_PAGES: usize = 50;

/// Ledger connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the rippled node.
    #[serde(default = "default_url")]
    pub url: String,

    /// Operating account (classic address).
    pub account: String,

    /// Where to load the account seed from.
    #[serde(default)]
    pub secret: SecretSource,

    /// Native amount held back as reserve and never quoted.
    #[serde(default = "default_reserve_xrp")]
    pub reserve_xrp: Decimal,

    /// Maximum fee multiplier the node may apply when auto-filling fees.
    #[serde(default = "default_fee_mult_max")]
    pub fee_mult_max: u32,

    /// HTTP transport timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_url() -> String {
    "http://127.0.0.1:5005".to_string()
}

fn default_reserve_xrp() -> Decimal {
    Decimal::TEN
}

fn default_fee_mult_max() -> u32 {
    1000
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            account: String::new(),
            secret: SecretSource::default(),
            reserve_xrp: default_reserve_xrp(),
            fee_mult_max: default_fee_mult_max(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> LedgerResult<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(LedgerError::Config(format!(
                "url must be http(s): {}",
                self.url
            )));
        }
        if !self.account.starts_with('r') || self.account.len() < 25 {
            return Err(LedgerError::Config(format!(
                "account is not a classic address: {:?}",
                self.account
            )));
        }
        if self.reserve_xrp.is_sign_negative() {
            return Err(LedgerError::Config("reserve_xrp must be >= 0".to_string()));
        }
        Ok(())
    }
}

/// Ledger client backed by rippled JSON-RPC.
pub struct JsonRpcLedger {
    client: Client,
    config: LedgerConfig,
    secret: AccountSecret,
    connected: AtomicBool,
}

impl JsonRpcLedger {
    /// Create a client. Does not touch the network until [`LedgerClient::connect`].
    pub fn new(config: LedgerConfig, secret: AccountSecret) -> LedgerResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| LedgerError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            secret,
            connected: AtomicBool::new(false),
        })
    }

    pub fn account(&self) -> &str {
        &self.config.account
    }

    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> LedgerResult<R> {
        let request = RpcRequest {
            method,
            params: [params],
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::HttpClient(format!("{method} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::HttpClient(format!(
                "{method}: HTTP {status}: {body}"
            )));
        }

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| LedgerError::Parse(format!("{method}: {e}")))?;
        envelope.into_result()
    }

    /// Like [`Self::call`], but refuses to run before `connect()`.
    async fn call_connected<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> LedgerResult<R> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(LedgerError::NotConnected);
        }
        self.call(method, params).await
    }

    /// Offers and trust lines come from the open ledger, the native
    /// balance from the last validated one.
    fn offers_params(&self, marker: Option<Value>) -> AccountParams<'_> {
        AccountParams::current(&self.config.account, marker)
    }

    fn lines_params(&self, marker: Option<Value>) -> AccountParams<'_> {
        AccountParams::current(&self.config.account, marker)
    }

    fn balance_params(&self) -> AccountParams<'_> {
        AccountParams::validated(&self.config.account)
    }

    async fn fetch_offers(&self) -> LedgerResult<Vec<OpenOffer>> {
        let mut offers = Vec::new();
        let mut marker = None;

        for _ in 0..MAX_PAGES {
            let page: AccountOffersResult = self
                .call_connected("account_offers", self.offers_params(marker.take()))
                .await?;

            for offer in page.offers {
                offers.push(offer.into_offer()?);
            }

            match page.marker {
                Some(next) => marker = Some(next),
                None => return Ok(offers),
            }
        }

        warn!(pages = MAX_PAGES, "account_offers pagination limit reached");
        Ok(offers)
    }

    async fn fetch_top_of_book(
        &self,
        side: BookSide,
        asset: &IssuedAsset,
    ) -> LedgerResult<Option<TopOfBook>> {
        let (taker_gets, taker_pays) = match side {
            BookSide::Ask => (BookAsset::native(), BookAsset::issued(asset)),
            BookSide::Bid => (BookAsset::issued(asset), BookAsset::native()),
        };

        let result: BookOffersResult = self
            .call_connected(
                "book_offers",
                BookOffersParams {
                    taker_gets,
                    taker_pays,
                    limit: 1,
                },
            )
            .await?;

        match result.offers.first() {
            Some(best) => Ok(Some(TopOfBook {
                side,
                quality: parse_ledger_decimal(&best.quality)?,
            })),
            None => Ok(None),
        }
    }

    async fn fetch_native_balance(&self) -> LedgerResult<Decimal> {
        let info: AccountInfoResult = self
            .call_connected("account_info", self.balance_params())
            .await?;

        let drops: u64 = info.account_data.balance.parse().map_err(|e| {
            LedgerError::Parse(format!(
                "invalid Balance {:?}: {e}",
                info.account_data.balance
            ))
        })?;

        let balance = xrpmm_core::drops_to_native(drops) - self.config.reserve_xrp;
        debug!(
            drops,
            owner_count = info.account_data.owner_count,
            spendable = %balance,
            "Native balance read"
        );
        Ok(balance)
    }

    async fn fetch_asset_balance(&self, asset: &IssuedAsset) -> LedgerResult<Decimal> {
        let mut marker = None;

        for _ in 0..MAX_PAGES {
            let page: AccountLinesResult = self
                .call_connected("account_lines", self.lines_params(marker.take()))
                .await?;

            if let Some(line) = page
                .lines
                .iter()
                .find(|line| asset.is(&line.currency, &line.account))
            {
                return Ok(parse_ledger_decimal(&line.balance)?);
            }

            match page.marker {
                Some(next) => marker = Some(next),
                None => return Ok(Decimal::ZERO),
            }
        }

        warn!(pages = MAX_PAGES, "account_lines pagination limit reached");
        Ok(Decimal::ZERO)
    }

    async fn submit(&self, tx_json: Value) -> SubmitOutcome {
        let params = SubmitParams {
            tx_json,
            secret: self.secret.expose(),
            fee_mult_max: self.config.fee_mult_max,
        };

        match self.call_connected::<_, SubmitResult>("submit", params).await {
            Ok(result) => {
                debug!(
                    engine_result = %result.engine_result,
                    hash = result.tx_hash().unwrap_or("-"),
                    "Submit answered"
                );
                SubmitOutcome::from_engine_result(
                    result.engine_result,
                    result.engine_result_message,
                )
            }
            Err(e) => SubmitOutcome::Failed(e.to_string()),
        }
    }

    fn offer_create_tx(&self, request: &OfferRequest) -> LedgerResult<Value> {
        let drops = WireAmount::Drops(request.size.to_drops()?.to_string());
        let issued = WireAmount::issued(&request.asset, request.notional);

        let (taker_gets, taker_pays) = match request.side {
            OrderSide::Sell => (drops, issued),
            OrderSide::Buy => (issued, drops),
        };

        Ok(json!({
            "TransactionType": "OfferCreate",
            "Account": self.config.account,
            "Flags": 0,
            "TakerGets": taker_gets,
            "TakerPays": taker_pays,
        }))
    }
}

impl LedgerClient for JsonRpcLedger {
    fn connect(&self) -> BoxFuture<'_, LedgerResult<()>> {
        Box::pin(async move {
            let result: ServerInfoResult = self.call("server_info", EmptyParams {}).await?;
            self.connected.store(true, Ordering::SeqCst);
            info!(
                url = %self.config.url,
                account = %self.config.account,
                build_version = result.info.build_version.as_deref().unwrap_or("unknown"),
                server_state = result.info.server_state.as_deref().unwrap_or("unknown"),
                "Connected to ledger node"
            );
            Ok(())
        })
    }

    fn disconnect(&self) -> BoxFuture<'_, LedgerResult<()>> {
        Box::pin(async move {
            self.connected.store(false, Ordering::SeqCst);
            info!(url = %self.config.url, "Disconnected from ledger node");
            Ok(())
        })
    }

    fn list_open_offers(&self) -> BoxFuture<'_, LedgerResult<Vec<OpenOffer>>> {
        Box::pin(self.fetch_offers())
    }

    fn top_of_book<'a>(
        &'a self,
        side: BookSide,
        asset: &'a IssuedAsset,
    ) -> BoxFuture<'a, LedgerResult<Option<TopOfBook>>> {
        Box::pin(self.fetch_top_of_book(side, asset))
    }

    fn native_balance(&self) -> BoxFuture<'_, LedgerResult<Decimal>> {
        Box::pin(self.fetch_native_balance())
    }

    fn asset_balance<'a>(&'a self, asset: &'a IssuedAsset) -> BoxFuture<'a, LedgerResult<Decimal>> {
        Box::pin(self.fetch_asset_balance(asset))
    }

    fn cancel_offer(&self, sequence: u32) -> BoxFuture<'_, SubmitOutcome> {
        Box::pin(async move {
            let tx = json!({
                "TransactionType": "OfferCancel",
                "Account": self.config.account,
                "OfferSequence": sequence,
            });
            self.submit(tx).await
        })
    }

    fn create_offer(&self, request: OfferRequest) -> BoxFuture<'_, SubmitOutcome> {
        Box::pin(async move {
            match self.offer_create_tx(&request) {
                Ok(tx) => self.submit(tx).await,
                Err(e) => SubmitOutcome::Failed(e.to_string()),
            }
        })
    }
}
