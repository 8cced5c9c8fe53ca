//! rippled JSON-RPC wire types.
//!
//! Only the fields the market maker reads are modelled; everything else in
//! a response is ignored by serde.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use xrpmm_core::{parse_ledger_decimal, IssuedAsset, OfferAmount, OpenOffer};

use crate::error::{LedgerError, LedgerResult};

/// JSON-RPC request body: `{"method": ..., "params": [{...}]}`.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a, P: Serialize> {
    pub method: &'a str,
    pub params: [P; 1],
}

/// Response envelope. The payload is decoded after the status check.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcEnvelope {
    pub result: Value,
}

impl RpcEnvelope {
    /// Decode the result, turning `"status": "error"` into [`LedgerError::Rpc`].
    pub fn into_result<R: serde::de::DeserializeOwned>(self) -> LedgerResult<R> {
        if self.result.get("status").and_then(Value::as_str) == Some("error") {
            let code = self
                .result
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let message = self
                .result
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(LedgerError::Rpc { code, message });
        }
        Ok(serde_json::from_value(self.result)?)
    }
}

/// Amount as the ledger encodes it: a drops string for the native asset,
/// an object for issued assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireAmount {
    Drops(String),
    Issued {
        currency: String,
        issuer: String,
        value: String,
    },
}

impl WireAmount {
    pub fn into_amount(self) -> LedgerResult<OfferAmount> {
        match self {
            Self::Drops(drops) => drops
                .parse::<u64>()
                .map(OfferAmount::Native)
                .map_err(|e| LedgerError::Parse(format!("invalid drops amount {drops:?}: {e}"))),
            Self::Issued {
                currency,
                issuer,
                value,
            } => Ok(OfferAmount::Issued {
                asset: IssuedAsset { currency, issuer },
                value: parse_ledger_decimal(&value)?,
            }),
        }
    }

    /// Issued amount for `asset` with `value` printed at full precision.
    pub fn issued(asset: &IssuedAsset, value: Decimal) -> Self {
        Self::Issued {
            currency: asset.currency.clone(),
            issuer: asset.issuer.clone(),
            value: value.normalize().to_string(),
        }
    }
}

/// Book filter leg: `{"currency": "XRP"}` or `{"currency", "issuer"}`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BookAsset {
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl BookAsset {
    pub fn native() -> Self {
        Self {
            currency: "XRP".to_string(),
            issuer: None,
        }
    }

    pub fn issued(asset: &IssuedAsset) -> Self {
        Self {
            currency: asset.currency.clone(),
            issuer: Some(asset.issuer.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AccountParams<'a> {
    pub account: &'a str,
    pub ledger_index: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Value>,
}

impl<'a> AccountParams<'a> {
    /// Open ledger: sees cancels and creates submitted moments ago.
    pub fn current(account: &'a str, marker: Option<Value>) -> Self {
        Self {
            account,
            ledger_index: "current",
            marker,
        }
    }

    /// Last validated ledger.
    pub fn validated(account: &'a str) -> Self {
        Self {
            account,
            ledger_index: "validated",
            marker: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BookOffersParams {
    pub taker_gets: BookAsset,
    pub taker_pays: BookAsset,
    pub limit: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitParams<'a> {
    pub tx_json: Value,
    pub secret: &'a str,
    pub fee_mult_max: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmptyParams {}

#[derive(Debug, Deserialize)]
pub struct WireOffer {
    pub seq: u32,
    pub taker_gets: WireAmount,
    pub taker_pays: WireAmount,
}

impl WireOffer {
    pub fn into_offer(self) -> LedgerResult<OpenOffer> {
        Ok(OpenOffer {
            sequence: self.seq,
            taker_gets: self.taker_gets.into_amount()?,
            taker_pays: self.taker_pays.into_amount()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AccountOffersResult {
    #[serde(default)]
    pub offers: Vec<WireOffer>,
    #[serde(default)]
    pub marker: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct WireBookOffer {
    pub quality: String,
}

#[derive(Debug, Deserialize)]
pub struct BookOffersResult {
    #[serde(default)]
    pub offers: Vec<WireBookOffer>,
}

#[derive(Debug, Deserialize)]
pub struct AccountData {
    #[serde(rename = "Balance")]
    pub balance: String,
    #[serde(rename = "OwnerCount", default)]
    pub owner_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct AccountInfoResult {
    pub account_data: AccountData,
}

#[derive(Debug, Deserialize)]
pub struct WireTrustLine {
    /// Counterparty of the line, i.e. the issuer for a holder's line.
    pub account: String,
    pub balance: String,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountLinesResult {
    #[serde(default)]
    pub lines: Vec<WireTrustLine>,
    #[serde(default)]
    pub marker: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResult {
    pub engine_result: String,
    #[serde(default)]
    pub engine_result_message: String,
    #[serde(default)]
    pub tx_json: Option<Value>,
}

impl SubmitResult {
    pub fn tx_hash(&self) -> Option<&str> {
        self.tx_json.as_ref()?.get("hash")?.as_str()
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub build_version: Option<String>,
    #[serde(default)]
    pub server_state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServerInfoResult {
    pub info: ServerInfo,
}
