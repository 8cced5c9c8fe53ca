//! Account secret loading.
//!
//! Security notes:
//! - The seed is held in `Zeroizing` memory and wiped on drop.
//! - `Debug` never prints it.
//! - Loaded once at startup; no runtime rotation.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{LedgerError, LedgerResult};

/// Where the account seed comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSource {
    /// Environment variable name (development).
    Env(String),
    /// File path (production, recommend 0600 permissions).
    File(PathBuf),
}

impl Default for SecretSource {
    fn default() -> Self {
        Self::Env("XRPL_ACCOUNT_SECRET".to_string())
    }
}

/// Family seed used for sign-and-submit.
pub struct AccountSecret(Zeroizing<String>);

impl AccountSecret {
    /// Load and validate the seed from `source`.
    pub fn load(source: &SecretSource) -> LedgerResult<Self> {
        let raw = match source {
            SecretSource::Env(var_name) => Zeroizing::new(std::env::var(var_name).map_err(
                |_| LedgerError::Secret(format!("environment variable {var_name} not set")),
            )?),
            SecretSource::File(path) => Zeroizing::new(std::fs::read_to_string(path)?),
        };
        Self::parse(&raw)
    }

    /// Validate a seed string.
    pub fn parse(raw: &str) -> LedgerResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::Secret("seed is empty".to_string()));
        }
        if !trimmed.starts_with('s') || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LedgerError::Secret(
                "seed must be a base58 family seed starting with 's'".to_string(),
            ));
        }
        Ok(Self(Zeroizing::new(trimmed.to_string())))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccountSecret(***)")
    }
}
