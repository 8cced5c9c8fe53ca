//! Application configuration.
//!
//! A TOML file layered with `XRPMM__SECTION__KEY` environment overrides.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use xrpmm_core::IssuedAsset;
use xrpmm_ledger::LedgerConfig;
use xrpmm_mm::MakerConfig;

use crate::error::{AppError, AppResult};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "XRPMM";

/// Traded asset of the pair (the other leg is always native).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    /// Currency code, e.g. "USD".
    pub currency: String,
    /// Issuing account.
    pub issuer: String,
}

impl PairConfig {
    pub fn asset(&self) -> AppResult<IssuedAsset> {
        Ok(IssuedAsset::new(&self.currency, &self.issuer)?)
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Dump the metrics registry to the log at shutdown.
    #[serde(default = "default_true")]
    pub log_metrics_on_shutdown: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_metrics_on_shutdown: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub ledger: LedgerConfig,
    pub pair: PairConfig,
    #[serde(default)]
    pub maker: MakerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load from a TOML file plus `XRPMM__` environment overrides.
    pub fn from_file(path: &str) -> AppResult<Self> {
        if !Path::new(path).exists() {
            return Err(AppError::Config(format!("config file not found: {path}")));
        }
        Self::from_sources(File::new(path, FileFormat::Toml), ENV_PREFIX)
    }

    /// Load from TOML text plus environment overrides under `env_prefix`.
    pub fn from_toml_str(content: &str, env_prefix: &str) -> AppResult<Self> {
        Self::from_sources(File::from_str(content, FileFormat::Toml), env_prefix)
    }

    fn from_sources<S>(file: S, env_prefix: &str) -> AppResult<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: Self = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> AppResult<()> {
        self.ledger.validate()?;
        self.maker.validate()?;
        self.pair.asset()?;
        Ok(())
    }
}
