//! Client configuration.
//!
//! Values come from an optional file (any format the `config` crate infers
//! from the extension) overlaid with `NAMEREG_*` environment variables, e.g.
//! `NAMEREG_RPC_URL` or `NAMEREG_REGISTRY_ADDRESS`.

use anyhow::{Context, Result};
use config::{Config, Environment, File as ConfigFile};
use namereg_registry::DeletePolicy;
use namereg_types::Address;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "NAMEREG";

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_RECEIPT_POLL_ATTEMPTS: u32 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct SdkConfig {
    /// JSON-RPC endpoint of the ledger node.
    pub rpc_url: String,
    /// Address of the registry contract. Bootstrapping this is out of band.
    pub registry_address: Address,
    /// Identity state-changing calls are sent as.
    #[serde(default)]
    pub sender: Address,
    pub request_timeout_ms: u64,
    pub receipt_poll_interval_ms: u64,
    pub receipt_poll_attempts: u32,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
    pub log_level: String,
    /// `pretty` or `json`.
    pub log_format: String,
}

impl SdkConfig {
    /// Load from `path` (if given) and the `NAMEREG_*` environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("Configuration file {} not found", path.display());
            }
        }

        let mut builder = Config::builder()
            .set_default("rpc_url", DEFAULT_RPC_URL)?
            .set_default("request_timeout_ms", DEFAULT_REQUEST_TIMEOUT_MS)?
            .set_default("receipt_poll_interval_ms", DEFAULT_RECEIPT_POLL_INTERVAL_MS)?
            .set_default("receipt_poll_attempts", i64::from(DEFAULT_RECEIPT_POLL_ATTEMPTS))?
            .set_default("log_level", "info")?
            .set_default("log_format", "pretty")?;

        if let Some(path) = path {
            builder = builder.add_source(ConfigFile::from(path));
        }
        builder = builder.add_source(Environment::with_prefix(env_prefix));

        let config = builder.build()?;
        let parsed: SdkConfig = config
            .try_deserialize()
            .context("invalid name registry client configuration")?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<()> {
        if self.registry_address.is_zero() {
            anyhow::bail!("registry_address must not be the zero address");
        }
        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!("log_format must be `pretty` or `json`, got `{}`", self.log_format);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}
