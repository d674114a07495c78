//! # Chain Configuration
//!
//! The client is bound to one RPC endpoint and one chain id. The chain id is
//! never auto-detected: [`ChainClient::connect`](crate::ChainClient::connect)
//! compares it to what the endpoint reports and refuses to continue on a
//! mismatch.
//!
//! Precedence: CLI flags > environment > defaults (zkSync Sepolia).

use std::time::Duration;

use tracing::{info, warn};

use crate::domain::errors::ChainError;

/// zkSync Era Sepolia public endpoint.
pub const DEFAULT_RPC_URL: &str = "https://sepolia.era.zksync.dev";

/// zkSync Era Sepolia chain id.
pub const DEFAULT_CHAIN_ID: u64 = 300;

/// Largest chain id whose EIP-155 `v` (`recovery_id + 35 + 2 * chain_id`)
/// fits in a u64.
pub const MAX_CHAIN_ID: u64 = (u64::MAX - 36) / 2;

/// Network connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Expected chain id.
    pub chain_id: u64,
    /// Label used in logs.
    pub network_name: String,
    /// Per-request HTTP timeout of the transport.
    pub request_timeout: Duration,
    /// Delay between `eth_getTransactionReceipt` polls.
    pub receipt_poll_interval: Duration,
    /// Give up waiting for a receipt after this long. `None` waits indefinitely.
    pub receipt_timeout: Option<Duration>,
    /// Fixed gas limit. `None` uses `eth_estimateGas`.
    pub gas_limit: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            network_name: "zksync-sepolia".to_string(),
            request_timeout: Duration::from_secs(30),
            receipt_poll_interval: Duration::from_secs(1),
            receipt_timeout: None,
            gas_limit: None,
        }
    }
}

impl ChainConfig {
    /// Defaults overridden by `DKIM_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`. Malformed values are
    /// ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DKIM_RPC_URL") {
            config.rpc_url = url;
            config.network_name = "custom".to_string();
            info!("Loaded RPC URL from environment");
        }

        if let Some(raw) = lookup("DKIM_CHAIN_ID") {
            match raw.parse() {
                Ok(id) => config.chain_id = id,
                Err(_) => warn!(value = %raw, "DKIM_CHAIN_ID must be an integer, ignoring"),
            }
        }

        if let Some(raw) = lookup("DKIM_RECEIPT_POLL_MS") {
            match raw.parse() {
                Ok(ms) => config.receipt_poll_interval = Duration::from_millis(ms),
                Err(_) => warn!(value = %raw, "DKIM_RECEIPT_POLL_MS must be an integer, ignoring"),
            }
        }

        if let Some(raw) = lookup("DKIM_RECEIPT_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => config.receipt_timeout = Some(Duration::from_secs(secs)),
                Err(_) => {
                    warn!(value = %raw, "DKIM_RECEIPT_TIMEOUT_SECS must be an integer, ignoring")
                }
            }
        }

        if let Some(raw) = lookup("DKIM_GAS_LIMIT") {
            match raw.parse() {
                Ok(gas) => config.gas_limit = Some(gas),
                Err(_) => warn!(value = %raw, "DKIM_GAS_LIMIT must be an integer, ignoring"),
            }
        }

        config
    }

    /// Override the endpoint.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Override the expected chain id.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.rpc_url.trim().is_empty() {
            return Err(ChainError::InvalidConfig("rpc_url cannot be empty".into()));
        }

        if self.chain_id == 0 {
            return Err(ChainError::InvalidConfig("chain_id cannot be 0".into()));
        }

        if self.chain_id > MAX_CHAIN_ID {
            return Err(ChainError::InvalidConfig(format!(
                "chain_id cannot exceed {MAX_CHAIN_ID}"
            )));
        }

        if self.receipt_poll_interval.is_zero() {
            return Err(ChainError::InvalidConfig(
                "receipt_poll_interval cannot be 0".into(),
            ));
        }

        if self.gas_limit == Some(0) {
            return Err(ChainError::InvalidConfig("gas_limit cannot be 0".into()));
        }

        Ok(())
    }
}
