//! Configuration types and validation for the prover helper.

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, U256};
use backon::ExponentialBuilder;
use thiserror::Error;
use url::Url;

use crate::{
    constants::{
        DEFAULT_ASSERTION_SCAN_START_BLOCK, DEFAULT_BLOCK_HASH_MAPPING_SLOT,
        DEFAULT_BUFFER_ADDRESS, DEFAULT_CACHE_SIZE, DEFAULT_LOG_CHUNK_SIZE,
        DEFAULT_LOG_SCAN_CONCURRENCY, DEFAULT_RETRY_INITIAL_DELAY, DEFAULT_RETRY_MAX_DELAY,
        DEFAULT_RPC_MAX_RETRIES, DEFAULT_RPC_TIMEOUT,
    },
    rpc::{ChainClient, ChainClientConfig, ChainClientImpl, RpcResult},
    types::ChainRole,
};

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    /// Invalid URL format.
    #[error("invalid {field} URL: {reason}")]
    InvalidUrl {
        /// The field name that contains the invalid URL.
        field: &'static str,
        /// The reason the URL is invalid.
        reason: String,
    },
    /// A field value is out of the allowed range.
    #[error("{field} must be {constraint}, got {value}")]
    OutOfRange {
        /// The field name that is out of range.
        field: &'static str,
        /// The constraint description.
        constraint: &'static str,
        /// The actual value.
        value: String,
    },
    /// A client was supplied for the wrong chain.
    #[error("expected a {expected} chain client, got a {actual} chain client")]
    RoleMismatch {
        /// The role the caller required.
        expected: ChainRole,
        /// The role of the supplied client.
        actual: ChainRole,
    },
}

/// Validate that a URL has a scheme and host.
pub fn validate_url(url: &Url, field: &'static str) -> Result<(), ConfigError> {
    if url.scheme().is_empty() {
        return Err(ConfigError::InvalidUrl { field, reason: "missing scheme".to_string() });
    }

    if url.host().is_none() {
        return Err(ConfigError::InvalidUrl { field, reason: "missing host".to_string() });
    }

    Ok(())
}

/// Checks that `client` serves the `expected` chain.
pub fn ensure_role(client: &dyn ChainClient, expected: ChainRole) -> Result<(), ConfigError> {
    let actual = client.role();
    if actual != expected {
        return Err(ConfigError::RoleMismatch { expected, actual });
    }
    Ok(())
}

/// Validated RPC retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts. Zero disables retries.
    pub max_attempts: u32,
    /// Initial delay for exponential backoff.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RPC_MAX_RETRIES,
            initial_delay: DEFAULT_RETRY_INITIAL_DELAY,
            max_delay: DEFAULT_RETRY_MAX_DELAY,
        }
    }
}

impl RetryConfig {
    /// Creates a `backon` [`ExponentialBuilder`] from this configuration.
    pub fn to_backoff_builder(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_attempts as usize)
            .with_jitter()
    }
}

/// How confirmation events are scanned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogScanConfig {
    /// First block of every scan.
    pub start_block: u64,
    /// Number of blocks covered by one `eth_getLogs` request.
    pub chunk_size: u64,
    /// Maximum number of requests in flight.
    pub concurrency: usize,
}

impl Default for LogScanConfig {
    fn default() -> Self {
        Self {
            start_block: DEFAULT_ASSERTION_SCAN_START_BLOCK,
            chunk_size: DEFAULT_LOG_CHUNK_SIZE,
            concurrency: DEFAULT_LOG_SCAN_CONCURRENCY,
        }
    }
}

impl LogScanConfig {
    /// Validates the scan parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "log-chunk-size",
                constraint: "greater than 0",
                value: self.chunk_size.to_string(),
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::OutOfRange {
                field: "log-scan-concurrency",
                constraint: "greater than 0",
                value: self.concurrency.to_string(),
            });
        }
        Ok(())
    }
}

/// Settings of the parent-to-child (assertion link) helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssertionLinkConfig {
    /// Address of the parent-to-child prover contract on the home chain.
    pub prover: Address,
    /// Event scan parameters.
    pub log_scan: LogScanConfig,
}

impl AssertionLinkConfig {
    /// Creates a config for `prover` with default scan parameters.
    pub fn new(prover: Address) -> Self {
        Self { prover, log_scan: LogScanConfig::default() }
    }
}

/// Settings of the child-to-parent (buffer link) helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLinkConfig {
    /// Address of the block hash buffer on the home chain.
    pub buffer: Address,
    /// Storage slot of the buffer's `blockNumber => blockHash` mapping.
    pub block_hash_mapping_slot: U256,
}

impl Default for BufferLinkConfig {
    fn default() -> Self {
        Self {
            buffer: DEFAULT_BUFFER_ADDRESS,
            block_hash_mapping_slot: U256::from(DEFAULT_BLOCK_HASH_MAPPING_SLOT),
        }
    }
}

/// Validated endpoint configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ProverHelperConfig {
    /// URL of the home chain RPC endpoint.
    pub home_rpc: Url,
    /// URL of the target chain RPC endpoint.
    pub target_rpc: Url,
    /// RPC request timeout.
    pub rpc_timeout: Duration,
    /// RPC retry configuration.
    pub retry: RetryConfig,
    /// Cache size for headers and proofs.
    pub cache_size: usize,
}

impl ProverHelperConfig {
    /// Builds a configuration from optional endpoints.
    ///
    /// Both endpoints are required; a missing one is a fatal configuration error.
    pub fn new(home_rpc: Option<Url>, target_rpc: Option<Url>) -> Result<Self, ConfigError> {
        let home_rpc = home_rpc.ok_or(ConfigError::Missing("home-rpc"))?;
        let target_rpc = target_rpc.ok_or(ConfigError::Missing("target-rpc"))?;
        validate_url(&home_rpc, "home-rpc")?;
        validate_url(&target_rpc, "target-rpc")?;

        Ok(Self {
            home_rpc,
            target_rpc,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            retry: RetryConfig::default(),
            cache_size: DEFAULT_CACHE_SIZE,
        })
    }

    /// Sets the RPC request timeout.
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                field: "rpc-timeout",
                constraint: "greater than 0",
                value: format!("{timeout:?}"),
            });
        }
        self.rpc_timeout = timeout;
        Ok(self)
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Client configuration for the given chain.
    pub fn client_config(&self, role: ChainRole) -> ChainClientConfig {
        let endpoint = match role {
            ChainRole::Home => self.home_rpc.clone(),
            ChainRole::Target => self.target_rpc.clone(),
        };
        ChainClientConfig::new(role, endpoint)
            .with_timeout(self.rpc_timeout)
            .with_cache_size(self.cache_size)
            .with_retry_config(self.retry.clone())
    }

    /// Creates the home and target chain clients.
    pub fn connect(&self) -> RpcResult<(Arc<dyn ChainClient>, Arc<dyn ChainClient>)> {
        let home = ChainClientImpl::new(self.client_config(ChainRole::Home))?;
        let target = ChainClientImpl::new(self.client_config(ChainRole::Target))?;
        Ok((Arc::new(home), Arc::new(target)))
    }
}
