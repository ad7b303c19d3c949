//! Alloy-backed [`ChainClient`] implementation.

use std::time::Duration;

use alloy_consensus::Transaction as _;
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, B256, Bytes};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::{
    BlockId, EIP1186AccountProofResponse, Filter, Header, Log, TransactionInput,
    TransactionRequest,
};
use alloy_transport_http::{Http, reqwest::Client};
use async_trait::async_trait;
use backon::Retryable;
use tracing::debug;
use url::Url;

use super::{
    HttpProvider,
    cache::HeaderCache,
    error::{RpcError, RpcResult},
    traits::ChainClient,
};
use crate::{
    config::RetryConfig,
    constants::{DEFAULT_CACHE_SIZE, DEFAULT_RPC_TIMEOUT},
    types::ChainRole,
};

/// Configuration for a chain client.
#[derive(Debug, Clone)]
pub struct ChainClientConfig {
    /// Which chain the endpoint serves.
    pub role: ChainRole,
    /// RPC endpoint URL.
    pub endpoint: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// Number of headers kept in the header cache.
    pub cache_size: usize,
    /// Retry configuration.
    pub retry_config: RetryConfig,
}

impl ChainClientConfig {
    /// Creates a new client configuration with defaults.
    pub fn new(role: ChainRole, endpoint: Url) -> Self {
        Self {
            role,
            endpoint,
            timeout: DEFAULT_RPC_TIMEOUT,
            cache_size: DEFAULT_CACHE_SIZE,
            retry_config: RetryConfig::default(),
        }
    }

    /// Sets the request timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the header cache size.
    pub const fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Sets the retry configuration.
    pub const fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }
}

/// Chain client implementation using Alloy.
pub struct ChainClientImpl {
    role: ChainRole,
    provider: HttpProvider,
    headers: HeaderCache,
    retry_config: RetryConfig,
}

impl std::fmt::Debug for ChainClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClientImpl")
            .field("role", &self.role)
            .field("cached_headers", &self.headers.entry_count())
            .finish_non_exhaustive()
    }
}

impl ChainClientImpl {
    /// Creates a new chain client from the given configuration.
    pub fn new(config: ChainClientConfig) -> RpcResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RpcError::Connection(format!("Failed to build HTTP client: {e}")))?;

        let http = Http::with_client(client, config.endpoint);
        let rpc_client = RpcClient::new(http, false);

        // Read-only, so no fillers.
        let provider = RootProvider::new(rpc_client);

        Ok(Self {
            role: config.role,
            provider,
            headers: HeaderCache::new(config.role, config.cache_size),
            retry_config: config.retry_config,
        })
    }

    fn log_retry(&self, method: &'static str, err: &RpcError, delay: Duration) {
        debug!(role = %self.role, method, error = %err, ?delay, "Retrying RPC call");
    }

    async fn fetch_header(&self, block_id: BlockId) -> RpcResult<Header> {
        let backoff = self.retry_config.to_backoff_builder();

        let block = (|| async { self.provider.get_block(block_id).await.map_err(RpcError::from) })
            .retry(backoff)
            .when(|e| e.is_retryable())
            .notify(|err, dur| self.log_retry("eth_getBlock", err, dur))
            .await?
            .ok_or_else(|| {
                RpcError::HeaderNotFound(format!("{} header not found for {block_id:?}", self.role))
            })?;

        let header = block.header;
        self.headers.insert(header.clone()).await;

        Ok(header)
    }
}

#[async_trait]
impl ChainClient for ChainClientImpl {
    fn role(&self) -> ChainRole {
        self.role
    }

    async fn block_number(&self) -> RpcResult<u64> {
        let backoff = self.retry_config.to_backoff_builder();

        (|| async { self.provider.get_block_number().await.map_err(RpcError::from) })
            .retry(backoff)
            .when(|e| e.is_retryable())
            .notify(|err, dur| self.log_retry("eth_blockNumber", err, dur))
            .await
    }

    async fn header_by_number(&self, number: u64) -> RpcResult<Header> {
        self.fetch_header(BlockId::number(number)).await
    }

    async fn header_by_hash(&self, hash: B256) -> RpcResult<Header> {
        if let Some(header) = self.headers.get(&hash).await {
            return Ok(header);
        }

        self.fetch_header(BlockId::hash(hash)).await
    }

    async fn get_proof(
        &self,
        address: Address,
        keys: Vec<B256>,
        block_hash: B256,
    ) -> RpcResult<EIP1186AccountProofResponse> {
        let backoff = self.retry_config.to_backoff_builder();

        (|| async {
            self.provider
                .get_proof(address, keys.clone())
                .block_id(BlockId::hash(block_hash))
                .await
                .map_err(RpcError::from)
        })
        .retry(backoff)
        .when(|e| e.is_retryable())
        .notify(|err, dur| self.log_retry("eth_getProof", err, dur))
        .await
    }

    async fn code_at(&self, address: Address, block_number: Option<u64>) -> RpcResult<Bytes> {
        let block_id = BlockId::Number(
            block_number.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number),
        );

        let backoff = self.retry_config.to_backoff_builder();

        (|| async {
            self.provider.get_code_at(address).block_id(block_id).await.map_err(RpcError::from)
        })
        .retry(backoff)
        .when(|e| e.is_retryable())
        .notify(|err, dur| self.log_retry("eth_getCode", err, dur))
        .await
    }

    async fn call_contract(&self, to: Address, data: Bytes, block: BlockId) -> RpcResult<Bytes> {
        let backoff = self.retry_config.to_backoff_builder();

        (|| async {
            let req =
                TransactionRequest::default().to(to).input(TransactionInput::new(data.clone()));
            self.provider.call(req).block(block).await.map_err(RpcError::from)
        })
        .retry(backoff)
        .when(|e| e.is_retryable())
        .notify(|err, dur| self.log_retry("eth_call", err, dur))
        .await
    }

    async fn get_logs(&self, filter: &Filter) -> RpcResult<Vec<Log>> {
        let backoff = self.retry_config.to_backoff_builder();

        (|| async { self.provider.get_logs(filter).await.map_err(RpcError::from) })
            .retry(backoff)
            .when(|e| e.is_retryable())
            .notify(|err, dur| self.log_retry("eth_getLogs", err, dur))
            .await
    }

    async fn creation_input(
        &self,
        address: Address,
        block_number: u64,
    ) -> RpcResult<Option<Bytes>> {
        let backoff = self.retry_config.to_backoff_builder();
        let block_id = BlockId::number(block_number);

        let receipts = (|| async {
            self.provider.get_block_receipts(block_id).await.map_err(RpcError::from)
        })
        .retry(backoff)
        .when(|e| e.is_retryable())
        .notify(|err, dur| self.log_retry("eth_getBlockReceipts", err, dur))
        .await?
        .ok_or_else(|| {
            RpcError::BlockNotFound(format!("Block receipts not found for block {block_number}"))
        })?;

        let Some(tx_hash) = receipts
            .iter()
            .find(|receipt| receipt.contract_address == Some(address))
            .map(|receipt| receipt.transaction_hash)
        else {
            return Ok(None);
        };

        let backoff = self.retry_config.to_backoff_builder();

        let tx = (|| async {
            self.provider.get_transaction_by_hash(tx_hash).await.map_err(RpcError::from)
        })
        .retry(backoff)
        .when(|e| e.is_retryable())
        .notify(|err, dur| self.log_retry("eth_getTransactionByHash", err, dur))
        .await?
        .ok_or_else(|| RpcError::InvalidResponse(format!("Transaction {tx_hash} not found")))?;

        Ok(Some(tx.input().clone()))
    }
}
