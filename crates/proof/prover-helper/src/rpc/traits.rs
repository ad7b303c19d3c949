//! Async trait definition for historical chain queries.

use alloy_primitives::{Address, B256, Bytes};
use alloy_rpc_types_eth::{BlockId, EIP1186AccountProofResponse, Filter, Header, Log};
use async_trait::async_trait;

use super::error::RpcResult;
use crate::types::ChainRole;

/// Read-only historical query capability against one chain.
///
/// Every client is bound to a single [`ChainRole`]; the proof pipeline checks the
/// role before issuing a query so home and target queries are never mixed up.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The chain this client talks to.
    fn role(&self) -> ChainRole;

    /// Gets the latest block number.
    async fn block_number(&self) -> RpcResult<u64>;

    /// Gets a header by block number.
    async fn header_by_number(&self, number: u64) -> RpcResult<Header>;

    /// Gets a header by block hash.
    async fn header_by_hash(&self, hash: B256) -> RpcResult<Header>;

    /// Gets an account proof and storage proofs for `keys` via `eth_getProof`.
    async fn get_proof(
        &self,
        address: Address,
        keys: Vec<B256>,
        block_hash: B256,
    ) -> RpcResult<EIP1186AccountProofResponse>;

    /// Gets contract code at the given address.
    /// If `block_number` is `None`, uses the latest block.
    async fn code_at(&self, address: Address, block_number: Option<u64>) -> RpcResult<Bytes>;

    /// Executes a contract call against the state of `block` without creating
    /// a transaction.
    async fn call_contract(&self, to: Address, data: Bytes, block: BlockId) -> RpcResult<Bytes>;

    /// Gets logs matching `filter`.
    async fn get_logs(&self, filter: &Filter) -> RpcResult<Vec<Log>>;

    /// Gets the input of the transaction in block `block_number` whose receipt
    /// reports `address` as the created contract.
    ///
    /// Returns `None` when no transaction in that block created `address`
    /// directly (for example when it was deployed by a factory).
    async fn creation_input(&self, address: Address, block_number: u64)
    -> RpcResult<Option<Bytes>>;
}
