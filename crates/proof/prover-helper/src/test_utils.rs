//! Shared test utilities: an in-memory chain client and header/log builders.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use alloy_consensus::Header as ConsensusHeader;
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_rpc_types_eth::{
    BlockId, EIP1186AccountProofResponse, EIP1186StorageProof, Filter, Header, Log,
};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;

use crate::{
    rpc::{ChainClient, RpcError, RpcResult},
    types::ChainRole,
};

/// Wraps a consensus header in an RPC header carrying its real hash.
pub(crate) fn sealed_header(inner: ConsensusHeader) -> Header {
    Header { hash: inner.hash_slow(), inner, total_difficulty: None, size: None }
}

/// An `eth_getProof` response for `address` carrying one storage entry.
pub(crate) fn proof_response(
    address: Address,
    account_proof: Vec<Bytes>,
    key: B256,
    value: U256,
    storage_proof: Vec<Bytes>,
) -> EIP1186AccountProofResponse {
    EIP1186AccountProofResponse {
        address,
        balance: U256::ZERO,
        code_hash: B256::ZERO,
        nonce: 0,
        storage_hash: B256::ZERO,
        account_proof,
        storage_proof: vec![EIP1186StorageProof { key: key.into(), value, proof: storage_proof }],
    }
}

/// Builds an RPC log for `event` emitted by `address` at `block_number`.
pub(crate) fn event_log<E: SolEvent>(
    address: Address,
    event: &E,
    block_number: u64,
    log_index: u64,
) -> Log {
    Log {
        inner: alloy_primitives::Log { address, data: event.encode_log_data() },
        block_number: Some(block_number),
        log_index: Some(log_index),
        ..Default::default()
    }
}

/// In-memory chain with historical contract state.
///
/// Contract reads are keyed by target and calldata. Each key holds a history of
/// `(from_block, return_data)` entries; a read at block `b` sees the newest entry
/// with `from_block <= b`. Reads by hash resolve `b` through the known headers,
/// and every block id a read was issued against is recorded.
pub(crate) struct MockChainClient {
    role: ChainRole,
    head: u64,
    headers: Vec<Header>,
    headers_by_number: HashMap<u64, Header>,
    proofs: HashMap<(Address, B256), EIP1186AccountProofResponse>,
    code: HashMap<Address, (u64, Bytes)>,
    calls: HashMap<(Address, Bytes), Vec<(u64, Bytes)>>,
    logs: Vec<Log>,
    creation_inputs: HashMap<Address, (u64, Bytes)>,
    get_logs_calls: AtomicUsize,
    call_blocks: Mutex<Vec<BlockId>>,
}

impl MockChainClient {
    pub(crate) fn new(role: ChainRole, head: u64) -> Self {
        Self {
            role,
            head,
            headers: Vec::new(),
            headers_by_number: HashMap::new(),
            proofs: HashMap::new(),
            code: HashMap::new(),
            calls: HashMap::new(),
            logs: Vec::new(),
            creation_inputs: HashMap::new(),
            get_logs_calls: AtomicUsize::new(0),
            call_blocks: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn home(head: u64) -> Self {
        Self::new(ChainRole::Home, head)
    }

    pub(crate) fn target(head: u64) -> Self {
        Self::new(ChainRole::Target, head)
    }

    pub(crate) fn with_header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    /// Serves `header` for lookups of block `number`, whatever its own number is.
    pub(crate) fn with_header_at(mut self, number: u64, header: Header) -> Self {
        self.headers_by_number.insert(number, header);
        self
    }

    pub(crate) fn with_proof(
        mut self,
        block_hash: B256,
        result: EIP1186AccountProofResponse,
    ) -> Self {
        self.proofs.insert((result.address, block_hash), result);
        self
    }

    /// Deploys `code` at `address` starting from `block_number`.
    pub(crate) fn with_code(mut self, address: Address, block_number: u64, code: Bytes) -> Self {
        self.code.insert(address, (block_number, code));
        self
    }

    /// Makes `call` on `to` return `ret` from `from_block` onwards.
    pub(crate) fn with_call<C: SolCall, R: SolValue>(
        mut self,
        to: Address,
        call: C,
        from_block: u64,
        ret: R,
    ) -> Self {
        let history = self.calls.entry((to, call.abi_encode().into())).or_default();
        history.push((from_block, ret.abi_encode().into()));
        history.sort_by_key(|(from, _)| *from);
        self
    }

    pub(crate) fn with_log(mut self, log: Log) -> Self {
        self.logs.push(log);
        self
    }

    pub(crate) fn with_creation_input(
        mut self,
        address: Address,
        block_number: u64,
        input: Bytes,
    ) -> Self {
        self.creation_inputs.insert(address, (block_number, input));
        self
    }

    pub(crate) fn get_logs_calls(&self) -> usize {
        self.get_logs_calls.load(Ordering::SeqCst)
    }

    /// Block ids contract reads were issued against, in order.
    pub(crate) fn call_blocks(&self) -> Vec<BlockId> {
        self.call_blocks.lock().unwrap().clone()
    }

    fn block_number_of(&self, block: BlockId) -> RpcResult<u64> {
        match block {
            BlockId::Hash(hash) => self
                .headers
                .iter()
                .find(|header| header.hash == hash.block_hash)
                .map(|header| header.inner.number)
                .ok_or_else(|| {
                    RpcError::BlockNotFound(format!("mock: no block {}", hash.block_hash))
                }),
            BlockId::Number(BlockNumberOrTag::Number(number)) => Ok(number),
            BlockId::Number(_) => Ok(self.head),
        }
    }

    fn log_matches(filter: &Filter, log: &Log) -> bool {
        let Some(number) = log.block_number else { return false };
        if filter.get_from_block().is_some_and(|from| number < from) {
            return false;
        }
        if filter.get_to_block().is_some_and(|to| number > to) {
            return false;
        }
        if !filter.address.matches(&log.inner.address) {
            return false;
        }
        let topics = log.inner.data.topics();
        filter.topics.iter().enumerate().all(|(i, wanted)| {
            wanted.is_empty() || topics.get(i).is_some_and(|topic| wanted.matches(topic))
        })
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn role(&self) -> ChainRole {
        self.role
    }

    async fn block_number(&self) -> RpcResult<u64> {
        Ok(self.head)
    }

    async fn header_by_number(&self, number: u64) -> RpcResult<Header> {
        if let Some(header) = self.headers_by_number.get(&number) {
            return Ok(header.clone());
        }
        self.headers
            .iter()
            .find(|header| header.inner.number == number)
            .cloned()
            .ok_or_else(|| RpcError::HeaderNotFound(format!("mock: no header {number}")))
    }

    async fn header_by_hash(&self, hash: B256) -> RpcResult<Header> {
        self.headers
            .iter()
            .find(|header| header.hash == hash)
            .cloned()
            .ok_or_else(|| RpcError::HeaderNotFound(format!("mock: no header {hash}")))
    }

    async fn get_proof(
        &self,
        address: Address,
        _keys: Vec<B256>,
        block_hash: B256,
    ) -> RpcResult<EIP1186AccountProofResponse> {
        self.proofs
            .get(&(address, block_hash))
            .cloned()
            .ok_or_else(|| RpcError::ProofNotFound(format!("mock: no proof for {address}")))
    }

    async fn code_at(&self, address: Address, block_number: Option<u64>) -> RpcResult<Bytes> {
        Ok(match self.code.get(&address) {
            Some((deployed_at, code)) if block_number.is_none_or(|b| b >= *deployed_at) => {
                code.clone()
            }
            _ => Bytes::new(),
        })
    }

    async fn call_contract(&self, to: Address, data: Bytes, block: BlockId) -> RpcResult<Bytes> {
        self.call_blocks.lock().unwrap().push(block);
        let at = self.block_number_of(block)?;
        self.calls
            .get(&(to, data))
            .and_then(|history| history.iter().rev().find(|(from, _)| *from <= at))
            .map(|(_, ret)| ret.clone())
            .ok_or_else(|| RpcError::InvalidResponse(format!("mock: call to {to} reverted")))
    }

    async fn get_logs(&self, filter: &Filter) -> RpcResult<Vec<Log>> {
        self.get_logs_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.logs.iter().filter(|log| Self::log_matches(filter, log)).cloned().collect())
    }

    async fn creation_input(
        &self,
        address: Address,
        block_number: u64,
    ) -> RpcResult<Option<Bytes>> {
        Ok(self
            .creation_inputs
            .get(&address)
            .filter(|(created_in, _)| *created_in == block_number)
            .map(|(_, input)| input.clone()))
    }
}
