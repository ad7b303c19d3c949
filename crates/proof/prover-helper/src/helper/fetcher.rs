//! Role-checked access to both chains plus the shared payload steps.

use std::sync::Arc;

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_rpc_types_eth::Header;
use tracing::debug;

use crate::{
    ProverHelperError, ProverHelperResult,
    codec::{
        SerializedProof, encode_block_header, encode_verify_storage_slot_input,
        fetch_and_serialize_proof,
    },
    config::ensure_role,
    metrics::record_input_built,
    rpc::ChainClient,
    types::{BlockRef, BlockSelector, ChainRole, StorageSlotInput},
};

/// Holds the home and target clients and fetches headers and proofs from them.
#[derive(Clone)]
pub struct ProofFetcher {
    home: Arc<dyn ChainClient>,
    target: Arc<dyn ChainClient>,
}

impl std::fmt::Debug for ProofFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofFetcher").finish_non_exhaustive()
    }
}

impl ProofFetcher {
    /// Creates a fetcher, rejecting clients bound to the wrong chain.
    pub fn new(
        home: Arc<dyn ChainClient>,
        target: Arc<dyn ChainClient>,
    ) -> ProverHelperResult<Self> {
        ensure_role(home.as_ref(), ChainRole::Home)?;
        ensure_role(target.as_ref(), ChainRole::Target)?;
        Ok(Self { home, target })
    }

    /// The home chain client.
    pub fn home(&self) -> &dyn ChainClient {
        self.home.as_ref()
    }

    /// The target chain client.
    pub fn target(&self) -> &dyn ChainClient {
        self.target.as_ref()
    }

    /// The client for `role`.
    pub fn client(&self, role: ChainRole) -> &dyn ChainClient {
        match role {
            ChainRole::Home => self.home(),
            ChainRole::Target => self.target(),
        }
    }

    /// Fetches the header `block` refers to.
    pub async fn header(&self, block: BlockRef) -> ProverHelperResult<Header> {
        let client = self.client(block.role());
        let header = match block.id() {
            BlockSelector::Number(number) => client.header_by_number(number).await?,
            BlockSelector::Hash(hash) => client.header_by_hash(hash).await?,
        };
        Ok(header)
    }

    /// Fetches the header `block` refers to and RLP-encodes it.
    pub async fn encoded_header(&self, block: BlockRef) -> ProverHelperResult<Bytes> {
        let header = self.header(block).await?;
        match block.id() {
            BlockSelector::Hash(hash) => checked_header_encoding(&header, hash),
            BlockSelector::Number(number) if header.inner.number != number => {
                Err(ProverHelperError::MalformedProof(format!(
                    "requested header {number}, node returned {}",
                    header.inner.number
                )))
            }
            BlockSelector::Number(_) => encode_block_header(&header),
        }
    }

    /// Fetches the encoded header and the serialized proof of one slot at
    /// `block_hash` concurrently.
    pub async fn header_and_proof(
        &self,
        role: ChainRole,
        block_hash: B256,
        account: Address,
        storage_key: Option<B256>,
    ) -> ProverHelperResult<(Bytes, SerializedProof)> {
        let client = self.client(role);
        debug!(stage = "fetch_header", %role, %block_hash, "Fetching header and proof");
        let (header, proof) = tokio::try_join!(
            async { Ok::<_, ProverHelperError>(client.header_by_hash(block_hash).await?) },
            fetch_and_serialize_proof(client, block_hash, account, storage_key),
        )?;
        debug!(stage = "encode", %role, %block_hash, %account, "Encoding payload");
        Ok((checked_header_encoding(&header, block_hash)?, proof))
    }

    /// Builds the `verifyStorageSlot` input for `slot` of `account` in the
    /// target block `target_block_hash`.
    pub async fn build_verify_storage_slot_input(
        &self,
        target_block_hash: B256,
        account: Address,
        slot: U256,
    ) -> ProverHelperResult<StorageSlotInput> {
        let key = B256::from(slot.to_be_bytes::<32>());
        let (header, proof) =
            self.header_and_proof(ChainRole::Target, target_block_hash, account, Some(key)).await?;
        let slot_value = proof.slot_value;
        let input = encode_verify_storage_slot_input(header, account, slot, proof);
        record_input_built("verify_storage_slot");
        Ok(StorageSlotInput { input, slot_value })
    }
}

fn checked_header_encoding(header: &Header, requested: B256) -> ProverHelperResult<Bytes> {
    if header.hash != requested {
        return Err(ProverHelperError::MalformedProof(format!(
            "requested header {requested}, node returned {}",
            header.hash
        )));
    }
    encode_block_header(header)
}
