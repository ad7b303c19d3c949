//! Proof input builders for the two linking strategies.
//!
//! Every payload goes through the same stages: resolve the provable target,
//! derive the linking slot, fetch the home header, fetch the proof, encode.
//! Strategies only differ in how the first two stages are answered, so the
//! pipeline itself lives in the provided methods of [`ProverHelper`].

mod assertion;
mod buffer;
mod fetcher;

pub use assertion::AssertionLinkHelper;
pub use buffer::BufferLinkHelper;
pub use fetcher::ProofFetcher;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    ProverHelperError, ProverHelperResult,
    codec::{encode_get_target_block_hash_input, encode_verify_target_block_hash_input},
    metrics::record_input_built,
    types::{
        BlockRef, ChainRole, ObservationPoint, ResolvedTarget, StorageSlotInput,
        TargetBlockHashInput,
    },
};

/// Where on the home chain the target block hash is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkLocation {
    /// Contract holding the link mapping.
    pub account: Address,
    /// Derived storage key of the entry.
    pub storage_key: B256,
}

/// Builds ABI-encoded inputs for an on-chain block hash prover.
#[async_trait]
pub trait ProverHelper: Send + Sync {
    /// Shared chain access.
    fn fetcher(&self) -> &ProofFetcher;

    /// Finds the newest target block provable as of the home block `at`.
    async fn resolve_at(&self, at: ObservationPoint) -> ProverHelperResult<ResolvedTarget>;

    /// Derives the storage location linking `target` as of the home block `at`.
    async fn link_location(
        &self,
        target: &ResolvedTarget,
        at: ObservationPoint,
    ) -> ProverHelperResult<LinkLocation>;

    /// Finds the newest target block provable as of home block `observation_block`.
    async fn resolve_provable_target(
        &self,
        observation_block: u64,
    ) -> ProverHelperResult<ResolvedTarget> {
        self.resolve_at(ObservationPoint::at_number(observation_block)).await
    }

    /// Builds the `getTargetBlockHash` input against the current home head.
    async fn build_get_target_block_hash_input(&self) -> ProverHelperResult<TargetBlockHashInput> {
        let head = self.fetcher().home().block_number().await?;
        debug!(stage = "resolve_target", observation_block = head, "Resolving provable target");
        let target = self.resolve_at(ObservationPoint::at_number(head)).await?;

        let input = encode_get_target_block_hash_input(target.link_datum);
        record_input_built("get_target_block_hash");
        info!(
            observation_block = head,
            target_block_hash = %target.target_block_hash,
            "Built getTargetBlockHash input"
        );
        Ok(TargetBlockHashInput { input, target_block_hash: target.target_block_hash })
    }

    /// Builds the `verifyTargetBlockHash` input proving the link stored in home
    /// block `home_block_hash`.
    async fn build_verify_target_block_hash_input(
        &self,
        home_block_hash: B256,
    ) -> ProverHelperResult<TargetBlockHashInput> {
        let observation_block =
            self.fetcher().header(BlockRef::home_hash(home_block_hash)).await?.inner.number;
        let at = ObservationPoint::at_hash(observation_block, home_block_hash);
        debug!(
            stage = "resolve_target",
            observation_block,
            %home_block_hash,
            "Resolving provable target"
        );
        let target = self.resolve_at(at).await?;

        debug!(stage = "derive_slot", observation_block, "Deriving link slot");
        let link = self.link_location(&target, at).await?;

        let (header, proof) = self
            .fetcher()
            .header_and_proof(
                ChainRole::Home,
                home_block_hash,
                link.account,
                Some(link.storage_key),
            )
            .await?;
        if proof.slot_value != target.target_block_hash {
            return Err(ProverHelperError::MalformedProof(format!(
                "link slot {} of {} holds {}, expected target block hash {}",
                link.storage_key, link.account, proof.slot_value, target.target_block_hash
            )));
        }

        let input = encode_verify_target_block_hash_input(header, target.link_datum, proof);
        record_input_built("verify_target_block_hash");
        info!(
            observation_block,
            %home_block_hash,
            target_block_hash = %target.target_block_hash,
            "Built verifyTargetBlockHash input"
        );
        Ok(TargetBlockHashInput { input, target_block_hash: target.target_block_hash })
    }

    /// Builds the `verifyStorageSlot` input for `slot` of `account` in target
    /// block `target_block_hash`.
    async fn build_verify_storage_slot_input(
        &self,
        target_block_hash: B256,
        account: Address,
        slot: U256,
    ) -> ProverHelperResult<StorageSlotInput> {
        self.fetcher().build_verify_storage_slot_input(target_block_hash, account, slot).await
    }
}
