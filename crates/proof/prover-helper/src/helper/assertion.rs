//! Parent-to-child linking through confirmed rollup assertions.

use std::sync::Arc;

use alloy_rpc_types_eth::Filter;
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{LinkLocation, ProofFetcher, ProverHelper};
use crate::{
    ProverHelperError, ProverHelperResult,
    config::AssertionLinkConfig,
    contracts::{
        IRollupCore::AssertionConfirmed, OutboxContract, ParentToChildProverContract,
        RollupContract,
    },
    rpc::ChainClient,
    scan::find_earliest_log,
    slot::derive_mapping_slot,
    types::{AssertionRecord, LinkDatum, ObservationPoint, ResolvedTarget},
};

/// Proves child-chain block hashes from the parent chain.
///
/// The provable target is the block carried by the rollup's latest confirmed
/// assertion; the outbox stores it under the assertion's send root.
#[derive(Debug, Clone)]
pub struct AssertionLinkHelper {
    fetcher: ProofFetcher,
    config: AssertionLinkConfig,
}

impl AssertionLinkHelper {
    /// Creates a helper for the prover in `config`.
    pub fn new(
        home: Arc<dyn ChainClient>,
        target: Arc<dyn ChainClient>,
        config: AssertionLinkConfig,
    ) -> ProverHelperResult<Self> {
        config.log_scan.validate()?;
        Ok(Self { fetcher: ProofFetcher::new(home, target)?, config })
    }

    /// The helper's configuration.
    pub const fn config(&self) -> &AssertionLinkConfig {
        &self.config
    }

    fn prover(&self) -> ParentToChildProverContract {
        ParentToChildProverContract::new(self.config.prover)
    }

    /// Reads the latest confirmed assertion as of the home block `at` and
    /// locates its confirmation event.
    pub async fn latest_confirmed_assertion(
        &self,
        at: ObservationPoint,
    ) -> ProverHelperResult<AssertionRecord> {
        let home = self.fetcher.home();
        let outbox = OutboxContract::new(self.prover().outbox(home, at.block).await?);
        let rollup = RollupContract::new(outbox.rollup(home, at.block).await?);

        let assertion_hash = rollup.latest_confirmed(home, at.block).await?;
        if assertion_hash.is_zero() {
            return Err(ProverHelperError::NoProvableTargetFound {
                observation_block: at.number,
                reason: format!("rollup {} has no confirmed assertion", rollup.address()),
            });
        }

        let (from_block, to_block) = (self.config.log_scan.start_block, at.number);
        debug!(%assertion_hash, from_block, to_block, "Scanning for confirmation");
        let filter = Filter::new()
            .address(rollup.address())
            .event_signature(AssertionConfirmed::SIGNATURE_HASH)
            .topic1(assertion_hash);
        let log = find_earliest_log(home, &filter, from_block, to_block, &self.config.log_scan)
            .await?
            .ok_or_else(|| {
                warn!(%assertion_hash, from_block, to_block, "Confirmation event not found");
                ProverHelperError::NoAssertionConfirmedEvent {
                    assertion_hash,
                    from_block,
                    to_block,
                }
            })?;

        let confirmed_in = log.block_number.unwrap_or(to_block);
        let event = log
            .log_decode::<AssertionConfirmed>()
            .map_err(|e| {
                ProverHelperError::Contract(format!("undecodable AssertionConfirmed log: {e}"))
            })?
            .inner
            .data;

        Ok(AssertionRecord {
            assertion_hash,
            send_root: event.sendRoot,
            block_hash: event.blockHash,
            confirmed_in,
        })
    }
}

#[async_trait]
impl ProverHelper for AssertionLinkHelper {
    fn fetcher(&self) -> &ProofFetcher {
        &self.fetcher
    }

    async fn resolve_at(&self, at: ObservationPoint) -> ProverHelperResult<ResolvedTarget> {
        let record = self.latest_confirmed_assertion(at).await?;
        debug!(
            assertion_hash = %record.assertion_hash,
            send_root = %record.send_root,
            block_hash = %record.block_hash,
            confirmed_in = record.confirmed_in,
            "Resolved confirmed assertion"
        );
        Ok(record.into())
    }

    async fn link_location(
        &self,
        target: &ResolvedTarget,
        at: ObservationPoint,
    ) -> ProverHelperResult<LinkLocation> {
        let LinkDatum::SendRoot(send_root) = target.link_datum else {
            return Err(ProverHelperError::Contract(format!(
                "assertion link cannot prove datum {:?}",
                target.link_datum
            )));
        };
        let home = self.fetcher.home();
        let prover = self.prover();
        let (outbox, roots_slot) =
            tokio::try_join!(prover.outbox(home, at.block), prover.roots_slot(home, at.block))?;
        let storage_key = derive_mapping_slot(roots_slot, send_root);
        Ok(LinkLocation { account: outbox, storage_key })
    }
}
