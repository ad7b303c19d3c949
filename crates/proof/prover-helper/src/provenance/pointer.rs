//! Prover pointer history verification.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use alloy_rpc_types_eth::{BlockId, Filter};
use alloy_sol_types::SolEvent;
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info};

use super::{ContractArtifact, verify_deployed_bytecode};
use crate::{
    ProverHelperError, ProverHelperResult,
    config::LogScanConfig,
    contracts::{
        IBlockHashProverPointer::ImplementationAddressSet, PointerContract, prover_version,
    },
    rpc::ChainClient,
    scan::collect_logs,
};

/// One implementation a pointer has pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProverVersion {
    /// The prover contract.
    pub prover: Address,
    /// Its `version()`.
    pub version: U256,
    /// Block the pointer was moved to it.
    pub set_in: u64,
}

/// Outcome of a successful pointer verification.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerVerification {
    /// The pointer contract.
    pub pointer: Address,
    /// The pointer's owner.
    pub owner: Address,
    /// The prover the pointer currently points at.
    pub current_prover: Address,
    /// Constructor arguments of the current prover.
    pub prover_constructor_args: Vec<DynSolValue>,
    /// Every implementation the pointer has announced, oldest first.
    pub history: Vec<ProverVersion>,
}

/// Verifies a prover pointer and the prover it currently points at.
///
/// The pointer's own deployment is checked against `pointer_artifact`, every
/// implementation it has announced must have a strictly greater version than
/// the one before, the last announced implementation must be the current one,
/// and the current prover's deployment is checked against `prover_artifact`.
pub async fn verify_pointer_chain(
    client: &dyn ChainClient,
    pointer: Address,
    pointer_artifact: &ContractArtifact,
    prover_artifact: &ContractArtifact,
    log_scan: &LogScanConfig,
) -> ProverHelperResult<PointerVerification> {
    let head = client.block_number().await?;
    let deployment = verify_deployed_bytecode(client, pointer, pointer_artifact, head).await?;

    let filter =
        Filter::new().address(pointer).event_signature(ImplementationAddressSet::SIGNATURE_HASH);
    let logs = collect_logs(client, &filter, deployment.creation_block, head, log_scan).await?;
    let announced = logs
        .iter()
        .map(|log| {
            let set_in = log.block_number.unwrap_or(head);
            log.log_decode::<ImplementationAddressSet>()
                .map(|decoded| (decoded.inner.data.newImplementation, set_in))
                .map_err(|e| {
                    ProverHelperError::Contract(format!(
                        "undecodable ImplementationAddressSet log: {e}"
                    ))
                })
        })
        .collect::<ProverHelperResult<Vec<_>>>()?;
    debug!(%pointer, implementations = announced.len(), "Collected pointer history");

    let history = try_join_all(announced.into_iter().map(|(prover, set_in)| async move {
        let version = prover_version(client, prover, BlockId::number(set_in)).await?;
        Ok::<_, ProverHelperError>(ProverVersion { prover, version, set_in })
    }))
    .await?;
    ensure_ascending(&history)?;

    let contract = PointerContract::new(pointer);
    let current_prover = contract.implementation(client, BlockId::number(head)).await?;
    let last = history.last().map(|entry| entry.prover);
    if last != Some(current_prover) {
        return Err(ProverHelperError::PointerHistoryMismatch {
            pointer,
            current: current_prover,
            last,
        });
    }

    let prover = verify_deployed_bytecode(client, current_prover, prover_artifact, head).await?;
    let owner = contract.owner(client, BlockId::number(head)).await?;

    info!(%pointer, %owner, %current_prover, versions = history.len(), "Verified prover pointer");
    Ok(PointerVerification {
        pointer,
        owner,
        current_prover,
        prover_constructor_args: prover.constructor_args,
        history,
    })
}

fn ensure_ascending(history: &[ProverVersion]) -> ProverHelperResult<()> {
    for pair in history.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        if next.version <= previous.version {
            return Err(ProverHelperError::VersionNotAscending {
                previous: previous.prover,
                previous_version: previous.version,
                next: next.prover,
                next_version: next.version,
            });
        }
    }
    Ok(())
}
