//! Deployment bytecode verification against compiled artifacts.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Address;
use tracing::{debug, info};

use super::{ContractArtifact, find_creation_block};
use crate::{ProverHelperError, ProverHelperResult, rpc::ChainClient};

/// A deployment whose bytecode matched its artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedDeployment {
    /// The contract address.
    pub address: Address,
    /// Block the contract was created in.
    pub creation_block: u64,
    /// Constructor arguments decoded from the creation transaction.
    pub constructor_args: Vec<DynSolValue>,
}

/// Verifies that `address` was deployed from `artifact` and returns its
/// constructor arguments.
///
/// The creation transaction's input must be the artifact's creation bytecode
/// followed by ABI-encoded constructor arguments. When the artifact carries
/// runtime bytecode and the locations of its immutables, the code at
/// `at_block` must equal it with immutables masked. Artifacts that do not
/// record immutable locations are checked through the creation input alone.
/// Only top-level deployments are supported; contracts created by a factory
/// yield [`ProverHelperError::CreationTxNotFound`].
pub async fn verify_deployed_bytecode(
    client: &dyn ChainClient,
    address: Address,
    artifact: &ContractArtifact,
    at_block: u64,
) -> ProverHelperResult<VerifiedDeployment> {
    let creation_block = find_creation_block(client, address, at_block).await?;
    let input = client
        .creation_input(address, creation_block)
        .await?
        .ok_or(ProverHelperError::CreationTxNotFound { address, block_number: creation_block })?;

    let args = input.strip_prefix(&artifact.bytecode[..]).ok_or_else(|| {
        ProverHelperError::BytecodeMismatch {
            address,
            reason: format!(
                "creation input ({} bytes) does not start with the artifact bytecode ({} bytes)",
                input.len(),
                artifact.bytecode.len()
            ),
        }
    })?;
    let constructor_args = artifact
        .decode_constructor_args(args)
        .map_err(|e| ProverHelperError::BytecodeMismatch { address, reason: e.to_string() })?;
    debug!(
        %address,
        creation_block,
        args = constructor_args.len(),
        "Creation input matches artifact"
    );

    if artifact.deployed_bytecode.is_some() {
        let code = client.code_at(address, Some(at_block)).await?;
        match artifact.runtime_code_matches(&code) {
            Some(true) => {}
            Some(false) => {
                return Err(ProverHelperError::BytecodeMismatch {
                    address,
                    reason: format!("runtime code at block {at_block} differs from the artifact"),
                });
            }
            None => {
                debug!(%address, "Artifact has no immutable map, skipping runtime code check");
            }
        }
    }

    info!(%address, creation_block, "Verified deployment");
    Ok(VerifiedDeployment { address, creation_block, constructor_args })
}
