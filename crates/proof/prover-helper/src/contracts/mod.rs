//! Contract bindings and typed historical reads.
//!
//! Calls are ABI-encoded locally and executed through [`ChainClient::call_contract`]
//! at an explicit block, so every read can be pinned to an observation point.

mod buffer;
mod pointer;
mod rollup;

pub use buffer::{BufferContract, IBuffer};
pub use pointer::{IBlockHashProver, IBlockHashProverPointer, PointerContract, prover_version};
pub use rollup::{
    IOutbox, IParentToChildProver, IRollupCore, OutboxContract, ParentToChildProverContract,
    RollupContract,
};

use alloy_eips::BlockId;
use alloy_primitives::Address;
use alloy_sol_types::SolCall;

use crate::{ProverHelperError, ProverHelperResult, rpc::ChainClient};

/// Executes `call` against `to` as of `block` and decodes the return.
pub async fn read_contract<C: SolCall>(
    client: &dyn ChainClient,
    to: Address,
    call: C,
    block: BlockId,
) -> ProverHelperResult<C::Return> {
    let data = client.call_contract(to, call.abi_encode().into(), block).await?;
    C::abi_decode_returns(&data).map_err(|e| {
        ProverHelperError::Contract(format!(
            "{} on {to} returned undecodable data: {e}",
            C::SIGNATURE
        ))
    })
}
