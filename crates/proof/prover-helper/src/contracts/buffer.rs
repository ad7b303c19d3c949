//! Parent-chain block hash buffer bindings.

use alloy_eips::BlockId;
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::sol;

use super::read_contract;
use crate::{ProverHelperError, ProverHelperResult, rpc::ChainClient};

sol! {
    /// Rolling buffer of parent-chain block hashes kept on the child chain.
    interface IBuffer {
        /// The newest parent-chain block number with a recorded hash.
        function newestBlockNumber() external view returns (uint256);

        /// The recorded hash of a parent-chain block, zero if absent.
        function parentChainBlockHash(uint256 parentChainBlockNumber)
            external
            view
            returns (bytes32);
    }
}

/// Historical reads from the block hash buffer.
#[derive(Debug, Clone, Copy)]
pub struct BufferContract {
    address: Address,
}

impl BufferContract {
    /// Binds the buffer at `address`.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// The buffer's newest recorded block number as of home block `at`.
    pub async fn newest_block_number(
        &self,
        client: &dyn ChainClient,
        at: BlockId,
    ) -> ProverHelperResult<u64> {
        let number =
            read_contract(client, self.address, IBuffer::newestBlockNumberCall {}, at).await?;
        number
            .try_into()
            .map_err(|_| ProverHelperError::Contract("newestBlockNumber overflows u64".to_string()))
    }

    /// The hash recorded for `block_number` as of home block `at`.
    pub async fn block_hash(
        &self,
        client: &dyn ChainClient,
        block_number: u64,
        at: BlockId,
    ) -> ProverHelperResult<B256> {
        let call =
            IBuffer::parentChainBlockHashCall { parentChainBlockNumber: U256::from(block_number) };
        read_contract(client, self.address, call, at).await
    }
}
