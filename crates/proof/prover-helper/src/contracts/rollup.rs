//! Parent-to-child prover, outbox and rollup bindings.

use alloy_eips::BlockId;
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::sol;

use super::read_contract;
use crate::{ProverHelperResult, rpc::ChainClient};

sol! {
    /// Prover contract verifying child-chain block hashes from the parent chain.
    interface IParentToChildProver {
        /// The outbox whose `roots` mapping links send roots to child block hashes.
        function outbox() external view returns (address);

        /// Storage slot of the outbox's `roots` mapping.
        function rootsSlot() external view returns (uint256);
    }

    /// Arbitrum outbox.
    interface IOutbox {
        /// The rollup this outbox belongs to.
        function rollup() external view returns (address);
    }

    /// Arbitrum rollup core.
    interface IRollupCore {
        /// Hash of the latest confirmed assertion.
        function latestConfirmed() external view returns (bytes32);

        /// Emitted once when an assertion is confirmed.
        event AssertionConfirmed(
            bytes32 indexed assertionHash,
            bytes32 blockHash,
            bytes32 sendRoot
        );
    }
}

/// Reads from a deployed parent-to-child prover.
#[derive(Debug, Clone, Copy)]
pub struct ParentToChildProverContract {
    address: Address,
}

impl ParentToChildProverContract {
    /// Binds the prover at `address`.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// The outbox address as of `block`.
    pub async fn outbox(
        &self,
        client: &dyn ChainClient,
        block: BlockId,
    ) -> ProverHelperResult<Address> {
        read_contract(client, self.address, IParentToChildProver::outboxCall {}, block).await
    }

    /// The `roots` mapping slot as of `block`.
    pub async fn roots_slot(
        &self,
        client: &dyn ChainClient,
        block: BlockId,
    ) -> ProverHelperResult<U256> {
        read_contract(client, self.address, IParentToChildProver::rootsSlotCall {}, block).await
    }
}

/// Reads from an outbox.
#[derive(Debug, Clone, Copy)]
pub struct OutboxContract {
    address: Address,
}

impl OutboxContract {
    /// Binds the outbox at `address`.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// The outbox address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The rollup address as of `block`.
    pub async fn rollup(
        &self,
        client: &dyn ChainClient,
        block: BlockId,
    ) -> ProverHelperResult<Address> {
        read_contract(client, self.address, IOutbox::rollupCall {}, block).await
    }
}

/// Reads from a rollup.
#[derive(Debug, Clone, Copy)]
pub struct RollupContract {
    address: Address,
}

impl RollupContract {
    /// Binds the rollup at `address`.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// The rollup address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The latest confirmed assertion hash as of `block`.
    pub async fn latest_confirmed(
        &self,
        client: &dyn ChainClient,
        block: BlockId,
    ) -> ProverHelperResult<B256> {
        read_contract(client, self.address, IRollupCore::latestConfirmedCall {}, block).await
    }
}
