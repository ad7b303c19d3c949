//! Block hash prover pointer bindings.

use alloy_eips::BlockId;
use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;

use super::read_contract;
use crate::{ProverHelperResult, rpc::ChainClient};

sol! {
    /// Indirection contract pointing at the active block hash prover.
    interface IBlockHashProverPointer {
        /// The currently active prover.
        function implementationAddress() external view returns (address);

        /// The pointer's owner.
        function owner() external view returns (address);

        /// Emitted whenever the pointer is moved to a new prover.
        event ImplementationAddressSet(
            address indexed previousImplementation,
            address indexed newImplementation
        );
    }

    /// Versioned block hash prover.
    interface IBlockHashProver {
        /// The prover's version; must increase with every pointer update.
        function version() external view returns (uint256);
    }
}

/// Reads from a prover pointer.
#[derive(Debug, Clone, Copy)]
pub struct PointerContract {
    address: Address,
}

impl PointerContract {
    /// Binds the pointer at `address`.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// The pointer address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The current implementation as of `block`.
    pub async fn implementation(
        &self,
        client: &dyn ChainClient,
        block: BlockId,
    ) -> ProverHelperResult<Address> {
        let call = IBlockHashProverPointer::implementationAddressCall {};
        read_contract(client, self.address, call, block).await
    }

    /// The owner as of `block`.
    pub async fn owner(
        &self,
        client: &dyn ChainClient,
        block: BlockId,
    ) -> ProverHelperResult<Address> {
        read_contract(client, self.address, IBlockHashProverPointer::ownerCall {}, block).await
    }
}

/// Reads `version()` from the prover at `prover`.
pub async fn prover_version(
    client: &dyn ChainClient,
    prover: Address,
    block: BlockId,
) -> ProverHelperResult<U256> {
    read_contract(client, prover, IBlockHashProver::versionCall {}, block).await
}
