//! Error types for the prover helper.

use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

use crate::{config::ConfigError, provenance::ArtifactError, rpc::RpcError};

/// Main error type for proof input construction and contract verification.
#[derive(Debug, Error)]
pub enum ProverHelperError {
    /// No confirmed checkpoint or buffer entry exists as of the observation block.
    #[error("no provable target block as of home block {observation_block}: {reason}")]
    NoProvableTargetFound {
        /// Home block the resolution was performed at.
        observation_block: u64,
        /// Why nothing qualified.
        reason: String,
    },

    /// The latest confirmed assertion has no confirmation event in the scanned range.
    #[error("no AssertionConfirmed event for {assertion_hash} in blocks {from_block}..={to_block}")]
    NoAssertionConfirmedEvent {
        /// The assertion hash scanned for.
        assertion_hash: B256,
        /// First scanned block.
        from_block: u64,
        /// Last scanned block.
        to_block: u64,
    },

    /// No code was found at the address anywhere in the searched range.
    #[error("contract {address} not found at or before block {upper_bound}")]
    ContractNotFound {
        /// The contract address.
        address: Address,
        /// Highest block searched.
        upper_bound: u64,
    },

    /// A pointer's implementation history does not have strictly increasing versions.
    #[error(
        "prover {next} has version {next_version}, not above {previous}'s version \
         {previous_version}"
    )]
    VersionNotAscending {
        /// The earlier prover.
        previous: Address,
        /// Version of the earlier prover.
        previous_version: U256,
        /// The later prover.
        next: Address,
        /// Version of the later prover.
        next_version: U256,
    },

    /// The chain client returned an empty or inconsistent proof or header.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// Deployed or creation bytecode does not match the compiled artifact.
    #[error("bytecode mismatch for {address}: {reason}")]
    BytecodeMismatch {
        /// The contract address.
        address: Address,
        /// What did not match.
        reason: String,
    },

    /// The contract was not created by a top-level transaction in its creation block.
    #[error("no creation transaction for {address} in block {block_number}")]
    CreationTxNotFound {
        /// The contract address.
        address: Address,
        /// The contract's creation block.
        block_number: u64,
    },

    /// The pointer's current implementation is not the last one it announced.
    #[error(
        "pointer {pointer} points at {current}, but its last announced implementation is \
         {last:?}"
    )]
    PointerHistoryMismatch {
        /// The pointer contract.
        pointer: Address,
        /// `implementationAddress()` at head.
        current: Address,
        /// Last implementation announced by an event, if any.
        last: Option<Address>,
    },

    /// A compiled artifact could not be read or applied.
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Contract call or return decoding failed.
    #[error("Contract error: {0}")]
    Contract(String),

    /// RPC error.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ProverHelperError {
    /// Returns true if retrying later (or with a wider scan) may succeed.
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::NoProvableTargetFound { .. } | Self::NoAssertionConfirmedEvent { .. } => true,
            Self::Rpc(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// Result type alias for prover helper operations.
pub type ProverHelperResult<T> = Result<T, ProverHelperError>;
