//! Core value types shared by the proof pipeline.

use std::fmt;

use alloy_eips::BlockId;
use alloy_primitives::{B256, Bytes};
use serde::Serialize;

/// Which chain a query is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainRole {
    /// The chain the verifier runs on.
    Home,
    /// The chain whose state is being proven.
    Target,
}

impl fmt::Display for ChainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Identifies a block either by number or by hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockSelector {
    /// Block number.
    Number(u64),
    /// Block hash.
    Hash(B256),
}

/// A block on a specific chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRef {
    role: ChainRole,
    id: BlockSelector,
}

impl BlockRef {
    /// A block on `role` selected by `id`.
    pub const fn new(role: ChainRole, id: BlockSelector) -> Self {
        Self { role, id }
    }

    /// A home-chain block by hash.
    pub const fn home_hash(hash: B256) -> Self {
        Self::new(ChainRole::Home, BlockSelector::Hash(hash))
    }

    /// A target-chain block by hash.
    pub const fn target_hash(hash: B256) -> Self {
        Self::new(ChainRole::Target, BlockSelector::Hash(hash))
    }

    /// The chain this block lives on.
    pub const fn role(&self) -> ChainRole {
        self.role
    }

    /// The block selector.
    pub const fn id(&self) -> BlockSelector {
        self.id
    }
}

/// The home block a target is resolved against.
///
/// `number` bounds event scans. `block` pins contract reads, so a point taken
/// from a block hash keeps every read on that block's fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationPoint {
    /// Home block number.
    pub number: u64,
    /// Block identifier contract reads are issued against.
    pub block: BlockId,
}

impl ObservationPoint {
    /// A point identified by number only.
    pub fn at_number(number: u64) -> Self {
        Self { number, block: BlockId::number(number) }
    }

    /// A point identified by hash, with `number` taken from its header.
    pub fn at_hash(number: u64, hash: B256) -> Self {
        Self { number, block: BlockId::hash(hash) }
    }
}

impl From<u64> for ObservationPoint {
    fn from(number: u64) -> Self {
        Self::at_number(number)
    }
}

/// The strategy-specific value that links a home block to a target block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkDatum {
    /// Send root of a confirmed rollup assertion (parent-to-child).
    SendRoot(B256),
    /// Parent-chain block number recorded in the block hash buffer (child-to-parent).
    TargetBlockNumber(u64),
}

/// The newest target block provable from an observation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Hash of the provable target block.
    pub target_block_hash: B256,
    /// The datum the on-chain prover needs to look the hash up.
    pub link_datum: LinkDatum,
}

/// Output of the `getTargetBlockHash`/`verifyTargetBlockHash` input builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetBlockHashInput {
    /// ABI-encoded input for the on-chain prover.
    pub input: Bytes,
    /// Target block hash the prover will return for this input.
    pub target_block_hash: B256,
}

/// Output of the `verifyStorageSlot` input builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSlotInput {
    /// ABI-encoded input for the on-chain prover.
    pub input: Bytes,
    /// Slot value as reported by the proof, for caller-side checks.
    pub slot_value: B256,
}

/// A confirmed rollup assertion, as read from its confirmation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssertionRecord {
    /// The assertion hash.
    pub assertion_hash: B256,
    /// Send root carried by the assertion.
    pub send_root: B256,
    /// Child-chain block hash carried by the assertion.
    pub block_hash: B256,
    /// Home-chain block the confirmation was emitted in.
    pub confirmed_in: u64,
}

/// An entry of the parent-chain block hash buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferEntry {
    /// Parent-chain block number.
    pub block_number: u64,
    /// Parent-chain block hash.
    pub block_hash: B256,
}

impl From<BufferEntry> for ResolvedTarget {
    fn from(entry: BufferEntry) -> Self {
        Self {
            target_block_hash: entry.block_hash,
            link_datum: LinkDatum::TargetBlockNumber(entry.block_number),
        }
    }
}

impl From<AssertionRecord> for ResolvedTarget {
    fn from(record: AssertionRecord) -> Self {
        Self {
            target_block_hash: record.block_hash,
            link_datum: LinkDatum::SendRoot(record.send_root),
        }
    }
}
