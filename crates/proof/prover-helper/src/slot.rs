//! Storage slot derivation for Solidity mappings.
//!
//! A value of `mapping(K => V)` declared at slot `p` lives at
//! `keccak256(abi.encode(key) ++ abi.encode(p))`.

use alloy_primitives::{B256, U256, keccak256};

/// A mapping key, carrying the width it is ABI-encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKey {
    /// A `bytes32` key.
    Bytes32(B256),
    /// A `uint256` key.
    Uint(U256),
}

impl MappingKey {
    /// The 32-byte ABI encoding of the key.
    pub fn abi_word(&self) -> [u8; 32] {
        match self {
            Self::Bytes32(hash) => hash.0,
            Self::Uint(value) => value.to_be_bytes::<32>(),
        }
    }
}

impl From<B256> for MappingKey {
    fn from(hash: B256) -> Self {
        Self::Bytes32(hash)
    }
}

impl From<U256> for MappingKey {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<u64> for MappingKey {
    fn from(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }
}

/// Derives the storage key of `key` in a mapping declared at `base_slot`.
pub fn derive_mapping_slot(base_slot: U256, key: impl Into<MappingKey>) -> B256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(&key.into().abi_word());
    preimage[32..].copy_from_slice(&base_slot.to_be_bytes::<32>());
    keccak256(preimage)
}
