//! Proof input builder for cross-chain block hash provers.
//!
//! This crate provides the core functionality of the prover helper, including:
//! - RPC clients for the home and target chains
//! - Contract bindings for rollups, outboxes, the block hash buffer and prover pointers
//! - Storage slot derivation and proof/header encoding
//! - The two linking strategies (confirmed assertions and the block hash buffer)
//! - Contract provenance checks against compiled artifacts

#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![deny(unused_must_use)]
#![deny(rust_2018_idioms)]

pub mod codec;
pub mod config;
pub mod constants;
pub mod contracts;
pub mod error;
pub mod helper;
pub mod metrics;
pub mod provenance;
pub mod rpc;
pub mod scan;
pub mod slot;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::{
    AssertionLinkConfig, BufferLinkConfig, ConfigError, LogScanConfig, ProverHelperConfig,
    RetryConfig,
};
pub use constants::*;
pub use error::*;
pub use helper::{AssertionLinkHelper, BufferLinkHelper, LinkLocation, ProofFetcher, ProverHelper};
pub use provenance::{ContractArtifact, ContractProvenanceVerifier, PointerVerification};
pub use types::*;
