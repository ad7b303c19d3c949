//! Compiled contract artifacts (Hardhat and Foundry JSON).

use std::collections::BTreeMap;

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Bytes, hex};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading an artifact or decoding against it.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artifact is not valid JSON or misses required fields.
    #[error("invalid artifact JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A bytecode field is not plain hex (for example unlinked libraries).
    #[error("invalid {field}: {reason}")]
    InvalidBytecode {
        /// The offending field.
        field: &'static str,
        /// Decoder message.
        reason: String,
    },
    /// The artifact has no creation bytecode (interfaces, abstract contracts).
    #[error("artifact has empty creation bytecode")]
    EmptyBytecode,
    /// Constructor arguments do not decode against the constructor ABI.
    #[error("constructor arguments do not decode: {0}")]
    ConstructorArgs(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object {
        object: String,
        #[serde(default, rename = "immutableReferences")]
        immutable_references: Option<BTreeMap<String, Vec<RawImmutableRef>>>,
    },
}

#[derive(Deserialize)]
struct RawImmutableRef {
    start: usize,
    length: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    abi: JsonAbi,
    bytecode: RawBytecode,
    #[serde(default)]
    deployed_bytecode: Option<RawBytecode>,
}

/// A compiled contract: ABI, creation bytecode and optionally runtime bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    /// Contract ABI.
    pub abi: JsonAbi,
    /// Creation bytecode, without constructor arguments.
    pub bytecode: Bytes,
    /// Runtime bytecode, when the artifact carries it.
    pub deployed_bytecode: Option<Bytes>,
    /// `(start, length)` byte ranges of immutables within the runtime bytecode.
    ///
    /// `None` when the artifact does not record where immutables sit, as in
    /// Hardhat's plain-hex form. That is not the same as having none.
    pub immutable_ranges: Option<Vec<(usize, usize)>>,
}

type ImmutableRanges = Option<Vec<(usize, usize)>>;

fn decode_hex(field: &'static str, value: &str) -> Result<Bytes, ArtifactError> {
    hex::decode(value)
        .map(Bytes::from)
        .map_err(|e| ArtifactError::InvalidBytecode { field, reason: e.to_string() })
}

impl RawBytecode {
    fn decode(self, field: &'static str) -> Result<(Bytes, ImmutableRanges), ArtifactError> {
        match self {
            Self::Hex(value) => Ok((decode_hex(field, &value)?, None)),
            Self::Object { object, immutable_references } => {
                let ranges = immutable_references.map(|refs| {
                    let mut ranges: Vec<_> =
                        refs.into_values().flatten().map(|r| (r.start, r.length)).collect();
                    ranges.sort_unstable();
                    ranges
                });
                Ok((decode_hex(field, &object)?, ranges))
            }
        }
    }
}

impl ContractArtifact {
    /// Parses a Hardhat (`"bytecode": "0x…"`) or Foundry
    /// (`"bytecode": { "object": "0x…" }`) artifact.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let raw: RawArtifact = serde_json::from_str(json)?;
        let (bytecode, _) = raw.bytecode.decode("bytecode")?;
        if bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode);
        }

        let (deployed_bytecode, immutable_ranges) = match raw.deployed_bytecode {
            Some(deployed) => {
                let (code, ranges) = deployed.decode("deployedBytecode")?;
                if code.is_empty() { (None, None) } else { (Some(code), ranges) }
            }
            None => (None, None),
        };

        Ok(Self { abi: raw.abi, bytecode, deployed_bytecode, immutable_ranges })
    }

    /// Decodes ABI-encoded constructor arguments.
    ///
    /// Contracts without a constructor accept only empty arguments.
    pub fn decode_constructor_args(&self, args: &[u8]) -> Result<Vec<DynSolValue>, ArtifactError> {
        match self.abi.constructor() {
            Some(constructor) => constructor
                .abi_decode_input(args)
                .map_err(|e| ArtifactError::ConstructorArgs(e.to_string())),
            None if args.is_empty() => Ok(Vec::new()),
            None => Err(ArtifactError::ConstructorArgs(format!(
                "contract has no constructor but {} argument bytes follow the bytecode",
                args.len()
            ))),
        }
    }

    /// Whether `code` equals the runtime bytecode with immutables masked.
    ///
    /// `None` when the comparison cannot be made: the artifact has no runtime
    /// bytecode, or it does not say where the immutables are.
    pub fn runtime_code_matches(&self, code: &[u8]) -> Option<bool> {
        let expected = self.deployed_bytecode.as_ref()?;
        let ranges = self.immutable_ranges.as_ref()?;
        if expected.len() != code.len() {
            return Some(false);
        }
        let mut masked = code.to_vec();
        for &(start, length) in ranges {
            let end = start.saturating_add(length).min(masked.len());
            if start < end {
                masked[start..end].copy_from_slice(&expected[start..end]);
            }
        }
        Some(masked[..] == expected[..])
    }
}
