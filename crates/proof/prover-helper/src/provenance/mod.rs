//! Contract provenance: creation blocks, deployment bytecode and prover pointers.

mod artifact;
mod bytecode;
mod pointer;
mod search;

pub use artifact::{ArtifactError, ContractArtifact};
pub use bytecode::{VerifiedDeployment, verify_deployed_bytecode};
pub use pointer::{PointerVerification, ProverVersion, verify_pointer_chain};
pub use search::find_creation_block;

use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, hex};
use serde_json::{Value, json};

use crate::{ProverHelperResult, config::LogScanConfig, rpc::ChainClient};

/// Verifies deployed contracts on one chain against compiled artifacts.
#[derive(Clone)]
pub struct ContractProvenanceVerifier {
    client: Arc<dyn ChainClient>,
    log_scan: LogScanConfig,
}

impl std::fmt::Debug for ContractProvenanceVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractProvenanceVerifier")
            .field("role", &self.client.role())
            .field("log_scan", &self.log_scan)
            .finish()
    }
}

impl ContractProvenanceVerifier {
    /// Creates a verifier over `client`.
    pub fn new(client: Arc<dyn ChainClient>, log_scan: LogScanConfig) -> ProverHelperResult<Self> {
        log_scan.validate()?;
        Ok(Self { client, log_scan })
    }

    /// See [`find_creation_block`]. Searches up to the chain head when
    /// `upper_bound` is `None`.
    pub async fn find_creation_block(
        &self,
        address: Address,
        upper_bound: Option<u64>,
    ) -> ProverHelperResult<u64> {
        let upper_bound = match upper_bound {
            Some(block) => block,
            None => self.client.block_number().await?,
        };
        find_creation_block(self.client.as_ref(), address, upper_bound).await
    }

    /// See [`verify_deployed_bytecode`].
    pub async fn verify_deployed_bytecode(
        &self,
        address: Address,
        artifact: &ContractArtifact,
        at_block: u64,
    ) -> ProverHelperResult<VerifiedDeployment> {
        verify_deployed_bytecode(self.client.as_ref(), address, artifact, at_block).await
    }

    /// See [`verify_pointer_chain`].
    pub async fn verify_pointer_chain(
        &self,
        pointer: Address,
        pointer_artifact: &ContractArtifact,
        prover_artifact: &ContractArtifact,
    ) -> ProverHelperResult<PointerVerification> {
        verify_pointer_chain(
            self.client.as_ref(),
            pointer,
            pointer_artifact,
            prover_artifact,
            &self.log_scan,
        )
        .await
    }
}

/// Renders a decoded ABI value as JSON.
///
/// Integers are decimal strings, byte values and addresses are hex strings.
pub fn abi_value_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => json!(b),
        DynSolValue::Int(i, _) => json!(i.to_string()),
        DynSolValue::Uint(u, _) => json!(u.to_string()),
        DynSolValue::FixedBytes(word, size) => json!(hex::encode_prefixed(&word[..*size])),
        DynSolValue::Address(address) => json!(address.to_checksum(None)),
        DynSolValue::Function(function) => json!(hex::encode_prefixed(function.as_slice())),
        DynSolValue::Bytes(bytes) => json!(hex::encode_prefixed(bytes)),
        DynSolValue::String(s) => json!(s),
        DynSolValue::Array(values)
        | DynSolValue::FixedArray(values)
        | DynSolValue::Tuple(values) => {
            Value::Array(values.iter().map(abi_value_to_json).collect())
        }
        #[allow(unreachable_patterns)]
        other => json!(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{B256, Bytes, I256, U256};

    use super::*;
    use crate::test_utils::MockChainClient;

    #[test]
    fn test_abi_value_to_json() {
        let value = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(51), 256),
            DynSolValue::Int(I256::MINUS_ONE, 256),
            DynSolValue::Address(Address::ZERO),
            DynSolValue::FixedBytes(B256::repeat_byte(0xab), 2),
            DynSolValue::Bytes(vec![0xde, 0xad]),
            DynSolValue::Bool(true),
        ]);
        assert_eq!(
            abi_value_to_json(&value),
            json!([
                "51",
                "-1",
                "0x0000000000000000000000000000000000000000",
                "0xabab",
                "0xdead",
                true
            ])
        );
    }

    #[tokio::test]
    async fn test_find_creation_block_defaults_to_head() {
        let address = Address::repeat_byte(0x42);
        let client =
            MockChainClient::home(500).with_code(address, 123, Bytes::from_static(&[0x00]));
        let verifier =
            ContractProvenanceVerifier::new(Arc::new(client), LogScanConfig::default()).unwrap();

        assert_eq!(verifier.find_creation_block(address, None).await.unwrap(), 123);
        assert!(verifier.find_creation_block(address, Some(100)).await.is_err());
    }
}
