//! Header, proof and payload encoding.
//!
//! The on-chain provers decode exactly these layouts. Field order is part of
//! their interface.

use alloy_primitives::{Address, B256, Bytes, U256, keccak256};
use alloy_rlp::encode_list;
use alloy_rpc_types_eth::{EIP1186AccountProofResponse, EIP1186StorageProof, Header};
use alloy_sol_types::SolValue;

use crate::{
    ProverHelperError, ProverHelperResult,
    rpc::ChainClient,
    types::LinkDatum,
};

/// RLP-encodes the consensus fields of `header`.
///
/// Optional trailing fields (base fee, withdrawals root, blob gas, parent beacon
/// root, requests hash) are encoded exactly as present on that block. The result
/// must hash to the header hash the node reported, otherwise the header was
/// decoded lossily and would never verify on-chain.
pub fn encode_block_header(header: &Header) -> ProverHelperResult<Bytes> {
    let encoded = alloy_rlp::encode(&header.inner);
    let computed = keccak256(&encoded);
    if computed != header.hash {
        return Err(ProverHelperError::MalformedProof(format!(
            "header {} of block {} re-encodes to hash {computed}",
            header.hash, header.inner.number
        )));
    }
    Ok(encoded.into())
}

/// Serializes trie nodes as an RLP list of byte strings.
pub fn serialize_proof_nodes(nodes: &[Bytes]) -> Bytes {
    let mut out = Vec::new();
    encode_list::<Bytes, Bytes>(nodes, &mut out);
    out.into()
}

/// Account and storage proof of one slot at one block, ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedProof {
    /// RLP list of account trie nodes.
    pub account_proof: Bytes,
    /// RLP list of storage trie nodes. An empty list when no key was requested.
    pub storage_proof: Bytes,
    /// Value of the requested slot. Zero when no key was requested.
    pub slot_value: B256,
}

/// The storage entry answering `key`.
///
/// Nodes may echo a key as a full word or as a quantity, so keys are compared
/// as words.
pub fn storage_entry(
    response: &EIP1186AccountProofResponse,
    key: B256,
) -> Option<&EIP1186StorageProof> {
    response.storage_proof.iter().find(|entry| entry.key.as_b256() == key)
}

impl SerializedProof {
    /// Serializes a proof response, checking it answers the request.
    pub fn from_response(
        result: &EIP1186AccountProofResponse,
        account: Address,
        storage_key: Option<B256>,
    ) -> ProverHelperResult<Self> {
        if result.address != account {
            return Err(ProverHelperError::MalformedProof(format!(
                "requested proof for {account}, node answered for {}",
                result.address
            )));
        }
        if result.account_proof.is_empty() {
            return Err(ProverHelperError::MalformedProof(format!(
                "empty account proof for {account}"
            )));
        }

        let (storage_proof, slot_value) = match storage_key {
            Some(key) => {
                let entry = storage_entry(result, key).ok_or_else(|| {
                    ProverHelperError::MalformedProof(format!(
                        "no storage proof for slot {key} of {account}"
                    ))
                })?;
                if entry.proof.is_empty() {
                    return Err(ProverHelperError::MalformedProof(format!(
                        "empty storage proof for slot {key} of {account}"
                    )));
                }
                (serialize_proof_nodes(&entry.proof), B256::from(entry.value.to_be_bytes::<32>()))
            }
            None => (serialize_proof_nodes(&[]), B256::ZERO),
        };

        Ok(Self {
            account_proof: serialize_proof_nodes(&result.account_proof),
            storage_proof,
            slot_value,
        })
    }
}

/// Issues one `eth_getProof` at `block_hash` and serializes the result.
pub async fn fetch_and_serialize_proof(
    client: &dyn ChainClient,
    block_hash: B256,
    account: Address,
    storage_key: Option<B256>,
) -> ProverHelperResult<SerializedProof> {
    let keys = storage_key.into_iter().collect();
    let result = client.get_proof(account, keys, block_hash).await?;
    SerializedProof::from_response(&result, account, storage_key)
}

/// Encodes the input of `getTargetBlockHash`: `(bytes32 sendRoot)` or
/// `(uint256 targetBlockNumber)`.
pub fn encode_get_target_block_hash_input(datum: LinkDatum) -> Bytes {
    match datum {
        LinkDatum::SendRoot(send_root) => send_root.abi_encode().into(),
        LinkDatum::TargetBlockNumber(number) => U256::from(number).abi_encode().into(),
    }
}

/// Encodes the input of `verifyTargetBlockHash`:
/// `(bytes header, <datum>, bytes accountProof, bytes storageProof)`.
pub fn encode_verify_target_block_hash_input(
    header: Bytes,
    datum: LinkDatum,
    proof: SerializedProof,
) -> Bytes {
    let SerializedProof { account_proof, storage_proof, .. } = proof;
    match datum {
        LinkDatum::SendRoot(send_root) => {
            (header, send_root, account_proof, storage_proof).abi_encode_params().into()
        }
        LinkDatum::TargetBlockNumber(number) => {
            (header, U256::from(number), account_proof, storage_proof).abi_encode_params().into()
        }
    }
}

/// Encodes the input of `verifyStorageSlot`:
/// `(bytes header, address account, uint256 slot, bytes accountProof, bytes storageProof)`.
pub fn encode_verify_storage_slot_input(
    header: Bytes,
    account: Address,
    slot: U256,
    proof: SerializedProof,
) -> Bytes {
    let SerializedProof { account_proof, storage_proof, .. } = proof;
    (header, account, slot, account_proof, storage_proof).abi_encode_params().into()
}

#[cfg(test)]
mod tests {
    use alloy_consensus::Header as ConsensusHeader;
    use alloy_primitives::hex;

    use super::*;
    use crate::test_utils::{proof_response, sealed_header};

    fn account_result(key: B256, value: U256) -> EIP1186AccountProofResponse {
        proof_response(
            Address::repeat_byte(0xaa),
            vec![Bytes::from_static(&[0xc1, 0x80]), Bytes::from_static(&[0x80])],
            key,
            value,
            vec![Bytes::from_static(&[0xde, 0xad])],
        )
    }

    #[test]
    fn test_serialize_proof_nodes_is_rlp_list() {
        let nodes = vec![Bytes::from_static(&[0xde, 0xad]), Bytes::from_static(&[0x01])];
        // list header, 0x82 dead, 0x01 (single byte < 0x80 encodes as itself)
        assert_eq!(serialize_proof_nodes(&nodes).as_ref(), &hex!("c482dead01"));
        assert_eq!(serialize_proof_nodes(&[]).as_ref(), &hex!("c0"));
    }

    #[test]
    fn test_header_encoding_hashes_to_header_hash() {
        let header = sealed_header(ConsensusHeader {
            number: 8_361_791,
            base_fee_per_gas: Some(7),
            ..Default::default()
        });
        let encoded = encode_block_header(&header).unwrap();
        assert_eq!(keccak256(&encoded), header.hash);
    }

    #[test]
    fn test_header_encoding_depends_on_fork_fields() {
        let legacy = sealed_header(ConsensusHeader { number: 1, ..Default::default() });
        let london = sealed_header(ConsensusHeader {
            number: 1,
            base_fee_per_gas: Some(1),
            ..Default::default()
        });
        assert_ne!(encode_block_header(&legacy).unwrap(), encode_block_header(&london).unwrap());
    }

    #[test]
    fn test_header_with_wrong_hash_is_rejected() {
        let mut header = sealed_header(ConsensusHeader { number: 5, ..Default::default() });
        header.hash = B256::repeat_byte(0x11);
        assert!(matches!(
            encode_block_header(&header),
            Err(ProverHelperError::MalformedProof(_))
        ));
    }

    #[test]
    fn test_serialized_proof_reports_slot_value() {
        let key = B256::repeat_byte(0x32);
        let result = account_result(key, U256::from(0x0927c06du64));
        let proof =
            SerializedProof::from_response(&result, Address::repeat_byte(0xaa), Some(key))
                .unwrap();

        assert_eq!(proof.slot_value, B256::from(U256::from(0x0927c06du64).to_be_bytes::<32>()));
        assert_eq!(proof.account_proof, serialize_proof_nodes(&result.account_proof));
        assert_eq!(proof.storage_proof.as_ref(), &hex!("c382dead"));
    }

    #[test]
    fn test_proof_without_storage_key() {
        let result = account_result(B256::ZERO, U256::ZERO);
        let proof = SerializedProof::from_response(&result, Address::repeat_byte(0xaa), None)
            .unwrap();
        assert_eq!(proof.storage_proof.as_ref(), &hex!("c0"));
        assert_eq!(proof.slot_value, B256::ZERO);
    }

    #[test]
    fn test_inconsistent_proofs_are_rejected() {
        let key = B256::repeat_byte(0x32);
        let account = Address::repeat_byte(0xaa);

        let result = account_result(key, U256::from(1));
        assert!(SerializedProof::from_response(&result, Address::ZERO, Some(key)).is_err());
        assert!(
            SerializedProof::from_response(&result, account, Some(B256::ZERO)).is_err()
        );

        let mut empty_account = result.clone();
        empty_account.account_proof.clear();
        assert!(SerializedProof::from_response(&empty_account, account, Some(key)).is_err());

        let mut empty_storage = result;
        empty_storage.storage_proof[0].proof.clear();
        assert!(matches!(
            SerializedProof::from_response(&empty_storage, account, Some(key)),
            Err(ProverHelperError::MalformedProof(_))
        ));
    }

    fn sample_proof() -> SerializedProof {
        SerializedProof {
            account_proof: Bytes::from_static(&[0xc1, 0x01]),
            storage_proof: Bytes::from_static(&[0xc1, 0x02]),
            slot_value: B256::ZERO,
        }
    }

    #[test]
    fn test_get_target_block_hash_inputs() {
        let send_root = B256::repeat_byte(0x5e);
        assert_eq!(
            encode_get_target_block_hash_input(LinkDatum::SendRoot(send_root)).as_ref(),
            send_root.as_slice()
        );

        let encoded = encode_get_target_block_hash_input(LinkDatum::TargetBlockNumber(0x7f43ba00));
        assert_eq!(encoded.len(), 32);
        assert_eq!(U256::from_be_slice(&encoded), U256::from(0x7f43ba00u64));
    }

    #[test]
    fn test_verify_target_block_hash_layout() {
        let header = Bytes::from_static(&[0xf9, 0x01, 0x02]);
        let send_root = B256::repeat_byte(0x5e);
        let input = encode_verify_target_block_hash_input(
            header.clone(),
            LinkDatum::SendRoot(send_root),
            sample_proof(),
        );

        let (h, root, account_proof, storage_proof) =
            <(Bytes, B256, Bytes, Bytes)>::abi_decode_params(&input).unwrap();
        assert_eq!(h, header);
        assert_eq!(root, send_root);
        assert_eq!(account_proof, sample_proof().account_proof);
        assert_eq!(storage_proof, sample_proof().storage_proof);
        // Second head word is the static datum itself, not an offset.
        assert_eq!(&input[32..64], send_root.as_slice());

        let input = encode_verify_target_block_hash_input(
            header,
            LinkDatum::TargetBlockNumber(154_627_620),
            sample_proof(),
        );
        let (_, number, _, _) = <(Bytes, U256, Bytes, Bytes)>::abi_decode_params(&input).unwrap();
        assert_eq!(number, U256::from(154_627_620u64));
    }

    #[test]
    fn test_verify_storage_slot_layout() {
        let header = Bytes::from_static(&[0xf9, 0x01, 0x02]);
        let account = Address::repeat_byte(0x38);
        let slot = U256::from(10);
        let input = encode_verify_storage_slot_input(header.clone(), account, slot, sample_proof());

        let (h, a, slot, account_proof, storage_proof) =
            <(Bytes, Address, U256, Bytes, Bytes)>::abi_decode_params(&input).unwrap();
        assert_eq!(h, header);
        assert_eq!(a, account);
        assert_eq!(slot, U256::from(10));
        assert_eq!(account_proof, sample_proof().account_proof);
        assert_eq!(storage_proof, sample_proof().storage_proof);
    }

    #[test]
    fn test_storage_key_returned_as_quantity() {
        let rpc_json = r#"{
            "address": "0x0000000048c4ed10cf14a02b9e0abdda5227b071",
            "accountProof": ["0xc180"],
            "balance": "0x0",
            "codeHash": "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
            "nonce": "0x1",
            "storageHash": "0x0000000000000000000000000000000000000000000000000000000000000001",
            "storageProof": [{ "key": "0x32", "value": "0x7f43ba00", "proof": ["0xdead"] }]
        }"#;
        let response: EIP1186AccountProofResponse = serde_json::from_str(rpc_json).unwrap();
        let account = response.address;

        let proof =
            SerializedProof::from_response(&response, account, Some(B256::with_last_byte(0x32)))
                .unwrap();
        assert_eq!(proof.slot_value, B256::from(U256::from(0x7f43ba00u64).to_be_bytes::<32>()));
        assert_eq!(proof.storage_proof.as_ref(), &hex!("c382dead"));
    }
}
