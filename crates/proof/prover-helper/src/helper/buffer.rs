//! Child-to-parent linking through the parent-chain block hash buffer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{LinkLocation, ProofFetcher, ProverHelper};
use crate::{
    ProverHelperError, ProverHelperResult,
    config::BufferLinkConfig,
    contracts::BufferContract,
    rpc::ChainClient,
    slot::derive_mapping_slot,
    types::{BufferEntry, LinkDatum, ObservationPoint, ResolvedTarget},
};

/// Proves parent-chain block hashes from the child chain.
#[derive(Debug, Clone)]
pub struct BufferLinkHelper {
    fetcher: ProofFetcher,
    config: BufferLinkConfig,
}

impl BufferLinkHelper {
    /// Creates a helper reading the buffer in `config`.
    pub fn new(
        home: Arc<dyn ChainClient>,
        target: Arc<dyn ChainClient>,
        config: BufferLinkConfig,
    ) -> ProverHelperResult<Self> {
        Ok(Self { fetcher: ProofFetcher::new(home, target)?, config })
    }

    /// The helper's configuration.
    pub const fn config(&self) -> &BufferLinkConfig {
        &self.config
    }

    /// Reads the newest buffer entry as of the home block `at`.
    pub async fn newest_entry(&self, at: ObservationPoint) -> ProverHelperResult<BufferEntry> {
        let home = self.fetcher.home();
        let buffer = BufferContract::new(self.config.buffer);

        let block_number = buffer.newest_block_number(home, at.block).await?;
        if block_number == 0 {
            return Err(ProverHelperError::NoProvableTargetFound {
                observation_block: at.number,
                reason: format!("buffer {} is empty", self.config.buffer),
            });
        }

        let block_hash = buffer.block_hash(home, block_number, at.block).await?;
        if block_hash.is_zero() {
            return Err(ProverHelperError::NoProvableTargetFound {
                observation_block: at.number,
                reason: format!(
                    "buffer {} has no hash for block {block_number}",
                    self.config.buffer
                ),
            });
        }

        Ok(BufferEntry { block_number, block_hash })
    }
}

#[async_trait]
impl ProverHelper for BufferLinkHelper {
    fn fetcher(&self) -> &ProofFetcher {
        &self.fetcher
    }

    async fn resolve_at(&self, at: ObservationPoint) -> ProverHelperResult<ResolvedTarget> {
        let entry = self.newest_entry(at).await?;
        debug!(
            observation_block = at.number,
            target_block_number = entry.block_number,
            target_block_hash = %entry.block_hash,
            "Resolved buffer entry"
        );
        Ok(entry.into())
    }

    async fn link_location(
        &self,
        target: &ResolvedTarget,
        _at: ObservationPoint,
    ) -> ProverHelperResult<LinkLocation> {
        let LinkDatum::TargetBlockNumber(block_number) = target.link_datum else {
            return Err(ProverHelperError::Contract(format!(
                "buffer link cannot prove datum {:?}",
                target.link_datum
            )));
        };
        Ok(LinkLocation {
            account: self.config.buffer,
            storage_key: derive_mapping_slot(self.config.block_hash_mapping_slot, block_number),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy_consensus::Header as ConsensusHeader;
    use alloy_primitives::{Address, B256, Bytes, U256};
    use alloy_rpc_types_eth::{BlockId, EIP1186AccountProofResponse, Header};
    use alloy_sol_types::SolValue;
    use rstest::rstest;

    use super::*;
    use crate::{
        codec::encode_block_header,
        constants::DEFAULT_BUFFER_ADDRESS,
        contracts::IBuffer,
        test_utils::{MockChainClient, proof_response, sealed_header},
    };

    const HEAD: u64 = 154_627_620;

    fn hash_of(block_number: u64) -> B256 {
        B256::from((U256::from(block_number) + U256::from(0xabcd)).to_be_bytes::<32>())
    }

    fn head_header() -> Header {
        sealed_header(ConsensusHeader { number: HEAD, ..Default::default() })
    }

    fn newest_at(client: MockChainClient, from_block: u64, newest: u64) -> MockChainClient {
        let hash_call =
            IBuffer::parentChainBlockHashCall { parentChainBlockNumber: U256::from(newest) };
        client
            .with_call(
                DEFAULT_BUFFER_ADDRESS,
                IBuffer::newestBlockNumberCall {},
                from_block,
                U256::from(newest),
            )
            .with_call(DEFAULT_BUFFER_ADDRESS, hash_call, from_block, hash_of(newest))
    }

    fn buffer_proof(block_number: u64, value: B256) -> EIP1186AccountProofResponse {
        proof_response(
            DEFAULT_BUFFER_ADDRESS,
            vec![Bytes::from_static(&[0xc1, 0x80])],
            derive_mapping_slot(U256::from(51), block_number),
            U256::from_be_bytes(value.0),
            vec![Bytes::from_static(&[0xc1, 0x81])],
        )
    }

    /// Buffer empty until block 10, then entries 7_000, 7_010 and 7_020 recorded
    /// at home blocks 10, 20 and 30.
    fn home_chain(stored_link: B256) -> MockChainClient {
        let client = MockChainClient::home(HEAD).with_call(
            DEFAULT_BUFFER_ADDRESS,
            IBuffer::newestBlockNumberCall {},
            0,
            U256::ZERO,
        );
        let client = newest_at(client, 10, 7_000);
        let client = newest_at(client, 20, 7_010);
        newest_at(client, 30, 7_020)
            .with_header(head_header())
            .with_proof(head_header().hash, buffer_proof(7_020, stored_link))
    }

    fn helper_over(home: Arc<MockChainClient>) -> BufferLinkHelper {
        BufferLinkHelper::new(
            home,
            Arc::new(MockChainClient::target(1)),
            BufferLinkConfig::default(),
        )
        .unwrap()
    }

    fn helper(home: MockChainClient) -> BufferLinkHelper {
        helper_over(Arc::new(home))
    }

    #[rstest]
    #[case::first_entry(10, 7_000)]
    #[case::between_updates(15, 7_000)]
    #[case::second_entry(20, 7_010)]
    #[case::between_later_updates(25, 7_010)]
    #[case::third_entry(30, 7_020)]
    #[case::head(HEAD, 7_020)]
    #[tokio::test]
    async fn newest_entry_as_of_observation_block(
        #[case] observation_block: u64,
        #[case] expected: u64,
    ) {
        let helper = helper(home_chain(hash_of(7_020)));
        let entry = helper.newest_entry(observation_block.into()).await.unwrap();
        assert_eq!(entry.block_number, expected);
        assert_eq!(entry.block_hash, hash_of(expected));
    }

    #[tokio::test]
    async fn test_empty_buffer_is_not_provable() {
        let helper = helper(home_chain(hash_of(7_020)));
        let err = helper.resolve_provable_target(5).await.unwrap_err();
        assert!(matches!(
            err,
            ProverHelperError::NoProvableTargetFound { observation_block: 5, .. }
        ));
    }

    #[tokio::test]
    async fn test_zero_hash_is_not_provable() {
        let home = MockChainClient::home(HEAD)
            .with_call(DEFAULT_BUFFER_ADDRESS, IBuffer::newestBlockNumberCall {}, 0, U256::from(9))
            .with_call(
                DEFAULT_BUFFER_ADDRESS,
                IBuffer::parentChainBlockHashCall { parentChainBlockNumber: U256::from(9) },
                0,
                B256::ZERO,
            );
        let err = helper(home).resolve_provable_target(HEAD).await.unwrap_err();
        assert!(matches!(err, ProverHelperError::NoProvableTargetFound { .. }));
    }

    #[tokio::test]
    async fn test_get_target_block_hash_input_is_block_number() {
        let helper = helper(home_chain(hash_of(7_020)));
        let out = helper.build_get_target_block_hash_input().await.unwrap();
        assert_eq!(out.target_block_hash, hash_of(7_020));
        assert_eq!(out.input, Bytes::from(U256::from(7_020).abi_encode()));
    }

    #[tokio::test]
    async fn test_verify_target_block_hash_input_layout() {
        let helper = helper(home_chain(hash_of(7_020)));
        let out = helper.build_verify_target_block_hash_input(head_header().hash).await.unwrap();

        let (header, block_number, _account_proof, _storage_proof) =
            <(Bytes, U256, Bytes, Bytes)>::abi_decode_params(&out.input).unwrap();
        assert_eq!(header, encode_block_header(&head_header()).unwrap());
        assert_eq!(block_number, U256::from(7_020));
        assert_eq!(out.target_block_hash, hash_of(7_020));
    }

    #[tokio::test]
    async fn test_verify_reads_buffer_by_home_block_hash() {
        let home = Arc::new(home_chain(hash_of(7_020)));
        let helper = helper_over(Arc::clone(&home));
        helper.build_verify_target_block_hash_input(head_header().hash).await.unwrap();

        let reads = home.call_blocks();
        assert_eq!(reads.len(), 2);
        assert!(reads.iter().all(|block| *block == BlockId::hash(head_header().hash)));
    }

    #[tokio::test]
    async fn test_verify_rejects_link_value_mismatch() {
        let helper = helper(home_chain(B256::repeat_byte(0x42)));
        let err =
            helper.build_verify_target_block_hash_input(head_header().hash).await.unwrap_err();
        assert!(matches!(err, ProverHelperError::MalformedProof(_)));
    }

    #[tokio::test]
    async fn test_link_location_uses_mapping_slot() {
        let helper = BufferLinkHelper::new(
            Arc::new(MockChainClient::home(1)),
            Arc::new(MockChainClient::target(1)),
            BufferLinkConfig {
                buffer: Address::repeat_byte(7),
                block_hash_mapping_slot: U256::from(9),
            },
        )
        .unwrap();
        let target = ResolvedTarget {
            target_block_hash: B256::repeat_byte(1),
            link_datum: LinkDatum::TargetBlockNumber(12),
        };
        let link = helper.link_location(&target, ObservationPoint::at_number(1)).await.unwrap();
        assert_eq!(link.account, Address::repeat_byte(7));
        assert_eq!(link.storage_key, derive_mapping_slot(U256::from(9), 12u64));
    }
}
