//! Creation block search.

use alloy_primitives::Address;
use tracing::{debug, trace};

use crate::{ProverHelperError, ProverHelperResult, rpc::ChainClient};

/// Finds the first block in `[1, upper_bound]` at which `address` has code.
///
/// Code presence is assumed monotonic over the range, i.e. the contract was not
/// destroyed and redeployed in between. One `eth_getCode` is issued per halving.
pub async fn find_creation_block(
    client: &dyn ChainClient,
    address: Address,
    upper_bound: u64,
) -> ProverHelperResult<u64> {
    let not_found = || ProverHelperError::ContractNotFound { address, upper_bound };
    if upper_bound == 0 || client.code_at(address, Some(upper_bound)).await?.is_empty() {
        return Err(not_found());
    }

    let (mut left, mut right) = (1, upper_bound);
    while left < right {
        let mid = left + (right - left) / 2;
        let deployed = !client.code_at(address, Some(mid)).await?.is_empty();
        trace!(%address, left, right, mid, deployed, "Bisecting creation block");
        if deployed {
            right = mid;
        } else {
            left = mid + 1;
        }
    }

    debug!(%address, creation_block = left, "Found creation block");
    Ok(left)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Bytes;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::MockChainClient;

    const CONTRACT: Address = Address::repeat_byte(0x42);

    fn deployed_at(block: u64) -> MockChainClient {
        MockChainClient::home(1_000_000).with_code(
            CONTRACT,
            block,
            Bytes::from_static(&[0x60, 0x80]),
        )
    }

    #[rstest]
    #[case::first_block(1)]
    #[case::second_block(2)]
    #[case::interior(333)]
    #[case::midpoint(500)]
    #[case::after_midpoint(501)]
    #[case::before_upper_bound(999)]
    #[case::upper_bound(1_000)]
    #[tokio::test]
    async fn finds_creation_block(#[case] block: u64) {
        let found = find_creation_block(&deployed_at(block), CONTRACT, 1_000).await.unwrap();
        assert_eq!(found, block);
    }

    #[tokio::test]
    async fn test_not_found_before_deployment() {
        let err = find_creation_block(&deployed_at(1_001), CONTRACT, 1_000).await.unwrap_err();
        assert!(matches!(err, ProverHelperError::ContractNotFound { upper_bound: 1_000, .. }));

        let err = find_creation_block(&deployed_at(1), CONTRACT, 0).await.unwrap_err();
        assert!(matches!(err, ProverHelperError::ContractNotFound { .. }));
    }
}
