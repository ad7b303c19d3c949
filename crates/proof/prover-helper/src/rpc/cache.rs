//! Headers by block hash.
//!
//! A header is immutable once its hash is known, so entries never need
//! invalidation. Lookups by number never go through the cache.

use alloy_primitives::B256;
use alloy_rpc_types_eth::Header;
use moka::future::Cache;

use crate::{metrics as helper_metrics, types::ChainRole};

/// Bounded header cache for one chain, counting hits and misses per role.
#[derive(Debug)]
pub struct HeaderCache {
    role: ChainRole,
    inner: Cache<B256, Header>,
}

impl HeaderCache {
    /// Creates a cache holding up to `capacity` headers of `role`.
    pub fn new(role: ChainRole, capacity: usize) -> Self {
        Self { role, inner: Cache::new(capacity as u64) }
    }

    /// The header with hash `hash`, if cached.
    pub async fn get(&self, hash: &B256) -> Option<Header> {
        let header = self.inner.get(hash).await;
        let name = if header.is_some() {
            helper_metrics::CACHE_HITS_TOTAL
        } else {
            helper_metrics::CACHE_MISSES_TOTAL
        };
        metrics::counter!(name, helper_metrics::LABEL_CHAIN => self.role.to_string()).increment(1);
        header
    }

    /// Caches `header` under the hash the node reported for it.
    pub async fn insert(&self, header: Header) {
        self.inner.insert(header.hash, header).await;
    }

    /// Approximate number of cached headers.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use alloy_consensus::Header as ConsensusHeader;

    use super::*;
    use crate::test_utils::sealed_header;

    #[tokio::test]
    async fn test_header_cached_under_its_hash() {
        let cache = HeaderCache::new(ChainRole::Home, 4);
        let header = sealed_header(ConsensusHeader { number: 7, ..Default::default() });

        assert!(cache.get(&header.hash).await.is_none());
        cache.insert(header.clone()).await;

        assert_eq!(cache.get(&header.hash).await, Some(header));
        assert!(cache.get(&B256::repeat_byte(1)).await.is_none());
    }
}
