//! Constants used throughout the prover helper.

use std::time::Duration;

use alloy_primitives::{Address, address};

/// Address of the parent-chain block hash buffer on Arbitrum chains.
pub const DEFAULT_BUFFER_ADDRESS: Address = address!("0000000048C4Ed10cF14A02B9E0AbDDA5227b071");

/// Storage slot of the buffer's `blockNumber => blockHash` mapping.
pub const DEFAULT_BLOCK_HASH_MAPPING_SLOT: u64 = 51;

/// First home block scanned for assertion confirmation events.
pub const DEFAULT_ASSERTION_SCAN_START_BLOCK: u64 = 1;

/// Default block span of a single `eth_getLogs` request.
///
/// Many hosted endpoints reject ranges wider than 10k blocks.
pub const DEFAULT_LOG_CHUNK_SIZE: u64 = 10_000;

/// Default number of `eth_getLogs` requests in flight during a scan.
pub const DEFAULT_LOG_SCAN_CONCURRENCY: usize = 4;

/// Default LRU cache size for RPC responses.
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Default RPC request timeout.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Retry Configuration Constants
// ============================================================================

/// Default maximum number of retry attempts for RPC operations.
pub const DEFAULT_RPC_MAX_RETRIES: u32 = 3;

/// Default initial delay for exponential backoff.
pub const DEFAULT_RETRY_INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Default maximum delay between retry attempts.
pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_secs(10);
