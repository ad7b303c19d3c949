//! Chunked `eth_getLogs` scans over block ranges.
//!
//! Ranges are split into fixed-size chunks and queried with bounded
//! concurrency. Results are consumed in chunk order, so the first chunk that
//! yields a match decides the answer and later chunks are never awaited.

use alloy_rpc_types_eth::{Filter, Log};
use futures::{StreamExt, stream};
use tracing::debug;

use crate::{
    config::LogScanConfig,
    metrics::LOG_SCAN_REQUESTS_TOTAL,
    rpc::{ChainClient, RpcResult},
};

/// Splits `[from, to]` into inclusive chunks of at most `chunk_size` blocks.
pub fn chunk_ranges(from: u64, to: u64, chunk_size: u64) -> Vec<(u64, u64)> {
    let mut ranges = Vec::new();
    if from > to || chunk_size == 0 {
        return ranges;
    }
    let mut start = from;
    loop {
        let end = start.saturating_add(chunk_size - 1).min(to);
        ranges.push((start, end));
        if end >= to {
            break;
        }
        start = end + 1;
    }
    ranges
}

fn position(log: &Log) -> (u64, u64) {
    (log.block_number.unwrap_or(u64::MAX), log.log_index.unwrap_or(u64::MAX))
}

/// Returns the earliest log matching `filter` in `[from, to]`, ordered by
/// block number then log index.
///
/// The block range of `filter` is overwritten per chunk.
pub async fn find_earliest_log(
    client: &dyn ChainClient,
    filter: &Filter,
    from: u64,
    to: u64,
    config: &LogScanConfig,
) -> RpcResult<Option<Log>> {
    let ranges = chunk_ranges(from, to, config.chunk_size);
    debug!(from, to, chunks = ranges.len(), "Scanning for earliest log");

    let mut requests = stream::iter(ranges)
        .map(|(start, end)| {
            let chunk = filter.clone().from_block(start).to_block(end);
            async move {
                metrics::counter!(LOG_SCAN_REQUESTS_TOTAL).increment(1);
                client.get_logs(&chunk).await
            }
        })
        .buffered(config.concurrency);

    while let Some(logs) = requests.next().await {
        if let Some(first) = logs?.into_iter().min_by_key(position) {
            return Ok(Some(first));
        }
    }
    Ok(None)
}

/// Returns every log matching `filter` in `[from, to]`, in chain order.
pub async fn collect_logs(
    client: &dyn ChainClient,
    filter: &Filter,
    from: u64,
    to: u64,
    config: &LogScanConfig,
) -> RpcResult<Vec<Log>> {
    let ranges = chunk_ranges(from, to, config.chunk_size);
    debug!(from, to, chunks = ranges.len(), "Collecting logs");

    let chunks: Vec<Vec<Log>> = stream::iter(ranges)
        .map(|(start, end)| {
            let chunk = filter.clone().from_block(start).to_block(end);
            async move {
                metrics::counter!(LOG_SCAN_REQUESTS_TOTAL).increment(1);
                client.get_logs(&chunk).await
            }
        })
        .buffered(config.concurrency)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<RpcResult<_>>()?;

    let mut logs: Vec<Log> = chunks.into_iter().flatten().collect();
    logs.sort_by_key(position);
    Ok(logs)
}
