//! Metric names recorded by the prover helper.
//!
//! The library only records; installing an exporter is up to the binary.

/// Counter: total header cache hits, labelled with `chain`.
pub const CACHE_HITS_TOTAL: &str = "prover_helper_header_cache_hits_total";

/// Counter: total header cache misses, labelled with `chain`.
pub const CACHE_MISSES_TOTAL: &str = "prover_helper_header_cache_misses_total";

/// Counter: total proof inputs built, labelled with `operation`.
pub const INPUTS_BUILT_TOTAL: &str = "prover_helper_inputs_built_total";

/// Counter: total `eth_getLogs` requests issued while scanning.
pub const LOG_SCAN_REQUESTS_TOTAL: &str = "prover_helper_log_scan_requests_total";

/// Label key for the chain role.
pub const LABEL_CHAIN: &str = "chain";

/// Label key for the input-building operation.
pub const LABEL_OPERATION: &str = "operation";

/// Records that an input for `operation` was built.
pub fn record_input_built(operation: &'static str) {
    metrics::counter!(INPUTS_BUILT_TOTAL, LABEL_OPERATION => operation).increment(1);
}
