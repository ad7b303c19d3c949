//! RPC clients for the home and target chains.

use alloy_network::Ethereum;
use alloy_provider::RootProvider;

/// Shared type alias for the HTTP provider.
/// Uses `RootProvider` directly since the clients only perform read operations.
pub type HttpProvider = RootProvider<Ethereum>;

mod cache;
mod client;
mod error;
mod traits;

pub use cache::HeaderCache;
pub use client::{ChainClientConfig, ChainClientImpl};
pub use error::{RpcError, RpcResult};
pub use traits::ChainClient;
