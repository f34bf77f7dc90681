//! blockfeed - Ethereum block feed
//!
//! Polls a node for its latest block, fetches the first transaction and
//! its receipt for every new block, and keeps them in memory for a small
//! read-only HTTP API.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod fetcher;
pub mod poller;
pub mod rpc;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the main types for convenience
pub use context::AppContext;
pub use error::{FetchError, FetchResult};
pub use fetcher::{BlockOutcome, BlockStatus};
pub use poller::Poller;
pub use rpc::{NodeClient, RpcClient};
pub use store::SharedStore;
pub use types::{BlockRef, Receipt, Transaction, TransactionEnvelope};
