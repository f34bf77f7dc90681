//! Errors raised on the block fetch path.
//!
//! None of these escape a block task: they are logged and absorbed at the
//! task boundary, leaving whatever the store already holds for the block.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The node could not be reached or answered with a non-success status.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not the JSON we expected.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    /// The node answered with a JSON-RPC error object or without a result.
    #[error("rpc error: {0}")]
    Rpc(String),
    /// The node answered well-formed but with no receipt for the hash.
    #[error("missing receipt for transaction {0}")]
    MissingReceipt(String),
    #[error("request cancelled")]
    Cancelled,
}

pub type FetchResult<T> = Result<T, FetchError>;
