//! Per-block fetch task
//!
//! For every admitted block the poller spawns one task that fetches the
//! block's first transaction with a direct JSON-RPC call, then that
//! transaction's receipt through the node client. Failures are logged and
//! absorbed here; the store keeps whatever it already had.

use crate::context::AppContext;
use crate::error::{FetchError, FetchResult};
use crate::rpc::NodeClient;
use crate::types::{Receipt, TransactionEnvelope};
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const TX_BY_BLOCK_AND_INDEX: &str = "eth_getTransactionByBlockNumberAndIndex";

/// Only the first transaction of a block is fetched.
const FIRST_INDEX: &str = "0x0";

/// How a block task ended.
#[derive(Debug)]
pub enum BlockStatus {
    /// Transaction and receipt are both stored.
    Complete { tx_hash: String },
    /// The block has no transaction at index 0; nothing further to fetch.
    NoTransaction,
    /// The transaction fetch failed; the placeholder stays in the store.
    TransactionFailed(FetchError),
    /// The transaction was stored but its receipt could not be.
    ReceiptFailed { tx_hash: String, error: FetchError },
    /// The task panicked.
    Panicked(String),
    /// The task was cancelled before finishing, e.g. at runtime shutdown.
    Aborted,
}

/// Completion report for one admitted block.
#[derive(Debug)]
pub struct BlockOutcome {
    pub block_number: String,
    pub status: BlockStatus,
}

/// Build the JSON-RPC body asking for the first transaction of a block.
fn transaction_request(block_number: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": TX_BY_BLOCK_AND_INDEX,
        "params": [block_number, FIRST_INDEX],
        "id": 1
    })
}

/// Fetch the first transaction of `block_number` and record it.
///
/// Talks to the endpoint directly instead of going through the node
/// client. On error the store is left untouched, so an admitted block
/// keeps its placeholder envelope.
pub async fn fetch_transaction(
    ctx: &AppContext,
    block_number: &str,
) -> FetchResult<TransactionEnvelope> {
    let body = ctx
        .http
        .post(&ctx.rpc_url)
        .header(CONTENT_TYPE, "application/json")
        .body(transaction_request(block_number).to_string())
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    debug!(
        "{} for block {} returned {} bytes",
        TX_BY_BLOCK_AND_INDEX,
        block_number,
        body.len()
    );

    let json: Value = serde_json::from_slice(&body)?;
    if let Some(error) = json.get("error") {
        return Err(FetchError::Rpc(error.to_string()));
    }
    let envelope: TransactionEnvelope = serde_json::from_value(json)?;

    ctx.store.record_transaction(block_number, envelope.clone());
    Ok(envelope)
}

/// Fetch the receipt for `tx_hash` and record it under the hash the
/// receipt itself carries.
///
/// An empty answer from the node is reported as `MissingReceipt`.
pub async fn fetch_receipt(
    ctx: &AppContext,
    node: &dyn NodeClient,
    tx_hash: &str,
    cancel: &CancellationToken,
) -> FetchResult<Receipt> {
    let receipt = node
        .transaction_receipt(tx_hash, cancel)
        .await?
        .filter(|receipt| !receipt.transaction_hash.is_empty())
        .ok_or_else(|| FetchError::MissingReceipt(tx_hash.to_string()))?;

    ctx.store.record_receipt(receipt.clone());
    Ok(receipt)
}

/// Run the transaction fetch, then the receipt fetch, for one block.
pub async fn fetch_block(
    ctx: &AppContext,
    node: &dyn NodeClient,
    block_number: &str,
) -> BlockStatus {
    let envelope = match fetch_transaction(ctx, block_number).await {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!("Failed to fetch transaction for block {}: {}", block_number, error);
            return BlockStatus::TransactionFailed(error);
        }
    };

    if envelope.transaction.is_empty() {
        info!("Block {} has no transaction at index {}", block_number, FIRST_INDEX);
        return BlockStatus::NoTransaction;
    }

    let tx_hash = envelope.transaction.hash;
    let cancel = ctx.shutdown.child_token();
    match fetch_receipt(ctx, node, &tx_hash, &cancel).await {
        Ok(_) => {
            info!("Stored transaction {} and receipt for block {}", tx_hash, block_number);
            BlockStatus::Complete { tx_hash }
        }
        Err(error) => {
            warn!("Failed to fetch receipt for tx {}: {}", tx_hash, error);
            BlockStatus::ReceiptFailed { tx_hash, error }
        }
    }
}
