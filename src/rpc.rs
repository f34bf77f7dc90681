//! JSON-RPC client for Ethereum nodes
//!
//! `NodeClient` is the seam the poller and the receipt fetcher talk
//! through; `RpcClient` implements it over HTTP.

use crate::error::{FetchError, FetchResult};
use crate::types::{BlockRef, Receipt};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// The node queries the pipeline depends on.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Fetch the latest block.
    async fn latest_block(&self) -> FetchResult<BlockRef>;

    /// Fetch the receipt for a transaction hash.
    ///
    /// Returns `Ok(None)` when the node answers with an empty result.
    /// Resolves to `FetchError::Cancelled` if `cancel` fires first.
    async fn transaction_receipt(
        &self,
        tx_hash: &str,
        cancel: &CancellationToken,
    ) -> FetchResult<Option<Receipt>>;
}

/// JSON-RPC client for Ethereum nodes.
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
}

impl RpcClient {
    /// Create a new RPC client.
    pub fn new(url: String) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_client(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }

    /// Make a JSON-RPC call and return its `result` member.
    async fn call(&self, method: &str, params: Value) -> FetchResult<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let body = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let json: Value = serde_json::from_slice(&body)?;
        into_result(json)
    }
}

/// Unwrap a JSON-RPC response into its `result`, turning an `error` member
/// into `FetchError::Rpc`.
pub(crate) fn into_result(mut json: Value) -> FetchResult<Value> {
    if let Some(error) = json.get("error") {
        return Err(FetchError::Rpc(error.to_string()));
    }

    json.get_mut("result")
        .map(Value::take)
        .ok_or_else(|| FetchError::Rpc("response missing 'result' field".to_string()))
}

#[async_trait]
impl NodeClient for RpcClient {
    async fn latest_block(&self) -> FetchResult<BlockRef> {
        let result = self
            .call("eth_getBlockByNumber", json!(["latest", true]))
            .await?;
        if result.is_null() {
            return Err(FetchError::Rpc("node returned no latest block".to_string()));
        }
        Ok(serde_json::from_value(result)?)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: &str,
        cancel: &CancellationToken,
    ) -> FetchResult<Option<Receipt>> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = self.call("eth_getTransactionReceipt", json!([tx_hash])) => result?,
        };

        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(result)?))
    }
}
