//! Test doubles: a scripted node client and a mock JSON-RPC server.

use crate::context::AppContext;
use crate::error::{FetchError, FetchResult};
use crate::rpc::NodeClient;
use crate::types::{BlockRef, Receipt};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Nothing listens on port 1, so connections are refused immediately.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

/// Receipt lookups for this hash come back empty.
pub const UNKNOWN_TX_HASH: &str = "0xdeadbeef";

/// Receipt lookups for this hash panic inside the node client.
pub const PANIC_TX_HASH: &str = "0xbadbad";

/// The mock server answers transaction lookups for this block with an error.
pub const FAILING_BLOCK: &str = "0xbad";

/// The mock server reports no transaction at index 0 for this block.
pub const EMPTY_BLOCK: &str = "0xe";

/// The mock server's first transaction for this block has `PANIC_TX_HASH`.
pub const PANIC_BLOCK: &str = "0xdead";

/// The mock server answers transaction lookups for this block with a body
/// that is not JSON.
pub const MALFORMED_BLOCK: &str = "0xbeef";

/// The mock server answers transaction lookups for this block with HTTP 500.
pub const SERVER_ERROR_BLOCK: &str = "0x500";

pub fn block(number: &str) -> BlockRef {
    BlockRef {
        number: number.to_string(),
        hash: format!("{}aa", number),
        parent_hash: format!("{}bb", number),
    }
}

pub fn test_context(rpc_url: &str) -> Arc<AppContext> {
    Arc::new(AppContext::new(rpc_url.to_string(), reqwest::Client::new()))
}

/// Node client that replays a fixed list of latest-block answers.
///
/// Once the script runs out every call fails. Receipts are synthesized
/// from the requested hash.
pub struct ScriptedNode {
    blocks: Mutex<VecDeque<FetchResult<BlockRef>>>,
    block_calls: AtomicUsize,
    receipt_calls: AtomicUsize,
}

impl ScriptedNode {
    pub fn new(blocks: Vec<FetchResult<BlockRef>>) -> Self {
        Self {
            blocks: Mutex::new(blocks.into()),
            block_calls: AtomicUsize::new(0),
            receipt_calls: AtomicUsize::new(0),
        }
    }

    pub fn block_calls(&self) -> usize {
        self.block_calls.load(Ordering::SeqCst)
    }

    pub fn receipt_calls(&self) -> usize {
        self.receipt_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeClient for ScriptedNode {
    async fn latest_block(&self) -> FetchResult<BlockRef> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        self.blocks
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Rpc("script exhausted".to_string())))
    }

    async fn transaction_receipt(
        &self,
        tx_hash: &str,
        cancel: &CancellationToken,
    ) -> FetchResult<Option<Receipt>> {
        self.receipt_calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        match tx_hash {
            UNKNOWN_TX_HASH => Ok(None),
            PANIC_TX_HASH => panic!("node client blew up on {}", tx_hash),
            _ => Ok(Some(receipt(tx_hash))),
        }
    }
}

fn receipt(tx_hash: &str) -> Receipt {
    Receipt {
        transaction_hash: tx_hash.to_string(),
        status: "0x1".to_string(),
        gas_used: "0x5208".to_string(),
        ..Default::default()
    }
}

/// Minimal JSON-RPC node served by axum on a random local port.
pub struct MockRpcServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockRpcServer {
    pub async fn start() -> Self {
        let app = Router::new().route("/", post(handle_rpc));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock rpc listener");
        let addr = listener.local_addr().expect("addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

impl Drop for MockRpcServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_rpc(Json(request): Json<Value>) -> Response {
    let id = request["id"].clone();
    let param = request["params"][0].as_str().unwrap_or_default().to_string();

    if request["method"] == "eth_getTransactionByBlockNumberAndIndex" {
        match param.as_str() {
            MALFORMED_BLOCK => return (StatusCode::OK, "not json{").into_response(),
            SERVER_ERROR_BLOCK => {
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response()
            }
            _ => {}
        }
    }

    let outcome = match request["method"].as_str().unwrap_or_default() {
        "eth_getBlockByNumber" => Ok(json!({
            "number": "0xd260eb",
            "hash": "0xd260ebaa",
            "parentHash": "0xd260eabb",
            "transactions": []
        })),
        "eth_getTransactionByBlockNumberAndIndex" => match param.as_str() {
            FAILING_BLOCK => Err(json!({"code": -32000, "message": "header not found"})),
            EMPTY_BLOCK => Ok(Value::Null),
            _ => {
                let hash = if param == PANIC_BLOCK {
                    PANIC_TX_HASH.to_string()
                } else {
                    format!("{}00", param)
                };
                Ok(json!({
                    "blockHash": format!("{}aa", param),
                    "blockNumber": param,
                    "from": "0x00000000000000000000000000000000000000aa",
                    "to": "0x00000000000000000000000000000000000000bb",
                    "gas": "0x5208",
                    "gasPrice": "0x3b9aca00",
                    "hash": hash,
                    "input": "0x",
                    "nonce": "0x0",
                    "transactionIndex": "0x0",
                    "type": "0x0",
                    "value": "0xde0b6b3a7640000"
                }))
            }
        },
        "eth_getTransactionReceipt" => match param.as_str() {
            UNKNOWN_TX_HASH => Ok(Value::Null),
            _ => Ok(serde_json::to_value(receipt(&param)).expect("receipt json")),
        },
        other => Err(json!({"code": -32601, "message": format!("method {} not found", other)})),
    };

    Json(match outcome {
        Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
        Err(error) => json!({"jsonrpc": "2.0", "id": id, "error": error}),
    })
    .into_response()
}
