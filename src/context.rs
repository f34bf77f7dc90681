//! Application context shared by the poller, the fetchers and the API.

use crate::store::SharedStore;
use tokio_util::sync::CancellationToken;

/// State built once at startup and handed around behind an `Arc`.
pub struct AppContext {
    /// Fetched envelopes and receipts
    pub store: SharedStore,
    /// Upstream JSON-RPC endpoint used for the direct transaction call
    pub rpc_url: String,
    /// Connection pool shared with the node client
    pub http: reqwest::Client,
    /// Root token; cancelled only on process shutdown
    pub shutdown: CancellationToken,
}

impl AppContext {
    pub fn new(rpc_url: String, http: reqwest::Client) -> Self {
        Self {
            store: SharedStore::new(),
            rpc_url,
            http,
            shutdown: CancellationToken::new(),
        }
    }
}
