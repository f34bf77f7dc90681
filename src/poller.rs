//! Block poller
//!
//! Asks the node for its latest block on a fixed cadence, pushes every
//! answer through the dedup gate, and spawns a fetch task for each block
//! the gate admits.

use crate::context::AppContext;
use crate::fetcher::{fetch_block, BlockOutcome, BlockStatus};
use crate::rpc::NodeClient;
use crate::types::BlockRef;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{error, info, warn};

/// Time between two latest-block queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls the node for new blocks and feeds the fetch pipeline.
pub struct Poller {
    ctx: Arc<AppContext>,
    node: Arc<dyn NodeClient>,
    interval: Duration,
    /// Every block the node reported, duplicates included
    observed: Vec<BlockRef>,
    completions: Option<mpsc::UnboundedSender<BlockOutcome>>,
}

impl Poller {
    /// Create a poller with the default interval.
    pub fn new(ctx: Arc<AppContext>, node: Arc<dyn NodeClient>) -> Self {
        Self {
            ctx,
            node,
            interval: DEFAULT_POLL_INTERVAL,
            observed: Vec::new(),
            completions: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Report the outcome of every spawned block task on `tx`.
    pub fn with_completions(mut self, tx: mpsc::UnboundedSender<BlockOutcome>) -> Self {
        self.completions = Some(tx);
        self
    }

    /// Blocks seen so far, in the order the node reported them.
    pub fn observed(&self) -> &[BlockRef] {
        &self.observed
    }

    /// Poll until `max_blocks` distinct blocks have been admitted.
    ///
    /// A failed query is logged and retried on the next tick without
    /// counting towards `max_blocks`, so a node that never answers keeps
    /// this loop going until shutdown. Returns the last block observed.
    pub async fn run(&mut self, max_blocks: usize) -> Option<BlockRef> {
        info!("Starting block poller, waiting for {} new blocks", max_blocks);

        let mut last = None;
        let mut admitted = 0;

        while admitted < max_blocks {
            match self.node.latest_block().await {
                Ok(block) => {
                    self.observed.push(block.clone());
                    if block.number.is_empty() {
                        warn!("Node returned a block without a number, ignoring");
                    } else if self.ctx.store.admit(&block.number) {
                        admitted += 1;
                        info!(
                            "New block {} ({}/{}), hash={}",
                            block.number, admitted, max_blocks, block.hash
                        );
                        self.spawn_block_task(block.number.clone());
                    }
                    last = Some(block);
                }
                Err(e) => warn!("Failed to fetch latest block: {}", e),
            }

            if admitted >= max_blocks {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.ctx.shutdown.cancelled() => {
                    info!("Shutdown requested, stopping poller");
                    break;
                }
            }
        }

        info!("Poller finished after admitting {} blocks", admitted);
        last
    }

    /// Spawn the fetch task for an admitted block behind a supervisor that
    /// turns a panic into a logged outcome.
    fn spawn_block_task(&self, block_number: String) {
        let ctx = Arc::clone(&self.ctx);
        let node = Arc::clone(&self.node);
        let completions = self.completions.clone();

        let task_block = block_number.clone();
        let handle =
            tokio::spawn(async move { fetch_block(&ctx, node.as_ref(), &task_block).await });

        tokio::spawn(async move {
            let status = block_status(handle.await, &block_number);

            if let Some(tx) = completions {
                let _ = tx.send(BlockOutcome {
                    block_number,
                    status,
                });
            }
        });
    }
}

/// Map a joined block task to its status, logging tasks that did not
/// finish on their own.
fn block_status(result: Result<BlockStatus, JoinError>, block_number: &str) -> BlockStatus {
    match result {
        Ok(status) => status,
        Err(join_err) if join_err.is_panic() => {
            let message = panic_payload_to_string(join_err.into_panic());
            error!("Fetch task for block {} panicked: {}", block_number, message);
            BlockStatus::Panicked(message)
        }
        Err(join_err) => {
            warn!("Fetch task for block {} was aborted: {}", block_number, join_err);
            BlockStatus::Aborted
        }
    }
}

fn panic_payload_to_string(payload: Box<dyn Any + Send + 'static>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "unknown panic".to_string(),
        },
    }
}
