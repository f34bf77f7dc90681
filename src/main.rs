//! blockfeed binary
//!
//! Polls an Ethereum node for new blocks in the background and serves the
//! fetched transactions and receipts over HTTP.

use anyhow::{Context, Result};
use blockfeed::api;
use blockfeed::config::{Args, Config};
use blockfeed::context::AppContext;
use blockfeed::poller::Poller;
use blockfeed::rpc::RpcClient;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_args(Args::parse()).context("Invalid configuration")?;

    info!("Starting blockfeed");
    info!("RPC URL: {}", config.rpc_url);
    info!("Listening on: {}", config.listen);

    let http = reqwest::Client::new();
    let ctx = Arc::new(AppContext::new(config.rpc_url.clone(), http.clone()));
    let node = Arc::new(RpcClient::with_client(http, config.rpc_url.clone()));

    // The poller's return value is not needed; the store is what matters.
    let mut poller = Poller::new(Arc::clone(&ctx), node).with_interval(config.poll_interval);
    let max_blocks = config.max_blocks;
    tokio::spawn(async move {
        poller.run(max_blocks).await;
    });

    // Handle Ctrl+C gracefully
    let server = api::serve(Arc::clone(&ctx), config.listen);
    tokio::pin!(server);
    tokio::select! {
        result = &mut server => {
            result.context("API server failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
            ctx.shutdown.cancel();
            server.await.context("API server failed during shutdown")?;
        }
    }

    info!("blockfeed stopped");
    Ok(())
}
