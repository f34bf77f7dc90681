//! Command-line configuration
//!
//! Startup settings for the binary. They are read once and never
//! reloaded.

use crate::poller::DEFAULT_POLL_INTERVAL;
use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use std::net::SocketAddr;
use std::time::Duration;

/// Poll an Ethereum node for new blocks and serve what was fetched
#[derive(Parser, Debug)]
#[command(name = "blockfeed")]
#[command(about = "Poll an Ethereum node for new blocks and serve their transactions and receipts")]
pub struct Args {
    /// RPC endpoint URL (e.g., https://mainnet.infura.io/v3/<key>)
    #[arg(short, long, default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// Address the HTTP API listens on
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Number of distinct new blocks to collect before the poller stops
    #[arg(short, long, default_value_t = 11)]
    pub max_blocks: usize,

    /// Seconds between two latest-block queries
    #[arg(short, long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub poll_interval_secs: u64,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub listen: SocketAddr,
    pub max_blocks: usize,
    pub poll_interval: Duration,
}

impl Config {
    /// Build a configuration from parsed arguments, validating it.
    pub fn from_args(args: Args) -> Result<Self> {
        let config = Self {
            rpc_url: args.rpc_url,
            listen: args.listen,
            max_blocks: args.max_blocks,
            poll_interval: Duration::from_secs(args.poll_interval_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the endpoint is an http(s) URL and the interval is non-zero.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.rpc_url)
            .with_context(|| format!("Invalid RPC URL: {}", self.rpc_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("RPC URL must use http or https, got {}", url.scheme());
        }
        if self.poll_interval.is_zero() {
            anyhow::bail!("Poll interval must be at least one second");
        }
        Ok(())
    }
}
