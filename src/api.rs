//! Read-only HTTP API over the shared store.
//!
//! Every handler takes a snapshot under the store lock and serializes it
//! after the lock is released. Snapshots cannot fail, so the routes answer
//! `200` with whatever has been collected so far; only a serialization
//! failure produces a `500`.

use crate::context::AppContext;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

const HELP_TEXT: &str = "\
blockfeed: latest mainnet blocks, polled every few seconds

Endpoints:
  /blocks        block numbers fetched so far
  /transactions  first transaction of each fetched block, keyed by block number
  /receipts      receipts of those transactions, keyed by transaction hash
";

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Build the API router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(homepage))
        .route("/blocks", get(blocks))
        .route("/transactions", get(transactions))
        .route("/receipts", get(receipts))
        .with_state(ctx)
}

/// Bind `addr` and serve the API until `ctx.shutdown` is cancelled.
///
/// Failing to bind is returned to the caller; it is the one error the
/// process treats as fatal.
pub async fn serve(ctx: Arc<AppContext>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind API listener on {}", addr))?;
    info!(?addr, "API server listening");

    let shutdown = ctx.shutdown.clone();
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("API server error")
}

async fn homepage() -> &'static str {
    HELP_TEXT
}

async fn blocks(State(ctx): State<Arc<AppContext>>) -> Json<Vec<String>> {
    Json(ctx.store.snapshot_keys())
}

async fn transactions(State(ctx): State<Arc<AppContext>>) -> Response {
    pretty_json(&ctx.store.snapshot_transactions())
}

async fn receipts(State(ctx): State<Arc<AppContext>>) -> Response {
    pretty_json(&ctx.store.snapshot_receipts())
}

/// Serialize `value` as indented JSON.
fn pretty_json<T: Serialize>(value: &T) -> Response {
    match serde_json::to_string_pretty(value) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(err) => {
            warn!("Failed to serialize response: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}
