//! Listing query server: `GET /api/properties` over a JSON dataset loaded at
//! startup.
//!
//! Environment:
//! - `LISTINGS_PATH` dataset file (default `data/listings.json`)
//! - `LISTINGS_ADDR` bind address (default `127.0.0.1:3000`)
//! - `LISTINGS_LIMIT` max rows per response (default 1000)

mod api;
mod dataset;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::dataset::Dataset;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = env::var("LISTINGS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/listings.json"));
    let addr: SocketAddr = env::var("LISTINGS_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .expect("invalid LISTINGS_ADDR");
    let limit = env_var_usize("LISTINGS_LIMIT", 1000);

    let dataset = Dataset::load(&path)
        .await
        .unwrap_or_else(|err| panic!("cannot load {}: {err}", path.display()));
    if dataset.is_empty() {
        warn!(path = %path.display(), "dataset has no geocoded rows");
    }
    info!(rows = dataset.len(), path = %path.display(), "dataset loaded");

    let app = api::router(AppState {
        dataset: Arc::new(dataset),
        limit,
    });

    info!("listing server listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}

fn env_var_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
