//! rdc-api server binary

use std::sync::Arc;

use clap::Parser;
use rdc_api::{routes, ServerConfig};
use rdc_store::SubmissionStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    let store = match &config.data_file {
        Some(path) => SubmissionStore::open(path)?,
        None => {
            tracing::warn!("no --data-file given, submissions will not survive a restart");
            SubmissionStore::in_memory()
        }
    };

    tracing::info!(bind = %config.bind, static_dir = %config.static_dir.display(), "rdc-api listening");
    warp::serve(routes(Arc::new(store), config.static_dir.clone()))
        .run(config.bind)
        .await;

    Ok(())
}
