//! Novels catalog server.
//!
//! Builds the catalog once at startup, then serves it read-only:
//! ```text
//! Config ──► build_catalog ──► Library (immutable)
//!                                  │
//!                                  ▼
//!                            axum Router ──► GET /work/, /work/{id}, /text/{hash}
//! ```
//! A build failure exits before the listener is bound.

use std::sync::Arc;

use anyhow::Context;

use novels_catalog::server::{router, AppState};
use novels_catalog::{build_catalog, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().context("failed to load configuration")?;
    let library = build_catalog(&config)
        .await
        .context("failed to build catalog")?;

    let status = library.status();
    let state = Arc::new(AppState {
        library: Arc::new(library),
        index_message: config.index_message.clone(),
    });

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    log::info!("Server listening on http://{}", addr);
    log::info!("Serving {} works", status.works);

    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}
