//! HTTP server exposing the logistic and decision-tree pipelines.
//!
//! Configuration comes from the environment:
//!
//!   DIABETO_ADDR             Listen address (default: 0.0.0.0:8000)
//!   DIABETO_LOGISTIC_MODEL   Logistic artifact (default: diabeto_LR.dbto)
//!   DIABETO_TREE_MODEL       Tree artifact (default: diabeto_DC.dbto)
//!   RUST_LOG                 Log filter (default: info)

use anyhow::{Context, Result};

use diabeto::logging::init_tracing;
use diabeto::service::{router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServerConfig::from_env()?;
    let state = AppState::load(&config).with_context(|| {
        format!(
            "loading pipelines from {} and {}",
            config.logistic_model.display(),
            config.tree_model.display()
        )
    })?;

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    tracing::info!(addr = %config.addr, "diabeto listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
