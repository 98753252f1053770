//! To-do list HTTP server.
//!
//! # Usage
//!
//! ```bash
//! TODO_PORT=8000 cargo run --bin todo-list
//! ```
//!
//! Configuration comes from the environment (and `.env`, if present); see
//! [`todo_list::Config`].
//!
//! # Pages
//!
//! - `GET  /` - list; `POST /` adds an item
//! - `GET  /delete/:id`, `/cross_off/:id`, `/uncross/:id`
//! - `GET  /edit/:id` - edit form; `POST /edit/:id` saves it
//! - `GET  /health`, `/health/ready`, `/metrics`

use anyhow::Context as _;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use todo_list::{router, AppState, Config, TodoEnvironment, TodoReducer, TodoState, TodoStore};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        host = %config.host,
        port = config.port,
        max_text_len = config.max_text_len,
        "Starting to-do list server"
    );

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let store = Arc::new(TodoStore::new(
        TodoState::new(),
        TodoReducer::new(),
        TodoEnvironment::new(config.max_text_len),
    ));

    let app = router(AppState::new(Arc::clone(&store), config.dispatch_timeout)).route(
        "/metrics",
        get(move || std::future::ready(prometheus_handle.render())),
    );

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let effects that were already started feed their events back
    if let Err(e) = store.shutdown(config.shutdown_timeout).await {
        error!(error = %e, "Store did not drain before the shutdown timeout");
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
