use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::{app, AppState};
use crate::auth::TokenIssuer;
use crate::config;
use crate::is_production;

pub async fn handle(port: Option<u16>, in_memory: bool) -> anyhow::Result<()> {
    let config = config::config();
    config
        .validate()
        .map_err(|msg| anyhow::anyhow!("invalid configuration: {}", msg))?;
    info!("Starting ProjectHub API in {:?} mode", config.environment);

    let tokens = Arc::new(TokenIssuer::from_config(&config.security)?);

    let state = if in_memory {
        if is_production!() {
            warn!("Serving from the in-memory store in production; data will not survive a restart");
        } else {
            info!("Serving from the in-memory store");
        }
        AppState::in_memory(tokens, config)
    } else {
        let database = super::connect(config).await?;
        database.migrate().await?;
        AppState::postgres(database, tokens, config)
    };
    let database = state.database.clone();

    let bind_addr = format!("{}:{}", config.server.host, port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("ProjectHub API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(database) = database {
        database.close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received, draining connections");
}
