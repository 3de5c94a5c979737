//! Server startup: stores, state, cleanup task and graceful shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::watch;

use gatehouse_auth::SessionCleanup;
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_database::Stores;

use crate::router::build_router;
use crate::state::AppState;

/// Runs the Gatehouse server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(driver = ?config.database.driver, "Starting Gatehouse server");

    let stores = Stores::open(&config.database).await?;
    let state = AppState::new(config, stores.clone())?;
    let config = state.config.clone();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let cleanup = match config.session.cleanup_interval_seconds {
        0 => None,
        secs => Some(
            SessionCleanup::new(stores.sessions.clone())
                .spawn(Duration::from_secs(secs), shutdown_rx),
        ),
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(address = %addr, "Gatehouse listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(handle) = cleanup {
        let _ = handle.await;
    }
    stores.close().await;

    tracing::info!("Gatehouse stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
