use session_core::{FileStorage, MemoryStorage, SessionStorage};
use session_web::{create_router, ServerConfig, ServerState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,session_web=debug,session_core=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Session server starting...");

    let config = ServerConfig::from_env()?;

    let storage: Box<dyn SessionStorage> = match &config.storage_file {
        Some(path) => {
            tracing::info!("Persisting session to {}", path.display());
            Box::new(FileStorage::new(path.clone()))
        }
        None => {
            tracing::warn!("No storage file configured, session will not survive restarts");
            Box::new(MemoryStorage::new())
        }
    };

    let bind_addr = config.bind_addr;
    let state = ServerState::load(config, storage)?;
    let app = create_router(state.into_shared());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Try these commands:");
    tracing::info!(
        "   curl -X PUT -H 'content-type: application/json' -d '\"Ada\"' http://{}/session/profile/name",
        bind_addr
    );
    tracing::info!("   curl http://{}/session/profile", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, shutting down...");
}
