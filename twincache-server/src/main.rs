use axum::{extract::Request, ServiceExt};
use shared::config::Config;
use std::sync::Arc;
use storage_engine::{create_backends, UnifiedBackendFactory};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use twincache::CacheCoordinator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting TwinCache Server");

    // Load environment variables
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env()?;

    // Backends in configured order, Primary first
    let backends = create_backends(&UnifiedBackendFactory, &config.backends)?;
    let coordinator = CacheCoordinator::with_backends(backends)?
        .with_call_timeout(config.backend_timeout);
    info!(
        "Backends: {} (call timeout: {:?})",
        coordinator.backend_names().join(" -> "),
        config.backend_timeout
    );

    let app_state = server_http::AppState::new(Arc::new(coordinator));
    let app = server_http::build_app(app_state, &config);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("HTTP Server listening on http://{}", bind_addr);
    info!("Try: curl http://{}/health", bind_addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("TwinCache server shut down");
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
