use color_eyre::eyre::{eyre, Result, WrapErr};
use reel_review_config::{Config, PathManager};
use tokio::net::TcpListener;
use tracing::{info, warn};
use crate::http::{create_router, AppState};
use crate::output::Output;

pub async fn run_serve(
    mut config: Config,
    paths: PathManager,
    host: Option<String>,
    port: Option<u16>,
    in_memory: bool,
    output: &Output,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if in_memory {
        config.storage.persist = false;
    }

    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;

    if !config.is_tmdb_configured() {
        output.warn("TMDB_API_KEY is not set; movie endpoints will fail until it is configured");
    }

    if config.storage.persist {
        paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create data directories: {}", e))?;
    }

    let state = AppState::from_config(&config, &paths).map_err(|e| eyre!("{}", e))?;
    let app = create_router(state, &config.server);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", address))?;

    info!(operation = "server_start", address = %address, "Server listening");
    output.success(format!("Listening on http://{}", address));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    info!(operation = "server_stop", "Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM when running in a container
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
