use anyhow::{self, Error as AnyhowError};
use db::DbErr;
use server::{Deployment, config::ServerConfig, http};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = ServerConfig::from_env();

    let env_filter = EnvFilter::try_new(config.log_filter())
        .map_err(|e| anyhow::anyhow!("Failed to create tracing filter: {e}"))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let deployment = Deployment::new(&config.database_url).await?;
    let app_router = http::router(deployment);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let actual_port = listener.local_addr()?.port();
    tracing::info!("Server running on http://{}:{actual_port}", config.host);

    axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!("Failed to install SIGINT handler: {e}");
                return std::future::pending::<()>().await;
            }
        };

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sig) => Some(sig),
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                None
            }
        };

        tokio::select! {
            _ = sigint.recv() => {},
            _ = async {
                if let Some(sigterm) = sigterm.as_mut() {
                    sigterm.recv().await;
                } else {
                    std::future::pending::<()>().await;
                }
            } => {},
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            return std::future::pending::<()>().await;
        }
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
