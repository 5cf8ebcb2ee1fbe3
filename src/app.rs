//! Application wiring and the server lifecycle.

use anyhow::Context;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;
use crate::web::create_router;

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let app_state = AppState::new(&config).context("Failed to build application state")?;

        if app_state.store.is_none() {
            info!("Document store not configured; running scrape-only");
        }
        if app_state.push.is_none() {
            info!("VAPID keys not configured; push delivery disabled");
        }

        Ok(Self { config, app_state })
    }

    /// Serve until interrupted. In-flight requests get to finish on shutdown.
    pub async fn run(self) -> anyhow::Result<()> {
        let router = create_router(self.app_state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        info!(port = self.config.port, "Web server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        info!("Shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
