//! Server setup and lifecycle management

use tokio::net::TcpListener;

use crate::api::{create_router, AppState};
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};

/// Sentinel HTTP/WebSocket server
pub struct Server {
    config: ServiceConfig,
    state: AppState,
}

impl Server {
    /// Create a server with production collaborators
    pub fn new(config: ServiceConfig) -> ServiceResult<Self> {
        let state = AppState::bootstrap(&config)?;
        Ok(Self { config, state })
    }

    /// Create a server over pre-built state
    pub fn with_state(config: ServiceConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Run until a shutdown signal arrives
    pub async fn run(self) -> ServiceResult<()> {
        let addr = self.config.server.listen_addr;
        let app = create_router(self.state, &self.config.server);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Sentinel listening on {}", addr);
        tracing::info!(
            "Default network: {}",
            self.config.networks.default_network
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServiceError::Server(e.to_string()))?;

        tracing::info!("Sentinel shutting down");
        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM. Open monitor sockets are torn down as
/// their connections close.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("sentineld: failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("sentineld: failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    tracing::info!(signal, "sentineld draining connections before exit");
}
