use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::error::{Result, SimpleWebServerError};
use crate::lifecycle;
use crate::routes::{AppState, router};

/// The diagnostic HTTP server: the path table plus the listener lifecycle around it.
pub struct DiagnosticServer {
    state: AppState,
}

impl DiagnosticServer {
    /// Creates a server that behaves like a real deployment.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_state(AppState::new(config))
    }

    /// Creates a server around pre-built handler state.
    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }

    /// Waits out the simulated startup delay, binds `0.0.0.0:<port>` and serves until a
    /// shutdown signal arrives.
    ///
    /// A port that is already taken is reported as [`SimpleWebServerError::Bind`]; there is no
    /// retry.
    pub async fn serve(self) -> Result<()> {
        let config = self.state.config();
        lifecycle::simulate_slow_startup(config.startup_delay).await;

        let addr = config.bind_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| SimpleWebServerError::Bind { addr, source })?;
        tracing::info!(
            version = %config.version,
            port = config.port,
            "simple service (version v{}) listening in port {}",
            config.version,
            config.port
        );

        let service = router(self.state).into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, service)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("simple service stopped");
        Ok(())
    }
}

/// Serves the diagnostic routes with the provided configuration.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    DiagnosticServer::new(config).serve().await
}

/// Loads [`ServiceConfig`] from the environment and starts serving.
pub async fn run() -> Result<()> {
    let config = ServiceConfig::from_env()?;
    serve(config).await
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("shutdown signal received");
}
