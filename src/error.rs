use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::ConfigError;
use crate::context::RequestContextRejection;
use crate::delay::HealthDelayError;
use simplewebserver_secrets::ScanError;

pub type Result<T> = std::result::Result<T, SimpleWebServerError>;

#[derive(Debug, Error)]
pub enum SimpleWebServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can go wrong inside a handler.
///
/// Callers never see the cause: every variant renders as an empty `404 Not Found`, and the
/// underlying error is only logged at debug level.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    HealthDelay(#[from] HealthDelayError),
    #[error("secrets scan failed: {0}")]
    Secrets(#[from] ScanError),
    #[error("blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Context(#[from] RequestContextRejection),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "handler failed");
        StatusCode::NOT_FOUND.into_response()
    }
}
