use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::config::ServiceConfig;
use crate::context::RequestContext;
use crate::error::HandlerError;
use crate::lifecycle::{ProcessExit, StdProcessExit};
use simplewebserver_secrets::SECRET_ROOTS;

const ALL_IS_WELL: &str = "all is well";

/// Shared, read-only state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    config: Arc<ServiceConfig>,
    process: Arc<dyn ProcessExit>,
    secret_roots: Arc<[PathBuf]>,
}

impl AppState {
    /// State for a real deployment: `/kill` exits the process and `/secrets` scans the
    /// standard mount points.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
            process: Arc::new(StdProcessExit),
            secret_roots: SECRET_ROOTS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Replaces what `/kill` does.
    pub fn with_process_exit(mut self, process: impl ProcessExit + 'static) -> Self {
        self.process = Arc::new(process);
        self
    }

    /// Replaces the directories `/secrets` walks.
    pub fn with_secret_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.secret_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Builds the fixed path table served by the diagnostic server.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(endpoint))
        .route("/endpoint", get(endpoint))
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/env", get(env))
        .route("/kill", get(kill))
        .route("/secrets", get(secrets))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct EndpointResponse {
    version: String,
    host: String,
    result: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    healthy: bool,
}

#[derive(Debug, Serialize)]
struct InfoResponse {
    version: String,
    host: String,
    hostname: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct EnvResponse {
    version: String,
    env: String,
}

#[derive(Debug, Serialize)]
struct SecretsResponse {
    version: String,
    secrets: Vec<String>,
}

async fn endpoint(
    State(state): State<AppState>,
    context: RequestContext,
) -> Json<EndpointResponse> {
    context.log_invocation("/endpoint");
    Json(EndpointResponse {
        version: state.config.version.clone(),
        host: state.config.hostname.clone(),
        result: ALL_IS_WELL,
    })
}

async fn health(
    State(state): State<AppState>,
    context: RequestContext,
) -> Result<Json<HealthResponse>, HandlerError> {
    context.log_invocation("/health");
    state.config.health_delay.wait().await?;
    Ok(Json(HealthResponse { healthy: true }))
}

async fn info(State(state): State<AppState>, context: RequestContext) -> Json<InfoResponse> {
    context.log_invocation("/info");
    Json(InfoResponse {
        version: state.config.version.clone(),
        host: context.host().to_owned(),
        hostname: state.config.hostname.clone(),
        from: context.remote_ip().to_string(),
    })
}

async fn env(State(state): State<AppState>, context: RequestContext) -> Json<EnvResponse> {
    context.log_invocation("/env");
    Json(EnvResponse {
        version: state.config.version.clone(),
        env: render_environment(std::env::vars_os()),
    })
}

async fn kill(State(state): State<AppState>) -> StatusCode {
    tracing::info!("termination requested, doing (simulated) cleanup");
    state.process.exit(0);
    StatusCode::OK
}

async fn secrets(
    State(state): State<AppState>,
    context: RequestContext,
) -> Result<Json<SecretsResponse>, HandlerError> {
    context.log_invocation("/secrets");
    let roots = Arc::clone(&state.secret_roots);
    let secrets =
        tokio::task::spawn_blocking(move || simplewebserver_secrets::enumerate(&roots[..]))
            .await??;

    Ok(Json(SecretsResponse {
        version: state.config.version.clone(),
        secrets,
    }))
}

/// Renders every environment variable as one debug string, keys in sorted order.
///
/// This intentionally leaks the full environment; it is a debugging aid for checking what a
/// container was actually started with.
pub fn render_environment<I>(vars: I) -> String
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let vars: BTreeMap<String, String> = vars
        .into_iter()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect();
    format!("{vars:?}")
}
