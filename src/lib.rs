//! Simple diagnostic web service.
//!
//! A handful of GET endpoints that report the version, hostname, caller, environment and
//! mounted secrets of the container they run in, plus knobs for slow startup, slow health
//! checks and an on-demand crash. Useful for exercising orchestrator probes and restart
//! policies.

pub mod config;
pub mod context;
pub mod delay;
pub mod error;
pub mod lifecycle;
pub mod routes;
pub mod runtime;

pub use crate::config::{ConfigError, ServiceConfig, ServiceConfigBuilder};
pub use crate::context::{RequestContext, RequestContextRejection};
pub use crate::delay::{HealthDelay, HealthDelayError};
pub use crate::error::{HandlerError, Result, SimpleWebServerError};
pub use crate::lifecycle::{ProcessExit, StdProcessExit};
pub use crate::routes::{AppState, render_environment, router};
pub use crate::runtime::{DiagnosticServer, run, serve};
pub use simplewebserver_secrets::{SECRET_ROOTS, ScanError};
