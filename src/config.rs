use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use dotenvy::Error as DotenvError;
use thiserror::Error;

use crate::delay::HealthDelay;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_VERSION: &str = "1.0.1";
const DEFAULT_HOSTNAME: &str = "unknown_hostname";
const PORT_ENV: &str = "PORT";
const VERSION_ENV: &str = "VERSION";
const HOSTNAME_ENV: &str = "HOSTNAME";
const HEALTH_MIN_ENV: &str = "HEALTH_MIN";
const HEALTH_MAX_ENV: &str = "HEALTH_MAX";
const SLOW_ENV: &str = "SLOW";

/// Process-wide settings, resolved once before the listener is bound and never mutated.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub port: u16,
    pub version: String,
    pub hostname: String,
    pub health_delay: HealthDelay,
    pub startup_delay: Duration,
}

impl ServiceConfig {
    /// Loads configuration from `PORT`, `VERSION`, `HOSTNAME`, `HEALTH_MIN`, `HEALTH_MAX`
    /// and `SLOW`.
    ///
    /// Values from a local `.env` file (parsed via [`dotenvy::dotenv_override`]) override
    /// whatever is already set in the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_overrides()?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `PORT` and `SLOW` must be integers when present. Malformed `HEALTH_MIN`/`HEALTH_MAX`
    /// values are kept as [`HealthDelay::Invalid`] so that only `/health` fails.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(PORT_ENV) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let startup_delay = match lookup(SLOW_ENV) {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map(startup_delay_from_seconds)
                .map_err(|_| ConfigError::InvalidStartupDelay(value))?,
            None => Duration::ZERO,
        };

        let health_delay = HealthDelay::from_settings(
            lookup(HEALTH_MIN_ENV).as_deref(),
            lookup(HEALTH_MAX_ENV).as_deref(),
        );

        Ok(Self {
            port,
            version: lookup(VERSION_ENV).unwrap_or_else(|| DEFAULT_VERSION.to_owned()),
            hostname: lookup(HOSTNAME_ENV).unwrap_or_else(|| DEFAULT_HOSTNAME.to_owned()),
            health_delay,
            startup_delay,
        })
    }

    /// Returns a builder for programmatic overrides.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Address the listener binds to: every interface on the configured port.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }
}

impl Default for ServiceConfig {
    /// Port 8080, version `1.0.1`, no simulated delays.
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            version: DEFAULT_VERSION.to_owned(),
            hostname: DEFAULT_HOSTNAME.to_owned(),
            health_delay: HealthDelay::Disabled,
            startup_delay: Duration::ZERO,
        }
    }
}

/// Builder type for [`ServiceConfig`].
#[derive(Default, Clone, Debug)]
pub struct ServiceConfigBuilder {
    port: Option<u16>,
    version: Option<String>,
    hostname: Option<String>,
    health_delay: Option<HealthDelay>,
    startup_delay: Option<Duration>,
}

impl ServiceConfigBuilder {
    /// Sets the listening port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the version string echoed by most endpoints.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the hostname reported by `/` and `/info`.
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Sets the `/health` latency bounds in milliseconds.
    pub fn health_delay_millis(mut self, min: i64, max: i64) -> Self {
        self.health_delay = Some(HealthDelay::from_bounds(min, max));
        self
    }

    /// Sets the `/health` latency policy directly.
    pub fn health_delay(mut self, delay: HealthDelay) -> Self {
        self.health_delay = Some(delay);
        self
    }

    /// Sets how long to wait before binding the listener.
    pub fn startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = Some(delay);
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> ServiceConfig {
        let defaults = ServiceConfig::default();
        ServiceConfig {
            port: self.port.unwrap_or(defaults.port),
            version: self.version.unwrap_or(defaults.version),
            hostname: self.hostname.unwrap_or(defaults.hostname),
            health_delay: self.health_delay.unwrap_or(defaults.health_delay),
            startup_delay: self.startup_delay.unwrap_or(defaults.startup_delay),
        }
    }
}

/// Errors that can occur while building [`ServiceConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value: {0:?}")]
    InvalidPort(String),
    #[error("invalid SLOW value: {0:?}")]
    InvalidStartupDelay(String),
    #[error("failed to load .env overrides: {0}")]
    Dotenv(#[from] DotenvError),
}

fn load_env_overrides() -> Result<(), ConfigError> {
    match dotenvy::dotenv_override() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err)),
    }
}

fn startup_delay_from_seconds(seconds: i64) -> Duration {
    u64::try_from(seconds)
        .map(Duration::from_secs)
        .unwrap_or(Duration::ZERO)
}
