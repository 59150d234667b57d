use std::time::Duration;

use rand::Rng;
use thiserror::Error;

/// Artificial latency applied to `/health` before it answers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HealthDelay {
    /// Answer immediately.
    #[default]
    Disabled,
    /// Sleep for a duration drawn uniformly from `[min_ms, max_ms)`.
    Uniform { min_ms: u64, max_ms: u64 },
    /// `HEALTH_MIN` or `HEALTH_MAX` could not be parsed; every health check fails.
    Invalid(String),
}

impl HealthDelay {
    /// Applies the bounds rule: a delay only exists when `max > min` and `min >= 0`.
    pub fn from_bounds(min_ms: i64, max_ms: i64) -> Self {
        if max_ms > min_ms && min_ms >= 0 {
            // both bounds are non-negative here
            Self::Uniform {
                min_ms: min_ms.unsigned_abs(),
                max_ms: max_ms.unsigned_abs(),
            }
        } else {
            Self::Disabled
        }
    }

    /// Interprets raw `HEALTH_MIN`/`HEALTH_MAX` values, treating absent ones as `0`.
    pub fn from_settings(min: Option<&str>, max: Option<&str>) -> Self {
        match (parse_millis("HEALTH_MIN", min), parse_millis("HEALTH_MAX", max)) {
            (Ok(min_ms), Ok(max_ms)) => Self::from_bounds(min_ms, max_ms),
            (Err(reason), _) | (_, Err(reason)) => Self::Invalid(reason),
        }
    }

    /// Picks the delay for a single request.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<Duration, HealthDelayError> {
        match self {
            Self::Disabled => Ok(Duration::ZERO),
            Self::Uniform { min_ms, max_ms } => {
                Ok(Duration::from_millis(rng.gen_range(*min_ms..*max_ms)))
            }
            Self::Invalid(reason) => Err(HealthDelayError::InvalidSetting(reason.clone())),
        }
    }

    /// Sleeps for a freshly sampled delay without blocking other requests.
    pub async fn wait(&self) -> Result<Duration, HealthDelayError> {
        let delay = self.sample(&mut rand::thread_rng())?;
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "delaying health response");
            tokio::time::sleep(delay).await;
        }
        Ok(delay)
    }
}

fn parse_millis(name: &str, raw: Option<&str>) -> Result<i64, String> {
    match raw {
        None => Ok(0),
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|err| format!("{name}={value:?}: {err}")),
    }
}

#[derive(Debug, Error)]
pub enum HealthDelayError {
    #[error("invalid health delay setting {0}")]
    InvalidSetting(String),
}
