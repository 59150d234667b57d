use std::fmt;
use std::time::Duration;

/// Terminates the running process on behalf of `/kill`.
pub trait ProcessExit: fmt::Debug + Send + Sync {
    fn exit(&self, code: i32);
}

/// Exits through [`std::process::exit`], skipping destructors and in-flight responses.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdProcessExit;

impl ProcessExit for StdProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code)
    }
}

/// Holds back startup to mimic a slow-booting workload.
pub async fn simulate_slow_startup(delay: Duration) {
    if delay.is_zero() {
        return;
    }

    tracing::info!(seconds = delay.as_secs(), "simulating slow startup");
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn slow_startup_waits_for_the_configured_time() {
        let start = Instant::now();
        simulate_slow_startup(Duration::from_secs(3)).await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_returns_immediately() {
        let start = Instant::now();
        simulate_slow_startup(Duration::ZERO).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
