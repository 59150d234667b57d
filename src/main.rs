use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "debug";

#[tokio::main]
async fn main() -> simplewebserver::Result<()> {
    let log_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());

    tracing_subscriber::registry()
        .with(EnvFilter::new(&log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    simplewebserver::run().await
}
