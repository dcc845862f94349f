use tracing_subscriber::EnvFilter;

mod config;
mod game;
mod matchmaking;
mod protocol;
mod registry;
mod runtime;
mod scheduler;
mod transport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::ServerConfig::from_env()?;
    runtime::run(config).await
}
