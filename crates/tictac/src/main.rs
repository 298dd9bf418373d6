use anyhow::Context;
use clap::Parser;
use tictac::{ServerConfig, TictacServerBuilder, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let config = ServerConfig::parse();

    let server = TictacServerBuilder::from_config(&config)
        .build()
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    tracing::info!(
        addr = %server.local_addr()?,
        max_waiting_tables = config.max_waiting_tables,
        "tictac server listening"
    );

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}
