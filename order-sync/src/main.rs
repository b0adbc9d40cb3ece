use anyhow::Result;
use clap::Parser;
use order_sync::{Args, SyncConfig, SyncPipeline};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let pipeline = SyncPipeline::from_config(SyncConfig::from(args))?;

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping before the next submission");
            ctrl_c_token.cancel();
        }
    });

    info!("Starting order sync");
    let report = pipeline.run(&cancel).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
