use clap::Parser;
use dhcpwatch::{Args, DhcpWatcher, WatcherConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    tracing::info!("Watching for DHCP requests on interface '{}'", args.interface);

    let config = WatcherConfig::new(args.interface);
    let mut handle = DhcpWatcher::start(config, |record| {
        println!("{record}");
    })?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    handle.cancel().await;

    Ok(())
}
