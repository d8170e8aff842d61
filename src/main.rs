use anyhow::{Context, Result};
use clap::Parser;
use querytag::{config::Config, gateway, Classifier};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "querytag=info";

/// Tag incoming text and assign it a priority over HTTP.
#[derive(Debug, Parser)]
#[command(name = "querytag", version, about)]
struct Cli {
    /// TOML config file (falls back to $QUERYTAG_CONFIG)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to bind (overrides config and environment)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config and environment)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    config.validate().context("invalid configuration")?;

    let classifier = Classifier::new().context("failed to compile classification rules")?;

    gateway::run_gateway(&config.gateway, classifier).await
}
