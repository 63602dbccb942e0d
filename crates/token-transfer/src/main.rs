use anyhow::{Context, Result};
use clap::Parser;
use eth_rpc::RpcClient;
use token_transfer::cli::{Cli, LogLevel};
use token_transfer::{run_transfer, TransferConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let settings = TransferConfig::load(cli.config.as_deref())?
        .merge_cli(&cli)
        .resolve()
        .context("invalid transfer settings")?;
    debug!(?settings, "resolved settings");

    let rpc = RpcClient::builder(cli.provider_endpoint_uri.as_str())
        .timeout(settings.timeout)
        .build()
        .context("invalid provider endpoint")?;

    let mut stdout = std::io::stdout().lock();
    run_transfer(&rpc, &cli.private_key, &settings, &mut stdout).await?;
    Ok(())
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(level: LogLevel) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directives()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
