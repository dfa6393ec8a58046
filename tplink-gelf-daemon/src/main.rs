use anyhow::Result;
use clap::Parser;

use tplink_gelf_core::config::RelayConfig;
use tplink_gelf_daemon::cli::DaemonCli;
use tplink_gelf_daemon::logging;
use tplink_gelf_daemon::relay::Relay;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // defaults < file < environment < CLI
    let mut config = match &cli.config {
        Some(path) => RelayConfig::load(path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?,
        None => {
            let mut config = RelayConfig::default();
            config.apply_env_overrides();
            config
        }
    };
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tplink-gelf starting");

    let relay = Relay::build_from_config(config).await?;
    relay.run_until_signal().await?;

    tracing::info!("tplink-gelf shut down");
    Ok(())
}
