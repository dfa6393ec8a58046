//! Relay assembly and lifecycle.
//!
//! The [`Relay`] wires the three forwarder pieces together:
//!
//! ```text
//! SyslogUdpCollector (listener.bind) -> ForwardingPipeline -> UdpGelfSink (output.host:port)
//! ```
//!
//! Startup failures (bad config, unresolvable output host, listener bind
//! error) are fatal. After startup the relay runs until SIGTERM or SIGINT.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use tplink_gelf_core::config::RelayConfig;
use tplink_gelf_forwarder::{
    ForwarderConfig, ForwardingPipeline, SyslogUdpCollector, UdpGelfSink,
};

use crate::metrics_server;

/// A fully assembled relay, bound and ready to run.
pub struct Relay {
    collector: SyslogUdpCollector,
    pipeline: ForwardingPipeline<UdpGelfSink>,
    /// Cancels the receive loop.
    shutdown: CancellationToken,
}

impl Relay {
    /// Load configuration from `config_path` and build the relay.
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = RelayConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config).await
    }

    /// Build from an already-loaded configuration.
    ///
    /// Installs the metrics recorder when enabled, connects the GELF sink
    /// and binds the syslog listener.
    pub async fn build_from_config(config: RelayConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        let forwarder_config = ForwarderConfig::from_core(&config);

        let sink = UdpGelfSink::connect(&forwarder_config)
            .await
            .map_err(|e| anyhow::anyhow!("failed to set up GELF output: {}", e))?;
        let pipeline = ForwardingPipeline::from_config(&forwarder_config, sink)
            .map_err(|e| anyhow::anyhow!("failed to build forwarding pipeline: {}", e))?;

        let shutdown = CancellationToken::new();
        let collector = SyslogUdpCollector::bind(&forwarder_config, shutdown.clone())
            .await
            .map_err(|e| anyhow::anyhow!("failed to start syslog listener: {}", e))?;

        tracing::info!(
            bind = %forwarder_config.bind,
            output = %forwarder_config.output_endpoint(),
            compress = forwarder_config.compress,
            "relay assembled"
        );

        Ok(Self {
            collector,
            pipeline,
            shutdown,
        })
    }

    /// Address the syslog listener is actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.collector.local_addr()?)
    }

    /// Token that stops the receive loop when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until the shutdown token is cancelled.
    ///
    /// The datagram being processed when cancellation arrives is finished first.
    pub async fn run(self) -> Result<()> {
        tracing::info!("entering receive loop");
        self.collector.run(&self.pipeline).await?;
        tracing::info!("receive loop stopped");
        Ok(())
    }

    /// Run until SIGTERM or SIGINT.
    pub async fn run_until_signal(self) -> Result<()> {
        let token = self.shutdown_token();
        let watcher = tokio::spawn(async move {
            let result = wait_for_shutdown_signal().await;
            match &result {
                Ok(signal) => tracing::info!(signal = *signal, "shutdown signal received"),
                Err(e) => tracing::error!(error = %e, "signal handling failed, shutting down"),
            }
            token.cancel();
            result
        });

        self.run().await?;

        if watcher.is_finished() {
            watcher.await??;
        } else {
            watcher.abort();
        }
        Ok(())
    }
}

/// Wait for SIGTERM or SIGINT.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}
