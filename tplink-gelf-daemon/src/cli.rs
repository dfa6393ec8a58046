//! CLI argument definitions for the tplink-gelf daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use tplink_gelf_core::config::RelayConfig;

/// TP-Link syslog to GELF relay.
///
/// Receives syslog datagrams from TP-Link access points and Omada
/// controllers, classifies every line and forwards it to Graylog as GELF.
#[derive(Parser, Debug)]
#[command(name = "tplink-gelf")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to tplink-gelf.toml configuration file.
    ///
    /// When omitted, built-in defaults plus `TPLINK_GELF_*` environment
    /// variables are used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the syslog listen address (e.g. 0.0.0.0:514).
    #[arg(long)]
    pub bind: Option<String>,

    /// Override the Graylog GELF UDP host.
    #[arg(long)]
    pub output_host: Option<String>,

    /// Override the Graylog GELF UDP port.
    #[arg(long)]
    pub output_port: Option<u16>,

    /// Validate configuration and exit without starting the relay.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Apply command-line overrides on top of file and environment values.
    ///
    /// CLI flags take precedence over everything else.
    pub fn apply_overrides(&self, config: &mut RelayConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(bind) = &self.bind {
            config.listener.bind = bind.clone();
        }
        if let Some(host) = &self.output_host {
            config.output.host = host.clone();
        }
        if let Some(port) = self.output_port {
            config.output.port = port;
        }
    }
}
