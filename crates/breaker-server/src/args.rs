//! CLI argument definitions using clap

use std::net::SocketAddr;
use std::path::PathBuf;

use breaker_bundle::{BaseConfiguration, TargetKind};
use clap::Parser;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "breaker_server.toml";

#[derive(Parser, Debug)]
#[command(name = "breaker-server")]
#[command(about = "Demo host serving the circuit-breaker metrics stream")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (TOML, YAML or JSON)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, env = "BREAKER_SERVER_CONFIG")]
    pub config: PathBuf,

    /// Admin listener address
    #[arg(long)]
    pub admin_address: Option<SocketAddr>,

    /// Application listener address
    #[arg(long)]
    pub application_address: Option<SocketAddr>,

    /// Serve the stream on the application context at this path
    #[arg(long, value_name = "PATH")]
    pub application_stream: Option<String>,

    /// Do not install the registry-backed metrics publisher
    #[arg(long)]
    pub no_metrics_publisher: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut BaseConfiguration) {
        if let Some(addr) = self.admin_address {
            config.server.admin_address = addr;
        }
        if let Some(addr) = self.application_address {
            config.server.application_address = addr;
        }
        if let Some(path) = &self.application_stream {
            config.breaker_stream.target = TargetKind::Application;
            config.breaker_stream.stream_path = Some(path.clone());
        }
        if self.no_metrics_publisher {
            config.breaker_stream.metrics_publisher_enabled = false;
        }
    }
}
