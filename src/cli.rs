//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

/// Packages Gateway - one packages API over every loaded packaging plugin
#[derive(Parser, Debug)]
#[command(name = "packages-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "PACKAGES_GATEWAY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PACKAGES_GATEWAY_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "PACKAGES_GATEWAY_HOST")]
    pub host: Option<String>,

    /// Directory scanned for plugin libraries (repeatable, scanned in order)
    #[arg(long = "plugin-dir", global = true)]
    pub plugin_dirs: Vec<PathBuf>,

    /// JSON file describing the clusters requests may target
    #[arg(long, env = "PACKAGES_GATEWAY_CLUSTERS_CONFIG_PATH", global = true)]
    pub clusters_config_path: Option<PathBuf>,

    /// Proxy used to exchange credentials for clusters with pinniped enabled
    #[arg(long, env = "PACKAGES_GATEWAY_PINNIPED_PROXY_URL", global = true)]
    pub pinniped_proxy_url: Option<String>,

    /// Serve every request with the hosting cluster's own credential (demo only)
    #[arg(long, global = true)]
    pub unsafe_use_demo_sa: bool,

    /// Use the local kubeconfig for the hosting cluster (development only)
    #[arg(long, global = true)]
    pub unsafe_local_dev_kubeconfig: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "PACKAGES_GATEWAY_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "PACKAGES_GATEWAY_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand (optional - defaults to server mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the gateway server (default)
    Serve,

    /// Load the plugins and print them in registry order
    Plugins,
}

impl Cli {
    /// Apply command-line overrides on top of file and environment config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref host) = self.host {
            config.server.host.clone_from(host);
        }
        if !self.plugin_dirs.is_empty() {
            config.plugin_dirs.clone_from(&self.plugin_dirs);
        }
        if let Some(ref path) = self.clusters_config_path {
            config.clusters_config_path = Some(path.clone());
        }
        if let Some(ref url) = self.pinniped_proxy_url {
            config.pinniped_proxy_url = Some(url.clone());
        }
        if self.unsafe_use_demo_sa {
            config.unsafe_use_demo_sa = true;
        }
        if self.unsafe_local_dev_kubeconfig {
            config.unsafe_local_dev_kubeconfig = true;
        }
    }
}
