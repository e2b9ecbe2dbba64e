//! Packages Gateway - one packages API over dynamically loaded plugins

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use packages_gateway::{
    cli::{Cli, Command},
    config::Config,
    gateway::Gateway,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup tracing
    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            cli.apply_overrides(&mut config);
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Command::Plugins) => list_plugins(config),
        Some(Command::Serve) | None => run_server(config).await,
    }
}

/// Load the plugins and print them in registry order
fn list_plugins(config: Config) -> ExitCode {
    match Gateway::new(config) {
        Ok(gateway) => {
            for plugin in gateway.registry().plugins() {
                println!("{}\t{}", plugin.name, plugin.version);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to load plugins: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run the gateway server
async fn run_server(config: Config) -> ExitCode {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        plugin_dirs = ?config.plugin_dirs,
        "Starting Packages Gateway"
    );

    // A plugin that fails to load stops the process before it serves anything
    let gateway = match Gateway::new(config) {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to create gateway: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = gateway.run().await {
        error!("Gateway error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Gateway shutdown complete");
    ExitCode::SUCCESS
}
