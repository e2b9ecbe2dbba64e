//! Gateway server

use std::net::SocketAddr;
use std::sync::Arc;

use packages_core::ConfigGetter;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use super::router::{AppState, create_router};
use crate::cluster::ClusterResolver;
use crate::config::Config;
use crate::packages::PackagesServer;
use crate::plugins::{PluginRegistry, PluginsServer};
use crate::{Error, Result};

/// Packages gateway server
pub struct Gateway {
    /// Configuration
    config: Config,
    /// Loaded plugins, fixed for the process lifetime
    registry: Arc<PluginRegistry>,
    /// Cluster resolver shared with every plugin
    resolver: Arc<ClusterResolver>,
}

impl Gateway {
    /// Create a new gateway: resolve clusters, then load every plugin.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster configuration is unusable or any
    /// plugin library fails to load.
    pub fn new(config: Config) -> Result<Self> {
        let resolver = Arc::new(ClusterResolver::from_config(&config)?);
        let config_getter: Arc<dyn ConfigGetter> = resolver.clone();
        let registry = Arc::new(PluginRegistry::load_all(&config.plugin_dirs, &config_getter)?);

        Ok(Self {
            config,
            registry,
            resolver,
        })
    }

    /// The loaded plugin registry
    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Router serving the plugins and packages APIs
    pub fn router(&self) -> axum::Router {
        let config_getter: Arc<dyn ConfigGetter> = self.resolver.clone();
        let state = Arc::new(AppState {
            packages: PackagesServer::new(Arc::clone(&self.registry), config_getter),
            plugins: PluginsServer::new(Arc::clone(&self.registry)),
        });
        create_router(state, self.config.server.request_timeout)
    }

    /// Run the gateway until a shutdown signal arrives
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let app = self.router();
        let listener = TcpListener::bind(addr).await?;

        info!("============================================================");
        info!("PACKAGES GATEWAY v{}", env!("CARGO_PKG_VERSION"));
        info!("============================================================");
        info!(host = %self.config.server.host, port = %self.config.server.port, "Listening");
        info!(plugins = self.registry.len(), "Plugins registered");
        for plugin in self.registry.plugins() {
            info!("  {plugin}");
        }
        if self.registry.is_empty() {
            warn!("No plugins loaded; list calls will return empty results");
        }
        info!(
            hosting_cluster = %self.resolver.clusters().hosting_cluster_name,
            clusters = self.resolver.clusters().clusters.len(),
            "Clusters configured"
        );

        let shutdown_timeout = self.config.server.shutdown_timeout;
        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        // Bound the drain of in-flight requests once shutdown begins
        tokio::select! {
            result = server.into_future() => result.map_err(|e| Error::Internal(e.to_string()))?,
            () = async {
                shutdown_signal().await;
                tokio::time::sleep(shutdown_timeout).await;
            } => {
                warn!(timeout = ?shutdown_timeout, "Graceful shutdown timed out");
            }
        }

        info!("Gateway stopped");
        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
