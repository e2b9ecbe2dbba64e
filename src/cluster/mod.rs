//! Per-request cluster and credential resolution
//!
//! Turns the caller's credential and a target cluster name into the
//! [`RestConfig`] a plugin uses to talk to that cluster.

mod clusters_config;
mod hosting;
mod token;

pub use clusters_config::{ClusterConfig, ClustersConfig, PinnipedConfig};
pub use hosting::{
    SERVICE_ACCOUNT_DIR, hosting_rest_config, in_cluster_rest_config, kubeconfig_rest_config,
};
pub use token::{AUTHORIZATION_KEY, extract_token};

use base64::Engine;
use packages_core::{ConfigGetter, RequestMetadata, RestConfig, Status};
use tracing::{debug, warn};

use crate::Result;
use crate::config::Config;

/// Header carrying the real API server URL through the pinniped proxy
pub const PINNIPED_PROXY_API_SERVER_URL: &str = "PINNIPED_PROXY_API_SERVER_URL";
/// Header carrying the real API server CA (base64) through the pinniped proxy
pub const PINNIPED_PROXY_API_SERVER_CERT: &str = "PINNIPED_PROXY_API_SERVER_CERT";

/// Resolves `(metadata, cluster)` to a cluster execution context.
///
/// Built once at startup and shared read-only by the gateway and every
/// plugin it loads.
#[derive(Debug, Clone)]
pub struct ClusterResolver {
    hosting: RestConfig,
    clusters: ClustersConfig,
    pinniped_proxy_url: Option<String>,
    unsafe_use_demo_sa: bool,
}

impl ClusterResolver {
    /// Create a resolver from already loaded parts
    #[must_use]
    pub fn new(hosting: RestConfig, clusters: ClustersConfig) -> Self {
        Self {
            hosting,
            clusters,
            pinniped_proxy_url: None,
            unsafe_use_demo_sa: false,
        }
    }

    /// Route clusters with pinniped enabled through this proxy
    #[must_use]
    pub fn with_pinniped_proxy(mut self, url: impl Into<String>) -> Self {
        self.pinniped_proxy_url = Some(url.into());
        self
    }

    /// Ignore inbound credentials and use the hosting cluster's own
    #[must_use]
    pub fn with_demo_service_account(mut self, enabled: bool) -> Self {
        self.unsafe_use_demo_sa = enabled;
        self
    }

    /// Build the resolver from the gateway configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the hosting cluster context or the clusters file
    /// cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let hosting = hosting_rest_config(config)?;
        let clusters = match &config.clusters_config_path {
            Some(path) => ClustersConfig::load(path)?,
            None => ClustersConfig::default(),
        };

        if config.unsafe_use_demo_sa {
            warn!("Serving every request with the hosting cluster's own credential (demo mode)");
        }

        let mut resolver =
            Self::new(hosting, clusters).with_demo_service_account(config.unsafe_use_demo_sa);
        if let Some(url) = &config.pinniped_proxy_url {
            resolver = resolver.with_pinniped_proxy(url.clone());
        }
        Ok(resolver)
    }

    /// The configured clusters
    #[must_use]
    pub fn clusters(&self) -> &ClustersConfig {
        &self.clusters
    }

    fn additional_cluster_config(
        &self,
        cluster: &str,
        token: Option<String>,
    ) -> std::result::Result<RestConfig, Status> {
        let Some(cluster_config) = self.clusters.get(cluster) else {
            return Err(Status::internal(format!(
                "unable to find cluster named {cluster:?}"
            )));
        };

        let mut rest = RestConfig {
            host: cluster_config.api_service_url.clone(),
            bearer_token: token,
            ca_data: cluster_config.certificate_authority_data_decoded.clone(),
            insecure: cluster_config.insecure,
            ..Default::default()
        };

        if cluster_config.pinniped_config.enable {
            if let Some(proxy) = &self.pinniped_proxy_url {
                rest.headers.insert(
                    PINNIPED_PROXY_API_SERVER_URL.to_string(),
                    cluster_config.api_service_url.clone(),
                );
                if let Some(ca) = &rest.ca_data {
                    rest.headers.insert(
                        PINNIPED_PROXY_API_SERVER_CERT.to_string(),
                        base64::engine::general_purpose::STANDARD.encode(ca),
                    );
                }
                rest.host.clone_from(proxy);
                // The proxy terminates TLS with the hosting cluster's CA
                rest.ca_data.clone_from(&self.hosting.ca_data);
                rest.insecure = self.hosting.insecure;
            }
        }

        Ok(rest)
    }
}

impl ConfigGetter for ClusterResolver {
    fn get(
        &self,
        metadata: &RequestMetadata,
        cluster: &str,
    ) -> std::result::Result<RestConfig, Status> {
        let token = extract_token(metadata).map_err(|e| e.to_status())?;

        if self.unsafe_use_demo_sa {
            return Ok(self.hosting.clone());
        }

        if self.clusters.is_hosting_cluster(cluster) {
            debug!(cluster, "Resolved hosting cluster");
            return Ok(RestConfig {
                bearer_token: token,
                ..self.hosting.clone()
            });
        }

        debug!(cluster, "Resolved additional cluster");
        self.additional_cluster_config(cluster, token)
    }
}
