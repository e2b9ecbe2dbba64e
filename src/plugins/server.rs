//! Plugins discovery API

use std::sync::Arc;

use packages_core::{GetConfiguredPluginsRequest, GetConfiguredPluginsResponse, Status};

use super::PluginRegistry;

/// Serves the list of configured plugins
#[derive(Debug, Clone)]
pub struct PluginsServer {
    registry: Arc<PluginRegistry>,
}

impl PluginsServer {
    /// Create a server over a loaded registry
    #[must_use]
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Every loaded plugin in registry order
    ///
    /// # Errors
    ///
    /// Never fails; returns `Result` to match the other API operations.
    pub fn get_configured_plugins(
        &self,
        _request: GetConfiguredPluginsRequest,
    ) -> Result<GetConfiguredPluginsResponse, Status> {
        Ok(GetConfiguredPluginsResponse {
            plugins: self.registry.plugins(),
        })
    }
}
