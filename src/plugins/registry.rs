//! The plugin registry
//!
//! Built once at startup, sorted by `(name, version)`, and read-only after
//! that. The same order drives discovery responses and fan-out.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use libloading::Library;
use packages_core::{ConfigGetter, PackagesPlugin, PluginRef};
use tracing::info;

use super::discovery::discover_plugin_libraries;
use super::loader::load_plugin;
use crate::{Error, Result};

/// A plugin implementation bound to its declared identity
pub struct PluginBinding {
    plugin: PluginRef,
    // Dropped before `library`, whose code backs its vtable
    implementation: Arc<dyn PackagesPlugin>,
    library: Option<Library>,
}

impl PluginBinding {
    /// Bind an in-process implementation
    pub fn new(plugin: PluginRef, implementation: Arc<dyn PackagesPlugin>) -> Self {
        Self {
            plugin,
            implementation,
            library: None,
        }
    }

    pub(crate) fn with_library(
        plugin: PluginRef,
        implementation: Arc<dyn PackagesPlugin>,
        library: Library,
    ) -> Self {
        Self {
            plugin,
            implementation,
            library: Some(library),
        }
    }

    /// Declared identity
    #[must_use]
    pub fn plugin(&self) -> &PluginRef {
        &self.plugin
    }

    /// The implementation serving this identity
    #[must_use]
    pub fn implementation(&self) -> &dyn PackagesPlugin {
        self.implementation.as_ref()
    }
}

impl fmt::Debug for PluginBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginBinding")
            .field("plugin", &self.plugin)
            .field("dynamic", &self.library.is_some())
            .finish_non_exhaustive()
    }
}

/// Sorted, immutable set of plugin bindings
#[derive(Debug, Default)]
pub struct PluginRegistry {
    bindings: Vec<PluginBinding>,
}

impl PluginRegistry {
    /// Build a registry, sorting bindings by `(name, version)` byte-wise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicatePlugin`] if two bindings share an identity.
    pub fn new(mut bindings: Vec<PluginBinding>) -> Result<Self> {
        bindings.sort_by(|a, b| a.plugin.cmp(&b.plugin));
        if let Some(pair) = bindings.windows(2).find(|w| w[0].plugin == w[1].plugin) {
            return Err(Error::DuplicatePlugin(pair[0].plugin.clone()));
        }
        Ok(Self { bindings })
    }

    /// Discover and load every plugin library in `dirs`.
    ///
    /// Any library that fails to load fails the whole registry; the gateway
    /// never serves with a partial set.
    ///
    /// # Errors
    ///
    /// Returns the first discovery, load, or duplicate-identity error.
    pub fn load_all<P: AsRef<Path>>(
        dirs: &[P],
        config_getter: &Arc<dyn ConfigGetter>,
    ) -> Result<Self> {
        let libraries = discover_plugin_libraries(dirs)?;
        let bindings = libraries
            .iter()
            .map(|path| load_plugin(path, Arc::clone(config_getter)))
            .collect::<Result<Vec<_>>>()?;

        let registry = Self::new(bindings)?;
        info!(count = registry.len(), "Plugin registry loaded");
        Ok(registry)
    }

    /// Exact `(name, version)` lookup
    #[must_use]
    pub fn lookup(&self, plugin: &PluginRef) -> Option<&PluginBinding> {
        self.bindings
            .binary_search_by(|b| b.plugin.cmp(plugin))
            .ok()
            .map(|i| &self.bindings[i])
    }

    /// Bindings in registry order
    #[must_use]
    pub fn bindings(&self) -> &[PluginBinding] {
        &self.bindings
    }

    /// Identities in registry order
    #[must_use]
    pub fn plugins(&self) -> Vec<PluginRef> {
        self.bindings.iter().map(|b| b.plugin.clone()).collect()
    }

    /// Number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no plugins are loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
