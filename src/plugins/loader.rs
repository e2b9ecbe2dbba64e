//! Loading plugin libraries
//!
//! Host and plugin share Rust trait objects across the library boundary, so a
//! plugin is only ABI-compatible when built with the same compiler and the same
//! `packages-core` version as the gateway. The declaration's version fields
//! catch the second; the first is a deployment requirement.

#![allow(unsafe_code)]

use std::path::Path;
use std::sync::Arc;

use libloading::Library;
use packages_core::{
    CORE_VERSION, ConfigGetter, PLUGIN_API_VERSION, PLUGIN_DECLARATION_SYMBOL, PackagesPlugin,
    PluginDeclaration, PluginRef, PluginRegistrar,
};
use tracing::{debug, info};

use super::registry::PluginBinding;
use crate::{Error, Result};

/// Collects what a plugin registers during its `register` call
pub(crate) struct Registrar {
    config_getter: Arc<dyn ConfigGetter>,
    registered: Vec<(PluginRef, Arc<dyn PackagesPlugin>)>,
}

impl Registrar {
    pub(crate) fn new(config_getter: Arc<dyn ConfigGetter>) -> Self {
        Self {
            config_getter,
            registered: Vec::new(),
        }
    }

    /// The single registration, or why there isn't exactly one
    pub(crate) fn into_single(
        self,
    ) -> std::result::Result<(PluginRef, Arc<dyn PackagesPlugin>), String> {
        let count = self.registered.len();
        let mut registered = self.registered.into_iter();
        match (registered.next(), count) {
            (Some(single), 1) => Ok(single),
            (None, _) => Err("plugin did not register an implementation".to_string()),
            (Some(_), n) => Err(format!(
                "plugin registered {n} implementations, expected exactly one"
            )),
        }
    }
}

impl PluginRegistrar for Registrar {
    fn register_packages_plugin(
        &mut self,
        plugin: PluginRef,
        implementation: Arc<dyn PackagesPlugin>,
    ) {
        debug!(plugin = %plugin, "Plugin registered implementation");
        self.registered.push((plugin, implementation));
    }

    fn config_getter(&self) -> Arc<dyn ConfigGetter> {
        Arc::clone(&self.config_getter)
    }
}

/// Check a declaration against this gateway's contract versions
pub(crate) fn check_declaration(declaration: &PluginDeclaration) -> std::result::Result<(), String> {
    if declaration.api_version != PLUGIN_API_VERSION {
        return Err(format!(
            "plugin api_version mismatch: plugin={}, host={PLUGIN_API_VERSION}",
            declaration.api_version
        ));
    }
    if declaration.core_version != CORE_VERSION {
        return Err(format!(
            "packages-core version mismatch: plugin={}, host={CORE_VERSION}",
            declaration.core_version
        ));
    }
    Ok(())
}

/// Run a declaration's registration and bind its single implementation
pub(crate) fn register_declaration(
    declaration: &PluginDeclaration,
    config_getter: Arc<dyn ConfigGetter>,
) -> std::result::Result<(PluginRef, Arc<dyn PackagesPlugin>), String> {
    check_declaration(declaration)?;
    let mut registrar = Registrar::new(config_getter);
    (declaration.register)(&mut registrar);
    registrar.into_single()
}

/// Load one plugin library and bind the implementation it registers
///
/// # Errors
///
/// Returns [`Error::PluginLoad`] if the library cannot be opened, lacks the
/// declaration symbol, was built against another contract version, or does
/// not register exactly one implementation.
pub fn load_plugin(path: &Path, config_getter: Arc<dyn ConfigGetter>) -> Result<PluginBinding> {
    // SAFETY: running a library's initializers is inherently unsafe; plugin
    // directories are trusted deployment inputs.
    let library = unsafe { Library::new(path) }
        .map_err(|e| Error::plugin_load(path, format!("failed to open library: {e}")))?;

    // SAFETY: the symbol is the `PluginDeclaration` static emitted by
    // `export_plugin!`; it is copied out while the library is loaded.
    let declaration: PluginDeclaration = unsafe {
        let symbol = library
            .get::<*const PluginDeclaration>(PLUGIN_DECLARATION_SYMBOL.as_bytes())
            .map_err(|e| {
                Error::plugin_load(
                    path,
                    format!("missing symbol {PLUGIN_DECLARATION_SYMBOL}: {e}"),
                )
            })?;
        (*symbol).read()
    };

    let (plugin, implementation) = register_declaration(&declaration, config_getter)
        .map_err(|reason| Error::plugin_load(path, reason))?;

    info!(plugin = %plugin, path = %path.display(), "Loaded plugin");
    Ok(PluginBinding::with_library(plugin, implementation, library))
}
