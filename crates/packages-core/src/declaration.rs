//! Dynamic registration of plugins built as shared libraries
//!
//! A plugin library exports one static, [`PLUGIN_DECLARATION_SYMBOL`], of type
//! [`PluginDeclaration`]. The gateway checks the versions it carries, then
//! calls `register` with a [`PluginRegistrar`]; the plugin must register
//! exactly one implementation.
//!
//! ```ignore
//! use std::sync::Arc;
//! use packages_core::{PluginRef, PluginRegistrar, export_plugin};
//!
//! fn register(registrar: &mut dyn PluginRegistrar) {
//!     let config_getter = registrar.config_getter();
//!     registrar.register_packages_plugin(
//!         PluginRef::new("helm.packages", "v1alpha1"),
//!         Arc::new(HelmPlugin::new(config_getter)),
//!     );
//! }
//!
//! export_plugin!(register);
//! ```
//!
//! Host and plugins exchange Rust trait objects, so both must be built with
//! the same compiler and the same `packages-core` version.

use std::sync::Arc;

use crate::plugin::{ConfigGetter, PackagesPlugin};
use crate::types::PluginRef;

/// Name of the exported declaration static
pub const PLUGIN_DECLARATION_SYMBOL: &str = "PACKAGES_PLUGIN_DECLARATION";

/// Bumped on any breaking change to the plugin contract
pub const PLUGIN_API_VERSION: u32 = 1;

/// Version of this crate, compared against the host's at load time
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Host side of plugin registration
pub trait PluginRegistrar {
    /// Register the plugin's implementation under its identity
    fn register_packages_plugin(&mut self, plugin: PluginRef, implementation: Arc<dyn PackagesPlugin>);

    /// Cluster resolver the plugin may keep for its own lookups
    fn config_getter(&self) -> Arc<dyn ConfigGetter>;
}

/// Static exported by every plugin library
#[derive(Clone, Copy)]
pub struct PluginDeclaration {
    /// [`PLUGIN_API_VERSION`] the plugin was built against
    pub api_version: u32,
    /// [`CORE_VERSION`] the plugin was built against
    pub core_version: &'static str,
    /// Registration entrypoint
    pub register: fn(&mut dyn PluginRegistrar),
}

/// Export a plugin declaration from a `cdylib`
#[macro_export]
macro_rules! export_plugin {
    ($register:expr) => {
        #[doc(hidden)]
        #[unsafe(no_mangle)]
        pub static PACKAGES_PLUGIN_DECLARATION: $crate::PluginDeclaration =
            $crate::PluginDeclaration {
                api_version: $crate::PLUGIN_API_VERSION,
                core_version: $crate::CORE_VERSION,
                register: $register,
            };
    };
}
