//! Plugin discovery, loading, and the registry of loaded plugins

mod discovery;
mod loader;
mod registry;
mod server;

pub use discovery::{LIBRARY_EXTENSION, discover_plugin_libraries};
pub use loader::load_plugin;
pub use registry::{PluginBinding, PluginRegistry};
pub use server::PluginsServer;
