//! Packages gateway plugin contract
//!
//! Shared between the gateway and every packaging plugin it loads:
//!
//! - **Wire types**: requests and responses of the packages and plugins APIs
//! - **Status**: per-request error model, passed through the gateway verbatim
//! - **`PackagesPlugin`**: the operations a backend implements
//! - **Declaration**: how a shared library registers its implementation

#![warn(missing_docs)]

pub mod declaration;
pub mod plugin;
pub mod status;
pub mod types;

pub use declaration::{
    CORE_VERSION, PLUGIN_API_VERSION, PLUGIN_DECLARATION_SYMBOL, PluginDeclaration,
    PluginRegistrar,
};
pub use plugin::{ConfigGetter, PackagesPlugin, RequestContext, RequestMetadata, RestConfig};
pub use status::{Code, Status};
pub use types::*;
