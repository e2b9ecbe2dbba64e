//! Error types for the packages gateway
//!
//! Per-request failures travel as [`packages_core::Status`]; this type covers
//! startup and process-level failures.

use std::io;
use std::path::PathBuf;

use packages_core::{PluginRef, Status};
use thiserror::Error;

/// Result type alias for the packages gateway
pub type Result<T> = std::result::Result<T, Error>;

/// Packages gateway errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Clusters configuration error
    #[error("Clusters configuration error: {0}")]
    ClustersConfig(String),

    /// A plugin library could not be loaded or registered
    #[error("Unable to load plugin {}: {reason}", path.display())]
    PluginLoad {
        /// Library path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Two loaded plugins declared the same identity
    #[error("Duplicate plugin registration: {0}")]
    DuplicatePlugin(PluginRef),

    /// The `authorization` metadata is not of the form `Bearer <token>`
    #[error("malformed authorization metadata")]
    MalformedAuthorization,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a plugin load error
    pub fn plugin_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::PluginLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Convert to a request status, for errors raised while serving a call
    #[must_use]
    pub fn to_status(&self) -> Status {
        match self {
            Self::MalformedAuthorization => {
                Status::unauthenticated(format!("invalid authorization metadata: {self}"))
            }
            _ => Status::internal(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packages_core::Code;

    #[test]
    fn test_malformed_authorization_maps_to_unauthenticated() {
        let status = Error::MalformedAuthorization.to_status();
        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(
            status.message(),
            "invalid authorization metadata: malformed authorization metadata"
        );
    }

    #[test]
    fn test_other_errors_map_to_internal() {
        let status = Error::Config("bad".to_string()).to_status();
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "Configuration error: bad");
    }

    #[test]
    fn test_plugin_load_display() {
        let err = Error::plugin_load("/plugins/helm.so", "missing symbol");
        assert_eq!(
            err.to_string(),
            "Unable to load plugin /plugins/helm.so: missing symbol"
        );
    }
}
