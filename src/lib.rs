//! Packages Gateway Library
//!
//! One packages API in front of any number of packaging plugins, each loaded
//! from a shared library at startup.
//!
//! # Features
//!
//! - **Plugin registry**: libraries discovered in configured directories, sorted by `(name, version)`
//! - **Fan-out**: list calls query every plugin concurrently, then merge, sort, and paginate
//! - **Dispatch**: detail, install, update, and delete calls go to the plugin named in the request
//! - **Clusters**: per-request resolution of the caller's credential and target cluster
//!
//! Plugins implement [`packages_core::PackagesPlugin`] and export a
//! declaration with [`packages_core::export_plugin!`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod gateway;
pub mod packages;
pub mod plugins;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| Error::Internal(e.to_string())),
        _ => subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| Error::Internal(e.to_string())),
    }
}
