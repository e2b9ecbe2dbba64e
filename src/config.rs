//! Configuration management

use std::{path::Path, path::PathBuf, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration (the gateway's serve options)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Directories scanned for plugin libraries, in order
    pub plugin_dirs: Vec<PathBuf>,
    /// Path to the JSON clusters configuration
    pub clusters_config_path: Option<PathBuf>,
    /// Credential-exchange proxy used for clusters with pinniped enabled
    pub pinniped_proxy_url: Option<String>,
    /// Serve every request with the hosting cluster's own credential (demo only)
    pub unsafe_use_demo_sa: bool,
    /// Build the hosting cluster context from the local kubeconfig (development only)
    pub unsafe_local_dev_kubeconfig: bool,
    /// Hosting cluster endpoint and default credential
    pub hosting_cluster: HostingClusterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            plugin_dirs: vec![PathBuf::from(".")],
            clusters_config_path: None,
            pinniped_proxy_url: None,
            unsafe_use_demo_sa: false,
            unsafe_local_dev_kubeconfig: false,
            hosting_cluster: HostingClusterConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // PACKAGES_GATEWAY_SERVER__PORT=9000 → server.port
        figment = figment.merge(Env::prefixed("PACKAGES_GATEWAY_").split("__"));

        figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout; in-flight plugin calls are cancelled when it fires
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50051,
            request_timeout: Duration::from_secs(60),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Hosting cluster settings.
///
/// When `api_server_url` is unset the gateway uses the in-cluster service
/// environment (or the local kubeconfig with `unsafe_local_dev_kubeconfig`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostingClusterConfig {
    /// API server URL
    pub api_server_url: Option<String>,
    /// Default credential. Supports a literal value or `env:VAR_NAME`
    pub bearer_token: Option<String>,
    /// File holding the default credential
    pub bearer_token_file: Option<PathBuf>,
    /// PEM CA bundle for the API server
    pub ca_file: Option<PathBuf>,
    /// Skip TLS verification
    pub insecure: bool,
}

impl HostingClusterConfig {
    /// Resolve the default bearer token (expand `env:`, read the token file)
    ///
    /// # Errors
    ///
    /// Returns an error if the token file cannot be read.
    pub fn resolve_bearer_token(&self) -> Result<Option<String>> {
        if let Some(token) = &self.bearer_token {
            let resolved = match token.strip_prefix("env:") {
                Some(var_name) => std::env::var(var_name).unwrap_or_else(|_| token.clone()),
                None => token.clone(),
            };
            return Ok(Some(resolved));
        }
        match &self.bearer_token_file {
            Some(path) => {
                let token = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!(
                        "Failed to read bearer token file {}: {e}",
                        path.display()
                    ))
                })?;
                Ok(Some(token.trim().to_string()))
            }
            None => Ok(None),
        }
    }
}

/// Serde helpers for human-readable durations
pub mod humantime_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    /// Serialize Duration to human-readable string (e.g., "30s", "250ms")
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the serializer fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    /// Deserialize human-readable duration string (e.g., "30s", "5m", "100ms")
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the string cannot be parsed as a duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    fn parse(s: &str) -> Result<Duration, String> {
        let number = |n: &str| n.parse::<u64>().map_err(|e| format!("invalid duration {s:?}: {e}"));
        // "ms" must be checked before "s" and "m"
        if let Some(ms) = s.strip_suffix("ms") {
            number(ms).map(Duration::from_millis)
        } else if let Some(secs) = s.strip_suffix('s') {
            number(secs).map(Duration::from_secs)
        } else if let Some(mins) = s.strip_suffix('m') {
            number(mins)?
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| format!("duration {s:?} is out of range"))
        } else {
            number(s).map(Duration::from_secs)
        }
    }
}
