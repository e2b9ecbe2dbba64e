//! Clusters configuration file
//!
//! JSON array of cluster entries. The entry flagged `isKubeappsCluster`, or the
//! one without an `apiServiceURL`, is the cluster the gateway runs on.

use std::collections::HashMap;
use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One configured cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Cluster name, referenced by request contexts
    pub name: String,
    /// API server URL
    #[serde(rename = "apiServiceURL")]
    pub api_service_url: String,
    /// Base64-encoded PEM CA bundle
    pub certificate_authority_data: String,
    /// Decoded `certificate_authority_data`
    #[serde(skip)]
    pub certificate_authority_data_decoded: Option<Vec<u8>>,
    /// Service token for operations the gateway performs on its own behalf
    pub service_token: String,
    /// Skip TLS verification
    pub insecure: bool,
    /// Marks the cluster hosting the gateway
    pub is_kubeapps_cluster: bool,
    /// Credential exchange through the pinniped proxy
    pub pinniped_config: PinnipedConfig,
}

/// Pinniped credential-exchange settings for a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinnipedConfig {
    /// Route API calls through the pinniped proxy
    pub enable: bool,
}

/// All configured clusters, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClustersConfig {
    /// Name of the cluster hosting the gateway (may be empty)
    pub hosting_cluster_name: String,
    /// Clusters by name
    pub clusters: HashMap<String, ClusterConfig>,
}

impl ClustersConfig {
    /// Parse the JSON clusters file content
    ///
    /// # Errors
    ///
    /// Returns an error for invalid JSON, invalid base64 CA data, or more
    /// than one hosting cluster candidate.
    pub fn parse(content: &str) -> Result<Self> {
        let entries: Vec<ClusterConfig> = serde_json::from_str(content)
            .map_err(|e| Error::ClustersConfig(format!("unable to parse: {e}")))?;

        let mut config = Self::default();
        for mut cluster in entries {
            if cluster.api_service_url.is_empty() || cluster.is_kubeapps_cluster {
                if !config.hosting_cluster_name.is_empty() {
                    return Err(Error::ClustersConfig(format!(
                        "only one cluster can be configured using either 'isKubeappsCluster: true' or without an apiServiceURL to refer to the hosting cluster, two defined: {:?}, {:?}",
                        config.hosting_cluster_name, cluster.name
                    )));
                }
                config.hosting_cluster_name.clone_from(&cluster.name);
            }

            if !cluster.certificate_authority_data.is_empty() {
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(cluster.certificate_authority_data.trim())
                    .map_err(|e| {
                        Error::ClustersConfig(format!(
                            "invalid certificateAuthorityData for cluster {:?}: {e}",
                            cluster.name
                        ))
                    })?;
                cluster.certificate_authority_data_decoded = Some(decoded);
            }

            config.clusters.insert(cluster.name.clone(), cluster);
        }

        Ok(config)
    }

    /// Read and parse a clusters file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ClustersConfig(format!("unable to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Whether `cluster` names the hosting cluster (empty always does)
    #[must_use]
    pub fn is_hosting_cluster(&self, cluster: &str) -> bool {
        cluster.is_empty() || cluster == self.hosting_cluster_name
    }

    /// Look up a cluster by name
    #[must_use]
    pub fn get(&self, cluster: &str) -> Option<&ClusterConfig> {
        self.clusters.get(cluster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_hosting_and_additional_cluster() {
        let json = r#"[
            {"name": "default"},
            {
                "name": "other",
                "apiServiceURL": "https://other.example.com",
                "certificateAuthorityData": "Y2EtZGF0YQ==",
                "insecure": true,
                "pinnipedConfig": {"enable": true}
            }
        ]"#;
        let config = ClustersConfig::parse(json).unwrap();

        assert_eq!(config.hosting_cluster_name, "default");
        assert!(config.is_hosting_cluster(""));
        assert!(config.is_hosting_cluster("default"));
        assert!(!config.is_hosting_cluster("other"));

        let other = config.get("other").unwrap();
        assert_eq!(other.api_service_url, "https://other.example.com");
        assert_eq!(
            other.certificate_authority_data_decoded.as_deref(),
            Some(b"ca-data".as_slice())
        );
        assert!(other.insecure);
        assert!(other.pinniped_config.enable);
    }

    #[test]
    fn test_parse_explicit_hosting_flag_with_url() {
        let json = r#"[
            {"name": "main", "apiServiceURL": "https://main.example.com", "isKubeappsCluster": true},
            {"name": "other", "apiServiceURL": "https://other.example.com"}
        ]"#;
        let config = ClustersConfig::parse(json).unwrap();
        assert_eq!(config.hosting_cluster_name, "main");
    }

    #[test]
    fn test_parse_rejects_two_hosting_clusters() {
        let json = r#"[{"name": "a"}, {"name": "b"}]"#;
        let err = ClustersConfig::parse(json).unwrap_err();
        assert!(err.to_string().contains("only one cluster can be configured"));
    }

    #[test]
    fn test_parse_rejects_invalid_ca_data() {
        let json = r#"[{"name": "a", "apiServiceURL": "https://a", "certificateAuthorityData": "not base64!"}]"#;
        let err = ClustersConfig::parse(json).unwrap_err();
        assert!(err.to_string().contains("invalid certificateAuthorityData"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusters.json");
        std::fs::write(&path, r#"[{"name": "default"}]"#).unwrap();
        let config = ClustersConfig::load(&path).unwrap();
        assert_eq!(config.clusters.len(), 1);
    }
}
