//! Cluster resolver integration tests

use packages_core::{Code, ConfigGetter, RequestMetadata};
use packages_gateway::cluster::ClusterResolver;
use packages_gateway::config::{Config, HostingClusterConfig};
use pretty_assertions::assert_eq;

fn config_with_clusters(clusters_json: &str) -> (tempfile::TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clusters.json");
    std::fs::write(&path, clusters_json).unwrap();

    let config = Config {
        clusters_config_path: Some(path),
        hosting_cluster: HostingClusterConfig {
            api_server_url: Some("https://kubernetes.default".to_string()),
            bearer_token: Some("hosting-sa".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    (dir, config)
}

#[test]
fn resolver_from_config_files() {
    let (_dir, config) = config_with_clusters(
        r#"[
            {"name": "default"},
            {"name": "other", "apiServiceURL": "https://other.example.com", "insecure": true}
        ]"#,
    );
    let resolver = ClusterResolver::from_config(&config).unwrap();
    let metadata = RequestMetadata::new().with("authorization", "Bearer abc");

    let hosting = resolver.get(&metadata, "default").unwrap();
    assert_eq!(hosting.host, "https://kubernetes.default");
    assert_eq!(hosting.bearer_token.as_deref(), Some("abc"));

    let other = resolver.get(&metadata, "other").unwrap();
    assert_eq!(other.host, "https://other.example.com");
    assert!(other.insecure);

    let status = resolver.get(&metadata, "unknown").unwrap_err();
    assert_eq!(status.code(), Code::Internal);
}

#[test]
fn demo_service_account_from_config() {
    let (_dir, mut config) = config_with_clusters(r#"[{"name": "default"}]"#);
    config.unsafe_use_demo_sa = true;

    let resolver = ClusterResolver::from_config(&config).unwrap();
    let rest = resolver
        .get(&RequestMetadata::new().with("authorization", "Bearer abc"), "")
        .unwrap();

    assert_eq!(rest.bearer_token.as_deref(), Some("hosting-sa"));
}

#[test]
fn invalid_clusters_file_fails_startup() {
    let (_dir, config) = config_with_clusters(r#"[{"name": "a"}, {"name": "b"}]"#);

    let err = ClusterResolver::from_config(&config).unwrap_err();

    assert!(err.to_string().contains("Clusters configuration error"));
}

#[test]
fn missing_clusters_file_fails_startup() {
    let config = Config {
        clusters_config_path: Some("/nonexistent/clusters.json".into()),
        hosting_cluster: HostingClusterConfig {
            api_server_url: Some("https://kubernetes.default".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    assert!(ClusterResolver::from_config(&config).is_err());
}
