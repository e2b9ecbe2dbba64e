//! REST context of the cluster hosting the gateway

use std::path::{Path, PathBuf};

use base64::Engine;
use packages_core::RestConfig;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::{Error, Result};

/// Mount point of the pod's service account credentials
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Build the hosting cluster context.
///
/// Explicit `hosting_cluster` settings win; otherwise the local kubeconfig is
/// used when `unsafe_local_dev_kubeconfig` is set, and the in-cluster service
/// environment in every other case.
///
/// # Errors
///
/// Returns an error if none of the sources yields a usable context.
pub fn hosting_rest_config(config: &Config) -> Result<RestConfig> {
    let hosting = &config.hosting_cluster;

    if let Some(url) = &hosting.api_server_url {
        debug!(host = %url, "Using configured hosting cluster endpoint");
        let ca_data = hosting
            .ca_file
            .as_deref()
            .map(|path| read_file(path, "hosting cluster CA"))
            .transpose()?;
        return Ok(RestConfig {
            host: url.clone(),
            bearer_token: hosting.resolve_bearer_token()?,
            ca_data,
            insecure: hosting.insecure,
            ..Default::default()
        });
    }

    if config.unsafe_local_dev_kubeconfig {
        warn!("Using the local kubeconfig for the hosting cluster; do not use in production");
        let path = kubeconfig_path()
            .ok_or_else(|| Error::Config("Unable to locate a kubeconfig file".to_string()))?;
        return kubeconfig_rest_config(&path);
    }

    in_cluster_rest_config(|key| std::env::var(key).ok(), Path::new(SERVICE_ACCOUNT_DIR))
}

/// Context from the in-cluster service environment.
///
/// `env` looks up environment variables; `sa_dir` holds the `token` and
/// `ca.crt` files of the mounted service account.
///
/// # Errors
///
/// Returns an error outside a cluster or if the service account token is
/// unreadable.
pub fn in_cluster_rest_config(
    env: impl Fn(&str) -> Option<String>,
    sa_dir: &Path,
) -> Result<RestConfig> {
    let host = env("KUBERNETES_SERVICE_HOST").filter(|h| !h.is_empty());
    let port = env("KUBERNETES_SERVICE_PORT").filter(|p| !p.is_empty());
    let (Some(host), Some(port)) = (host, port) else {
        return Err(Error::Config(
            "unable to load in-cluster configuration, KUBERNETES_SERVICE_HOST and KUBERNETES_SERVICE_PORT must be defined".to_string(),
        ));
    };

    let host = if host.contains(':') {
        format!("https://[{host}]:{port}")
    } else {
        format!("https://{host}:{port}")
    };

    let token = read_file(&sa_dir.join("token"), "service account token")?;
    let token = String::from_utf8_lossy(&token).trim().to_string();
    let ca_data = std::fs::read(sa_dir.join("ca.crt")).ok();

    Ok(RestConfig {
        host,
        bearer_token: Some(token),
        ca_data,
        ..Default::default()
    })
}

/// First entry of `KUBECONFIG`, else `~/.kube/config`
fn kubeconfig_path() -> Option<PathBuf> {
    if let Some(paths) = std::env::var_os("KUBECONFIG") {
        if let Some(first) = std::env::split_paths(&paths).find(|p| !p.as_os_str().is_empty()) {
            return Some(first);
        }
    }
    dirs::home_dir().map(|home| home.join(".kube").join("config"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Kubeconfig {
    #[serde(default)]
    current_context: String,
    #[serde(default)]
    contexts: Vec<Named<KubeContext>>,
    #[serde(default)]
    clusters: Vec<Named<KubeCluster>>,
    #[serde(default)]
    users: Vec<Named<KubeUser>>,
}

#[derive(Debug, Deserialize)]
struct Named<T> {
    name: String,
    #[serde(alias = "context", alias = "cluster", alias = "user")]
    value: T,
}

#[derive(Debug, Deserialize)]
struct KubeContext {
    cluster: String,
    #[serde(default)]
    user: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct KubeCluster {
    server: String,
    #[serde(default)]
    certificate_authority_data: Option<String>,
    #[serde(default)]
    certificate_authority: Option<PathBuf>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct KubeUser {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    token_file: Option<PathBuf>,
}

fn find<'a, T>(entries: &'a [Named<T>], name: &str, kind: &str) -> Result<&'a T> {
    entries
        .iter()
        .find(|e| e.name == name)
        .map(|e| &e.value)
        .ok_or_else(|| Error::Config(format!("kubeconfig has no {kind} named {name:?}")))
}

/// Context for the current context of a kubeconfig file.
///
/// Only token credentials are carried over.
///
/// # Errors
///
/// Returns an error if the file is unreadable or its current context is
/// incomplete.
pub fn kubeconfig_rest_config(path: &Path) -> Result<RestConfig> {
    let content = read_file(path, "kubeconfig")?;
    let kubeconfig: Kubeconfig = serde_yaml::from_slice(&content)
        .map_err(|e| Error::Config(format!("Invalid kubeconfig {}: {e}", path.display())))?;

    let context = find(&kubeconfig.contexts, &kubeconfig.current_context, "context")?;
    let cluster = find(&kubeconfig.clusters, &context.cluster, "cluster")?;

    let ca_data = match (&cluster.certificate_authority_data, &cluster.certificate_authority) {
        (Some(data), _) => Some(
            base64::engine::general_purpose::STANDARD
                .decode(data.trim())
                .map_err(|e| {
                    Error::Config(format!("Invalid certificate-authority-data in kubeconfig: {e}"))
                })?,
        ),
        (None, Some(file)) => Some(read_file(file, "kubeconfig CA")?),
        (None, None) => None,
    };

    let bearer_token = if context.user.is_empty() {
        None
    } else {
        let user = find(&kubeconfig.users, &context.user, "user")?;
        match (&user.token, &user.token_file) {
            (Some(token), _) => Some(token.clone()),
            (None, Some(file)) => Some(
                String::from_utf8_lossy(&read_file(file, "kubeconfig token")?)
                    .trim()
                    .to_string(),
            ),
            (None, None) => None,
        }
    };

    Ok(RestConfig {
        host: cluster.server.clone(),
        bearer_token,
        ca_data,
        insecure: cluster.insecure_skip_tls_verify,
        ..Default::default()
    })
}

fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| Error::Config(format!("Failed to read {what} {}: {e}", path.display())))
}
