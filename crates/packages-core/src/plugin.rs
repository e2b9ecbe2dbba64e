//! The contract every packages plugin implements

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::Status;
use crate::types::{
    CreateInstalledPackageRequest, CreateInstalledPackageResponse, DeleteInstalledPackageRequest,
    DeleteInstalledPackageResponse, GetAvailablePackageDetailRequest,
    GetAvailablePackageDetailResponse, GetAvailablePackageSummariesRequest,
    GetAvailablePackageSummariesResponse, GetAvailablePackageVersionsRequest,
    GetAvailablePackageVersionsResponse, GetInstalledPackageDetailRequest,
    GetInstalledPackageDetailResponse, GetInstalledPackageSummariesRequest,
    GetInstalledPackageSummariesResponse, UpdateInstalledPackageRequest,
    UpdateInstalledPackageResponse,
};

/// Inbound request metadata (header name → value).
///
/// Keys are stored lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    entries: BTreeMap<String, String>,
}

impl RequestMetadata {
    /// Empty metadata
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any previous value for the same key
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Look up an entry
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RequestMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Self::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}

/// Execution context for one cluster: where its API lives and how to
/// authenticate against it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestConfig {
    /// API server URL
    pub host: String,
    /// Bearer token presented to the API server, if any
    pub bearer_token: Option<String>,
    /// PEM-encoded CA bundle for the API server
    pub ca_data: Option<Vec<u8>>,
    /// Skip TLS verification
    pub insecure: bool,
    /// Extra headers sent with every API call (used for credential-exchange proxies)
    pub headers: BTreeMap<String, String>,
}

/// Everything a plugin receives alongside a request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Inbound metadata, forwarded untouched
    pub metadata: RequestMetadata,
    /// Cluster context resolved by the gateway for the request's target
    pub rest_config: RestConfig,
}

/// Resolves a target cluster to an execution context for the caller
/// identified by the request metadata.
pub trait ConfigGetter: Send + Sync {
    /// Build the execution context for `cluster` (empty = hosting cluster).
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for malformed credentials, `Internal` for an
    /// unknown cluster.
    fn get(&self, metadata: &RequestMetadata, cluster: &str) -> Result<RestConfig, Status>;
}

/// A packaging backend.
///
/// Implementations must be `Send + Sync` so one instance can serve
/// concurrent requests. Every method returns either its response or a
/// [`Status`] that the gateway surfaces to the caller verbatim.
#[async_trait]
pub trait PackagesPlugin: Send + Sync {
    /// List packages available for installation
    async fn get_available_package_summaries(
        &self,
        ctx: &RequestContext,
        request: GetAvailablePackageSummariesRequest,
    ) -> Result<GetAvailablePackageSummariesResponse, Status>;

    /// Detail of a single available package
    async fn get_available_package_detail(
        &self,
        ctx: &RequestContext,
        request: GetAvailablePackageDetailRequest,
    ) -> Result<GetAvailablePackageDetailResponse, Status>;

    /// Version history of an available package
    async fn get_available_package_versions(
        &self,
        ctx: &RequestContext,
        request: GetAvailablePackageVersionsRequest,
    ) -> Result<GetAvailablePackageVersionsResponse, Status>;

    /// List installed packages
    async fn get_installed_package_summaries(
        &self,
        ctx: &RequestContext,
        request: GetInstalledPackageSummariesRequest,
    ) -> Result<GetInstalledPackageSummariesResponse, Status>;

    /// Detail of a single installed package
    async fn get_installed_package_detail(
        &self,
        ctx: &RequestContext,
        request: GetInstalledPackageDetailRequest,
    ) -> Result<GetInstalledPackageDetailResponse, Status>;

    /// Install a package
    async fn create_installed_package(
        &self,
        ctx: &RequestContext,
        request: CreateInstalledPackageRequest,
    ) -> Result<CreateInstalledPackageResponse, Status>;

    /// Update an installed package
    async fn update_installed_package(
        &self,
        ctx: &RequestContext,
        request: UpdateInstalledPackageRequest,
    ) -> Result<UpdateInstalledPackageResponse, Status>;

    /// Uninstall a package
    async fn delete_installed_package(
        &self,
        ctx: &RequestContext,
        request: DeleteInstalledPackageRequest,
    ) -> Result<DeleteInstalledPackageResponse, Status>;
}
