//! Wire types for the packages and plugins APIs
//!
//! Field names serialize in camelCase, matching the JSON mapping of the
//! RPC messages these types stand in for. Every message derives `Default` and
//! tolerates missing fields.

use serde::{Deserialize, Serialize};

/// Identity of a backend plugin.
///
/// The derived ordering compares `name` then `version`, byte-wise. It is the
/// canonical registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginRef {
    /// Plugin name, e.g. `fluxv2.packages`
    pub name: String,
    /// Plugin API version, e.g. `v1alpha1`
    pub version: String,
}

impl PluginRef {
    /// Create a plugin reference
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for PluginRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Where a package lives or will be installed.
///
/// An empty `cluster` denotes the cluster hosting the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    /// Cluster name
    pub cluster: String,
    /// Namespace
    pub namespace: String,
}

impl Context {
    /// Create a context
    pub fn new(cluster: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            namespace: namespace.into(),
        }
    }
}

/// Reference to an available (installable) package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AvailablePackageReference {
    /// Where the package is available
    pub context: Option<Context>,
    /// Plugin-specific identifier
    pub identifier: String,
    /// Plugin owning the package
    pub plugin: Option<PluginRef>,
}

/// Reference to an installed package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstalledPackageReference {
    /// Where the package is installed
    pub context: Option<Context>,
    /// Plugin-specific identifier
    pub identifier: String,
    /// Plugin owning the installation
    pub plugin: Option<PluginRef>,
}

/// Pagination request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationOptions {
    /// Decimal offset into the merged result set; empty means 0
    pub page_token: String,
    /// Page size; 0 disables pagination
    pub page_size: u32,
}

/// Filters applied by plugins when listing available packages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    /// Free-text query
    pub query: String,
    /// Only packages in one of these categories
    pub categories: Vec<String>,
    /// Only packages from one of these repositories
    pub repositories: Vec<String>,
    /// Package version constraint
    pub pkg_version: String,
    /// App version constraint
    pub app_version: String,
}

/// Package version paired with the version of the software it ships
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageAppVersion {
    /// Package version
    pub pkg_version: String,
    /// Application version
    pub app_version: String,
}

/// Version selector for installs and updates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionReference {
    /// Version or version constraint
    pub version: String,
}

/// Package maintainer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Maintainer {
    /// Name
    pub name: String,
    /// Email
    pub email: String,
}

/// Reconciliation settings for packaging technologies with a controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconciliationOptions {
    /// Reconciliation interval in seconds
    pub interval: i32,
    /// Suspend reconciliation
    pub suspend: bool,
    /// Service account used by the controller
    pub service_account_name: String,
}

/// Why an installed package is (not) ready
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusReason {
    /// Not reported
    #[default]
    Unspecified,
    /// Installed and healthy
    Installed,
    /// Uninstalled
    Uninstalled,
    /// Install or upgrade failed
    Failed,
    /// Install or upgrade in progress
    Pending,
}

/// Status of an installed package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstalledPackageStatus {
    /// Whether the package is ready
    pub ready: bool,
    /// Machine-readable reason
    pub reason: StatusReason,
    /// Human-readable reason
    pub user_reason: String,
}

/// Summary of an available package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AvailablePackageSummary {
    /// Where the package comes from and which plugin serves it
    pub available_package_ref: Option<AvailablePackageReference>,
    /// Package name
    pub name: String,
    /// Newest package and app version
    pub latest_version: Option<PackageAppVersion>,
    /// Icon URL
    pub icon_url: String,
    /// Name shown to users
    pub display_name: String,
    /// One-line description
    pub short_description: String,
    /// Categories the package is listed under
    pub categories: Vec<String>,
}

/// Full detail of an available package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AvailablePackageDetail {
    /// Where the package comes from and which plugin serves it
    pub available_package_ref: Option<AvailablePackageReference>,
    /// Package name
    pub name: String,
    /// Version this detail describes
    pub version: Option<PackageAppVersion>,
    /// Repository URL
    pub repo_url: String,
    /// Project home page
    pub home_url: String,
    /// Icon URL
    pub icon_url: String,
    /// Name shown to users
    pub display_name: String,
    /// One-line description
    pub short_description: String,
    /// Long description
    pub long_description: String,
    /// README content
    pub readme: String,
    /// Default install values
    pub default_values: String,
    /// JSON schema of the install values
    pub values_schema: String,
    /// Source code URLs
    pub source_urls: Vec<String>,
    /// Package maintainers
    pub maintainers: Vec<Maintainer>,
    /// Categories the package is listed under
    pub categories: Vec<String>,
}

/// Summary of an installed package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstalledPackageSummary {
    /// Where the package is installed and which plugin manages it
    pub installed_package_ref: Option<InstalledPackageReference>,
    /// Installation name
    pub name: String,
    /// Version constraint the installation follows
    pub pkg_version_reference: Option<VersionReference>,
    /// Installed package and app version
    pub current_version: Option<PackageAppVersion>,
    /// Icon URL
    pub icon_url: String,
    /// Display name of the installed package
    pub pkg_display_name: String,
    /// One-line description
    pub short_description: String,
    /// Newest version available for upgrade
    pub latest_version: Option<PackageAppVersion>,
    /// Reconciliation status
    pub status: Option<InstalledPackageStatus>,
}

/// Full detail of an installed package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstalledPackageDetail {
    /// Where the package is installed and which plugin manages it
    pub installed_package_ref: Option<InstalledPackageReference>,
    /// Version constraint the installation follows
    pub pkg_version_reference: Option<VersionReference>,
    /// Installation name
    pub name: String,
    /// Installed package and app version
    pub current_version: Option<PackageAppVersion>,
    /// Values the installation was rendered with
    pub values_applied: String,
    /// Reconciliation settings
    pub reconciliation_options: Option<ReconciliationOptions>,
    /// Reconciliation status
    pub status: Option<InstalledPackageStatus>,
    /// Notes printed after installation
    pub post_installation_notes: String,
    /// Package the installation was created from
    pub available_package_ref: Option<AvailablePackageReference>,
    /// Newest version available for upgrade
    pub latest_version: Option<PackageAppVersion>,
}

/// List available packages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetAvailablePackageSummariesRequest {
    /// Cluster and namespace to list
    pub context: Option<Context>,
    /// Filters applied by each plugin
    pub filter_options: Option<FilterOptions>,
    /// Page of the merged listing
    pub pagination_options: Option<PaginationOptions>,
}

/// Available packages from every plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetAvailablePackageSummariesResponse {
    /// Merged summaries, sorted by identifier
    pub available_package_summaries: Vec<AvailablePackageSummary>,
    /// Token of the next page, empty on the last one
    pub next_page_token: String,
    /// Sorted union of every plugin's categories
    pub categories: Vec<String>,
}

/// Detail of one available package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetAvailablePackageDetailRequest {
    /// Package to describe
    pub available_package_ref: Option<AvailablePackageReference>,
    /// Version to describe, latest if empty
    pub pkg_version: String,
}

/// Detail of one available package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetAvailablePackageDetailResponse {
    /// The package detail
    pub available_package_detail: Option<AvailablePackageDetail>,
}

/// Versions of one available package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetAvailablePackageVersionsRequest {
    /// Package to list versions of
    pub available_package_ref: Option<AvailablePackageReference>,
    /// Optional version constraint
    pub pkg_version: String,
}

/// Versions of one available package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetAvailablePackageVersionsResponse {
    /// Package and app versions, as the plugin orders them
    pub package_app_versions: Vec<PackageAppVersion>,
}

/// List installed packages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetInstalledPackageSummariesRequest {
    /// Cluster and namespace to list
    pub context: Option<Context>,
    /// Page of the merged listing
    pub pagination_options: Option<PaginationOptions>,
}

/// Installed packages from every plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetInstalledPackageSummariesResponse {
    /// Merged summaries, sorted by identifier
    pub installed_package_summaries: Vec<InstalledPackageSummary>,
    /// Token of the next page, empty on the last one
    pub next_page_token: String,
}

/// Detail of one installed package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetInstalledPackageDetailRequest {
    /// Installation to describe
    pub installed_package_ref: Option<InstalledPackageReference>,
}

/// Detail of one installed package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetInstalledPackageDetailResponse {
    /// The installation detail
    pub installed_package_detail: Option<InstalledPackageDetail>,
}

/// Install an available package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateInstalledPackageRequest {
    /// Package to install
    pub available_package_ref: Option<AvailablePackageReference>,
    /// Cluster and namespace to install into
    pub target_context: Option<Context>,
    /// Installation name
    pub name: String,
    /// Version constraint to install
    pub pkg_version_reference: Option<VersionReference>,
    /// Install values
    pub values: String,
    /// Reconciliation settings
    pub reconciliation_options: Option<ReconciliationOptions>,
}

/// The created installation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateInstalledPackageResponse {
    /// Reference to the new installation
    pub installed_package_ref: Option<InstalledPackageReference>,
}

/// Change an installation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateInstalledPackageRequest {
    /// Installation to change
    pub installed_package_ref: Option<InstalledPackageReference>,
    /// New version constraint
    pub pkg_version_reference: Option<VersionReference>,
    /// New install values
    pub values: String,
    /// New reconciliation settings
    pub reconciliation_options: Option<ReconciliationOptions>,
}

/// The updated installation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateInstalledPackageResponse {
    /// Reference to the installation
    pub installed_package_ref: Option<InstalledPackageReference>,
}

/// Remove an installation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteInstalledPackageRequest {
    /// Installation to remove
    pub installed_package_ref: Option<InstalledPackageReference>,
}

/// Empty reply to a delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteInstalledPackageResponse {}

/// List the loaded plugins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetConfiguredPluginsRequest {}

/// The loaded plugins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetConfiguredPluginsResponse {
    /// Plugin identities in registry order
    pub plugins: Vec<PluginRef>,
}
