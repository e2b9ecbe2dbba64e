//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use packages_core::{
    AvailablePackageDetail, AvailablePackageReference, AvailablePackageSummary, ConfigGetter,
    Context, CreateInstalledPackageRequest, CreateInstalledPackageResponse,
    DeleteInstalledPackageRequest, DeleteInstalledPackageResponse,
    GetAvailablePackageDetailRequest, GetAvailablePackageDetailResponse,
    GetAvailablePackageSummariesRequest, GetAvailablePackageSummariesResponse,
    GetAvailablePackageVersionsRequest, GetAvailablePackageVersionsResponse,
    GetInstalledPackageDetailRequest, GetInstalledPackageDetailResponse,
    GetInstalledPackageSummariesRequest, GetInstalledPackageSummariesResponse,
    InstalledPackageDetail, InstalledPackageReference, InstalledPackageSummary, PackageAppVersion,
    PackagesPlugin, PluginRef, RequestContext, RestConfig, Status, UpdateInstalledPackageRequest,
    UpdateInstalledPackageResponse,
};
use packages_gateway::cluster::{ClusterResolver, ClustersConfig};
use packages_gateway::packages::PackagesServer;
use packages_gateway::plugins::{PluginBinding, PluginRegistry};

pub const HOSTING_HOST: &str = "https://kubernetes.default";
pub const OTHER_HOST: &str = "https://other.example.com";

/// One call seen by a fake plugin
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub rest_config: RestConfig,
}

/// In-process plugin returning canned data.
///
/// Summaries are returned as `[pkg-2, pkg-1]`, unsorted, each tagged with
/// this plugin's identity.
#[derive(Debug)]
pub struct FakePlugin {
    pub plugin: PluginRef,
    pub categories: Vec<String>,
    pub fail_with: Option<Status>,
    pub delay: Option<Duration>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakePlugin {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            plugin: PluginRef::new(name, version),
            categories: vec!["cat-1".to_string()],
            fail_with: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str, version: &str, status: Status) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::new(name, version)
        }
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = categories.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, method: &'static str, ctx: &RequestContext) -> Result<(), Status> {
        self.calls.lock().unwrap().push(Call {
            method,
            rest_config: ctx.rest_config.clone(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_with {
            Some(status) => Err(status.clone()),
            None => Ok(()),
        }
    }

    fn available_ref(&self, identifier: &str) -> AvailablePackageReference {
        AvailablePackageReference {
            context: Some(Context::new("", "default")),
            identifier: identifier.to_string(),
            plugin: Some(self.plugin.clone()),
        }
    }

    fn installed_ref(&self, identifier: &str) -> InstalledPackageReference {
        InstalledPackageReference {
            context: Some(Context::new("", "default")),
            identifier: identifier.to_string(),
            plugin: Some(self.plugin.clone()),
        }
    }
}

#[async_trait]
impl PackagesPlugin for FakePlugin {
    async fn get_available_package_summaries(
        &self,
        ctx: &RequestContext,
        _request: GetAvailablePackageSummariesRequest,
    ) -> Result<GetAvailablePackageSummariesResponse, Status> {
        self.enter("GetAvailablePackageSummaries", ctx).await?;
        Ok(GetAvailablePackageSummariesResponse {
            available_package_summaries: ["pkg-2", "pkg-1"]
                .into_iter()
                .map(|id| AvailablePackageSummary {
                    available_package_ref: Some(self.available_ref(id)),
                    name: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            next_page_token: String::new(),
            categories: self.categories.clone(),
        })
    }

    async fn get_available_package_detail(
        &self,
        ctx: &RequestContext,
        request: GetAvailablePackageDetailRequest,
    ) -> Result<GetAvailablePackageDetailResponse, Status> {
        self.enter("GetAvailablePackageDetail", ctx).await?;
        Ok(GetAvailablePackageDetailResponse {
            available_package_detail: Some(AvailablePackageDetail {
                available_package_ref: request.available_package_ref,
                name: self.plugin.name.clone(),
                ..Default::default()
            }),
        })
    }

    async fn get_available_package_versions(
        &self,
        ctx: &RequestContext,
        request: GetAvailablePackageVersionsRequest,
    ) -> Result<GetAvailablePackageVersionsResponse, Status> {
        self.enter("GetAvailablePackageVersions", ctx).await?;
        Ok(GetAvailablePackageVersionsResponse {
            package_app_versions: vec![PackageAppVersion {
                pkg_version: if request.pkg_version.is_empty() {
                    "1.0.0".to_string()
                } else {
                    request.pkg_version
                },
                app_version: self.plugin.version.clone(),
            }],
        })
    }

    async fn get_installed_package_summaries(
        &self,
        ctx: &RequestContext,
        _request: GetInstalledPackageSummariesRequest,
    ) -> Result<GetInstalledPackageSummariesResponse, Status> {
        self.enter("GetInstalledPackageSummaries", ctx).await?;
        Ok(GetInstalledPackageSummariesResponse {
            installed_package_summaries: ["pkg-2", "pkg-1"]
                .into_iter()
                .map(|id| InstalledPackageSummary {
                    installed_package_ref: Some(self.installed_ref(id)),
                    name: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            next_page_token: String::new(),
        })
    }

    async fn get_installed_package_detail(
        &self,
        ctx: &RequestContext,
        request: GetInstalledPackageDetailRequest,
    ) -> Result<GetInstalledPackageDetailResponse, Status> {
        self.enter("GetInstalledPackageDetail", ctx).await?;
        Ok(GetInstalledPackageDetailResponse {
            installed_package_detail: Some(InstalledPackageDetail {
                installed_package_ref: request.installed_package_ref,
                name: self.plugin.name.clone(),
                ..Default::default()
            }),
        })
    }

    async fn create_installed_package(
        &self,
        ctx: &RequestContext,
        request: CreateInstalledPackageRequest,
    ) -> Result<CreateInstalledPackageResponse, Status> {
        self.enter("CreateInstalledPackage", ctx).await?;
        Ok(CreateInstalledPackageResponse {
            installed_package_ref: Some(InstalledPackageReference {
                context: request.target_context,
                identifier: request.name,
                plugin: Some(self.plugin.clone()),
            }),
        })
    }

    async fn update_installed_package(
        &self,
        ctx: &RequestContext,
        request: UpdateInstalledPackageRequest,
    ) -> Result<UpdateInstalledPackageResponse, Status> {
        self.enter("UpdateInstalledPackage", ctx).await?;
        Ok(UpdateInstalledPackageResponse {
            installed_package_ref: request.installed_package_ref,
        })
    }

    async fn delete_installed_package(
        &self,
        ctx: &RequestContext,
        _request: DeleteInstalledPackageRequest,
    ) -> Result<DeleteInstalledPackageResponse, Status> {
        self.enter("DeleteInstalledPackage", ctx).await?;
        Ok(DeleteInstalledPackageResponse {})
    }
}

/// Resolver with a hosting cluster named `default` and one extra cluster, `other`
pub fn test_resolver() -> Arc<dyn ConfigGetter> {
    let hosting = RestConfig {
        host: HOSTING_HOST.to_string(),
        bearer_token: Some("hosting-sa".to_string()),
        ..Default::default()
    };
    let clusters = ClustersConfig::parse(&format!(
        r#"[{{"name": "default"}}, {{"name": "other", "apiServiceURL": "{OTHER_HOST}"}}]"#
    ))
    .expect("valid clusters config");
    Arc::new(ClusterResolver::new(hosting, clusters))
}

/// Registry over in-process fakes
pub fn test_registry(plugins: &[Arc<FakePlugin>]) -> Arc<PluginRegistry> {
    let bindings = plugins
        .iter()
        .map(|fake| {
            let implementation: Arc<dyn PackagesPlugin> = fake.clone();
            PluginBinding::new(fake.plugin.clone(), implementation)
        })
        .collect();
    Arc::new(PluginRegistry::new(bindings).expect("unique plugins"))
}

/// Packages server over in-process fakes
pub fn test_server(plugins: &[Arc<FakePlugin>]) -> PackagesServer {
    PackagesServer::new(test_registry(plugins), test_resolver())
}

/// `mock1` and `mock2`, both `v1alpha1`
pub fn mock_plugins() -> Vec<Arc<FakePlugin>> {
    vec![
        Arc::new(FakePlugin::new("mock1", "v1alpha1")),
        Arc::new(FakePlugin::new("mock2", "v1alpha1")),
    ]
}
