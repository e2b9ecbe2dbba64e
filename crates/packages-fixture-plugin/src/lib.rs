//! Packaging plugin built as a shared library for loader tests
//!
//! Every listing returns one `podinfo` package whose short description is the
//! API server host the gateway resolved for the call. The crate carries no
//! async runtime of its own: its futures complete without suspending, so they
//! can be polled by the host's runtime.

use std::sync::Arc;

use async_trait::async_trait;
use packages_core::{
    AvailablePackageDetail, AvailablePackageReference, AvailablePackageSummary, Context,
    CreateInstalledPackageRequest, CreateInstalledPackageResponse, DeleteInstalledPackageRequest,
    DeleteInstalledPackageResponse, GetAvailablePackageDetailRequest,
    GetAvailablePackageDetailResponse, GetAvailablePackageSummariesRequest,
    GetAvailablePackageSummariesResponse, GetAvailablePackageVersionsRequest,
    GetAvailablePackageVersionsResponse, GetInstalledPackageDetailRequest,
    GetInstalledPackageDetailResponse, GetInstalledPackageSummariesRequest,
    GetInstalledPackageSummariesResponse, InstalledPackageReference, InstalledPackageSummary,
    PackageAppVersion, PackagesPlugin, PluginRef, PluginRegistrar, RequestContext, Status,
    UpdateInstalledPackageRequest, UpdateInstalledPackageResponse,
};

#[cfg(not(feature = "fluxv2"))]
const PLUGIN_NAME: &str = "kapp_controller.packages";
#[cfg(feature = "fluxv2")]
const PLUGIN_NAME: &str = "fluxv2.packages";

const PLUGIN_VERSION: &str = "v1alpha1";
const PACKAGE: &str = "podinfo";

struct FixturePlugin {
    plugin: PluginRef,
}

impl FixturePlugin {
    fn available_ref(&self, context: Option<Context>) -> AvailablePackageReference {
        AvailablePackageReference {
            context,
            identifier: PACKAGE.to_string(),
            plugin: Some(self.plugin.clone()),
        }
    }

    fn unimplemented(&self, method: &str) -> Status {
        Status::unimplemented(format!("{} does not implement {method}", self.plugin))
    }
}

#[async_trait]
impl PackagesPlugin for FixturePlugin {
    async fn get_available_package_summaries(
        &self,
        ctx: &RequestContext,
        request: GetAvailablePackageSummariesRequest,
    ) -> Result<GetAvailablePackageSummariesResponse, Status> {
        Ok(GetAvailablePackageSummariesResponse {
            available_package_summaries: vec![AvailablePackageSummary {
                available_package_ref: Some(self.available_ref(request.context)),
                name: PACKAGE.to_string(),
                latest_version: Some(PackageAppVersion {
                    pkg_version: "6.0.0".to_string(),
                    app_version: "6.0.0".to_string(),
                }),
                short_description: ctx.rest_config.host.clone(),
                categories: vec![self.plugin.name.clone()],
                ..Default::default()
            }],
            next_page_token: String::new(),
            categories: vec![self.plugin.name.clone()],
        })
    }

    async fn get_available_package_detail(
        &self,
        ctx: &RequestContext,
        request: GetAvailablePackageDetailRequest,
    ) -> Result<GetAvailablePackageDetailResponse, Status> {
        let reference = request.available_package_ref.unwrap_or_default();
        if reference.identifier != PACKAGE {
            return Err(Status::not_found(format!(
                "package {:?} not found",
                reference.identifier
            )));
        }
        Ok(GetAvailablePackageDetailResponse {
            available_package_detail: Some(AvailablePackageDetail {
                available_package_ref: Some(self.available_ref(reference.context)),
                name: PACKAGE.to_string(),
                short_description: ctx.rest_config.host.clone(),
                ..Default::default()
            }),
        })
    }

    async fn get_available_package_versions(
        &self,
        _ctx: &RequestContext,
        _request: GetAvailablePackageVersionsRequest,
    ) -> Result<GetAvailablePackageVersionsResponse, Status> {
        Err(self.unimplemented("GetAvailablePackageVersions"))
    }

    async fn get_installed_package_summaries(
        &self,
        ctx: &RequestContext,
        request: GetInstalledPackageSummariesRequest,
    ) -> Result<GetInstalledPackageSummariesResponse, Status> {
        Ok(GetInstalledPackageSummariesResponse {
            installed_package_summaries: vec![InstalledPackageSummary {
                installed_package_ref: Some(InstalledPackageReference {
                    context: request.context,
                    identifier: PACKAGE.to_string(),
                    plugin: Some(self.plugin.clone()),
                }),
                name: PACKAGE.to_string(),
                short_description: ctx.rest_config.host.clone(),
                ..Default::default()
            }],
            next_page_token: String::new(),
        })
    }

    async fn get_installed_package_detail(
        &self,
        _ctx: &RequestContext,
        _request: GetInstalledPackageDetailRequest,
    ) -> Result<GetInstalledPackageDetailResponse, Status> {
        Err(self.unimplemented("GetInstalledPackageDetail"))
    }

    async fn create_installed_package(
        &self,
        _ctx: &RequestContext,
        _request: CreateInstalledPackageRequest,
    ) -> Result<CreateInstalledPackageResponse, Status> {
        Err(self.unimplemented("CreateInstalledPackage"))
    }

    async fn update_installed_package(
        &self,
        _ctx: &RequestContext,
        _request: UpdateInstalledPackageRequest,
    ) -> Result<UpdateInstalledPackageResponse, Status> {
        Err(self.unimplemented("UpdateInstalledPackage"))
    }

    async fn delete_installed_package(
        &self,
        _ctx: &RequestContext,
        _request: DeleteInstalledPackageRequest,
    ) -> Result<DeleteInstalledPackageResponse, Status> {
        Err(self.unimplemented("DeleteInstalledPackage"))
    }
}

#[cfg_attr(feature = "undeclared", allow(dead_code))]
fn register(registrar: &mut dyn PluginRegistrar) {
    let plugin = PluginRef::new(PLUGIN_NAME, PLUGIN_VERSION);
    registrar.register_packages_plugin(plugin.clone(), Arc::new(FixturePlugin { plugin }));
}

#[cfg(not(feature = "undeclared"))]
packages_core::export_plugin!(register);
