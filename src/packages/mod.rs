//! The packages API: fan-out over every plugin for list calls, dispatch to
//! the named plugin for everything else.

mod merge;

pub use merge::{merge_by_identifier, merge_categories, paginate, parse_page_token};

use std::future::Future;
use std::sync::Arc;

use futures::future::try_join_all;
use packages_core::{
    ConfigGetter, Context, CreateInstalledPackageRequest, CreateInstalledPackageResponse,
    DeleteInstalledPackageRequest, DeleteInstalledPackageResponse,
    GetAvailablePackageDetailRequest, GetAvailablePackageDetailResponse,
    GetAvailablePackageSummariesRequest, GetAvailablePackageSummariesResponse,
    GetAvailablePackageVersionsRequest, GetAvailablePackageVersionsResponse,
    GetInstalledPackageDetailRequest, GetInstalledPackageDetailResponse,
    GetInstalledPackageSummariesRequest, GetInstalledPackageSummariesResponse, PluginRef,
    RequestContext, RequestMetadata, Status, UpdateInstalledPackageRequest,
    UpdateInstalledPackageResponse,
};
use tracing::{debug, warn};

use crate::plugins::{PluginBinding, PluginRegistry};

/// Aggregates the packages API over the plugin registry
#[derive(Clone)]
pub struct PackagesServer {
    registry: Arc<PluginRegistry>,
    config_getter: Arc<dyn ConfigGetter>,
}

impl std::fmt::Debug for PackagesServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackagesServer")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Call every binding concurrently, collecting results in registry order.
///
/// The first error is returned as-is and the outstanding calls are dropped.
async fn fan_out<'a, T, F, Fut>(bindings: &'a [PluginBinding], call: F) -> Result<Vec<T>, Status>
where
    F: Fn(&'a PluginBinding) -> Fut,
    Fut: Future<Output = Result<T, Status>>,
{
    try_join_all(bindings.iter().map(|binding| {
        let pending = call(binding);
        async move {
            pending.await.inspect_err(|status| {
                warn!(
                    plugin = %binding.plugin(),
                    code = %status.code(),
                    message = %status.message(),
                    "Plugin call failed"
                );
            })
        }
    }))
    .await
}

impl PackagesServer {
    /// Create a server over a loaded registry
    pub fn new(registry: Arc<PluginRegistry>, config_getter: Arc<dyn ConfigGetter>) -> Self {
        Self {
            registry,
            config_getter,
        }
    }

    /// The registry this server dispatches to
    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    fn request_context(
        &self,
        metadata: &RequestMetadata,
        context: Option<&Context>,
    ) -> Result<RequestContext, Status> {
        let cluster = context.map_or("", |c| c.cluster.as_str());
        let rest_config = self.config_getter.get(metadata, cluster)?;
        Ok(RequestContext {
            metadata: metadata.clone(),
            rest_config,
        })
    }

    /// Binding named by a package reference, then the context for its cluster
    fn dispatch_target(
        &self,
        metadata: &RequestMetadata,
        plugin: Option<&PluginRef>,
        context: Option<&Context>,
    ) -> Result<(&PluginBinding, RequestContext), Status> {
        let Some(plugin) = plugin else {
            return Err(Status::invalid_argument("plugin not specified in request"));
        };
        let Some(binding) = self.registry.lookup(plugin) else {
            return Err(Status::internal(format!(
                "unable to find the plugin {plugin}"
            )));
        };
        let ctx = self.request_context(metadata, context)?;
        debug!(plugin = %plugin, "Dispatching to plugin");
        Ok((binding, ctx))
    }

    /// Available packages from every plugin, merged and paginated
    pub async fn get_available_package_summaries(
        &self,
        metadata: &RequestMetadata,
        request: GetAvailablePackageSummariesRequest,
    ) -> Result<GetAvailablePackageSummariesResponse, Status> {
        let ctx = self.request_context(metadata, request.context.as_ref())?;
        debug!(plugins = self.registry.len(), "Fanning out GetAvailablePackageSummaries");

        let responses = fan_out(self.registry.bindings(), |binding| {
            binding
                .implementation()
                .get_available_package_summaries(&ctx, request.clone())
        })
        .await?;

        let (summaries, categories): (Vec<_>, Vec<_>) = responses
            .into_iter()
            .map(|r| (r.available_package_summaries, r.categories))
            .unzip();
        let merged = merge_by_identifier(summaries, |summary| {
            summary
                .available_package_ref
                .as_ref()
                .map_or("", |r| r.identifier.as_str())
        });
        let (available_package_summaries, next_page_token) =
            paginate(merged, request.pagination_options.as_ref())?;

        Ok(GetAvailablePackageSummariesResponse {
            available_package_summaries,
            next_page_token,
            categories: merge_categories(categories),
        })
    }

    /// Installed packages from every plugin, merged and paginated
    pub async fn get_installed_package_summaries(
        &self,
        metadata: &RequestMetadata,
        request: GetInstalledPackageSummariesRequest,
    ) -> Result<GetInstalledPackageSummariesResponse, Status> {
        let ctx = self.request_context(metadata, request.context.as_ref())?;
        debug!(plugins = self.registry.len(), "Fanning out GetInstalledPackageSummaries");

        let responses = fan_out(self.registry.bindings(), |binding| {
            binding
                .implementation()
                .get_installed_package_summaries(&ctx, request.clone())
        })
        .await?;

        let merged = merge_by_identifier(
            responses.into_iter().map(|r| r.installed_package_summaries),
            |summary| {
                summary
                    .installed_package_ref
                    .as_ref()
                    .map_or("", |r| r.identifier.as_str())
            },
        );
        let (installed_package_summaries, next_page_token) =
            paginate(merged, request.pagination_options.as_ref())?;

        Ok(GetInstalledPackageSummariesResponse {
            installed_package_summaries,
            next_page_token,
        })
    }

    /// Detail of an available package, from the plugin that owns it
    pub async fn get_available_package_detail(
        &self,
        metadata: &RequestMetadata,
        request: GetAvailablePackageDetailRequest,
    ) -> Result<GetAvailablePackageDetailResponse, Status> {
        let reference = request.available_package_ref.as_ref();
        let (binding, ctx) = self.dispatch_target(
            metadata,
            reference.and_then(|r| r.plugin.as_ref()),
            reference.and_then(|r| r.context.as_ref()),
        )?;
        binding
            .implementation()
            .get_available_package_detail(&ctx, request)
            .await
    }

    /// Version history of an available package
    pub async fn get_available_package_versions(
        &self,
        metadata: &RequestMetadata,
        request: GetAvailablePackageVersionsRequest,
    ) -> Result<GetAvailablePackageVersionsResponse, Status> {
        let reference = request.available_package_ref.as_ref();
        let (binding, ctx) = self.dispatch_target(
            metadata,
            reference.and_then(|r| r.plugin.as_ref()),
            reference.and_then(|r| r.context.as_ref()),
        )?;
        binding
            .implementation()
            .get_available_package_versions(&ctx, request)
            .await
    }

    /// Detail of an installed package
    pub async fn get_installed_package_detail(
        &self,
        metadata: &RequestMetadata,
        request: GetInstalledPackageDetailRequest,
    ) -> Result<GetInstalledPackageDetailResponse, Status> {
        let reference = request.installed_package_ref.as_ref();
        let (binding, ctx) = self.dispatch_target(
            metadata,
            reference.and_then(|r| r.plugin.as_ref()),
            reference.and_then(|r| r.context.as_ref()),
        )?;
        binding
            .implementation()
            .get_installed_package_detail(&ctx, request)
            .await
    }

    /// Install a package into the request's target context
    pub async fn create_installed_package(
        &self,
        metadata: &RequestMetadata,
        request: CreateInstalledPackageRequest,
    ) -> Result<CreateInstalledPackageResponse, Status> {
        let (binding, ctx) = self.dispatch_target(
            metadata,
            request
                .available_package_ref
                .as_ref()
                .and_then(|r| r.plugin.as_ref()),
            request.target_context.as_ref(),
        )?;
        binding
            .implementation()
            .create_installed_package(&ctx, request)
            .await
    }

    /// Update an installed package
    pub async fn update_installed_package(
        &self,
        metadata: &RequestMetadata,
        request: UpdateInstalledPackageRequest,
    ) -> Result<UpdateInstalledPackageResponse, Status> {
        let reference = request.installed_package_ref.as_ref();
        let (binding, ctx) = self.dispatch_target(
            metadata,
            reference.and_then(|r| r.plugin.as_ref()),
            reference.and_then(|r| r.context.as_ref()),
        )?;
        binding
            .implementation()
            .update_installed_package(&ctx, request)
            .await
    }

    /// Uninstall a package
    pub async fn delete_installed_package(
        &self,
        metadata: &RequestMetadata,
        request: DeleteInstalledPackageRequest,
    ) -> Result<DeleteInstalledPackageResponse, Status> {
        let reference = request.installed_package_ref.as_ref();
        let (binding, ctx) = self.dispatch_target(
            metadata,
            reference.and_then(|r| r.plugin.as_ref()),
            reference.and_then(|r| r.context.as_ref()),
        )?;
        binding
            .implementation()
            .delete_installed_package(&ctx, request)
            .await
    }
}
