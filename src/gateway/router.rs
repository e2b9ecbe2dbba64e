//! HTTP router and handlers
//!
//! Each RPC method is a `POST` whose JSON body is the request message and
//! whose JSON response is the response message. Failures carry the status
//! as `{code, message}` with a matching HTTP status.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use packages_core::{
    CreateInstalledPackageRequest, CreateInstalledPackageResponse, DeleteInstalledPackageRequest,
    DeleteInstalledPackageResponse, GetAvailablePackageDetailRequest,
    GetAvailablePackageDetailResponse, GetAvailablePackageSummariesRequest,
    GetAvailablePackageSummariesResponse, GetAvailablePackageVersionsRequest,
    GetAvailablePackageVersionsResponse, GetConfiguredPluginsRequest,
    GetConfiguredPluginsResponse, GetInstalledPackageDetailRequest,
    GetInstalledPackageDetailResponse, GetInstalledPackageSummariesRequest,
    GetInstalledPackageSummariesResponse, RequestMetadata, Status, UpdateInstalledPackageRequest,
    UpdateInstalledPackageResponse,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::debug;

use crate::packages::PackagesServer;
use crate::plugins::PluginsServer;

/// Shared application state
#[derive(Debug)]
pub struct AppState {
    /// Packages API
    pub packages: PackagesServer,
    /// Plugins discovery API
    pub plugins: PluginsServer,
}

/// A [`Status`] on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Status);

impl From<Status> for ApiError {
    fn from(status: Status) -> Self {
        Self(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let http_status = StatusCode::from_u16(self.0.code().http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (http_status, Json(self.0)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Create the router
pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/core/plugins/v1alpha1/GetConfiguredPlugins",
            post(get_configured_plugins),
        )
        .route(
            "/core/packages/v1alpha1/GetAvailablePackageSummaries",
            post(get_available_package_summaries),
        )
        .route(
            "/core/packages/v1alpha1/GetAvailablePackageDetail",
            post(get_available_package_detail),
        )
        .route(
            "/core/packages/v1alpha1/GetAvailablePackageVersions",
            post(get_available_package_versions),
        )
        .route(
            "/core/packages/v1alpha1/GetInstalledPackageSummaries",
            post(get_installed_package_summaries),
        )
        .route(
            "/core/packages/v1alpha1/GetInstalledPackageDetail",
            post(get_installed_package_detail),
        )
        .route(
            "/core/packages/v1alpha1/CreateInstalledPackage",
            post(create_installed_package),
        )
        .route(
            "/core/packages/v1alpha1/UpdateInstalledPackage",
            post(update_installed_package),
        )
        .route(
            "/core/packages/v1alpha1/DeleteInstalledPackage",
            post(delete_installed_package),
        )
        .layer(
            // Dropping a timed-out handler cancels its outstanding plugin calls
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError(Status::deadline_exceeded("request timed out"))
    } else {
        ApiError(Status::internal(err.to_string()))
    }
}

/// Request metadata from the HTTP headers (non-UTF-8 values are skipped)
fn request_metadata(headers: &HeaderMap) -> RequestMetadata {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect()
}

fn parse<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(request)| request).map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Rejected request body");
        ApiError(Status::invalid_argument(rejection.body_text()))
    })
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "plugins": state.packages.registry().len(),
    }))
}

async fn get_configured_plugins(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GetConfiguredPluginsRequest>, JsonRejection>,
) -> ApiResult<GetConfiguredPluginsResponse> {
    Ok(Json(state.plugins.get_configured_plugins(parse(body)?)?))
}

async fn get_available_package_summaries(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<GetAvailablePackageSummariesRequest>, JsonRejection>,
) -> ApiResult<GetAvailablePackageSummariesResponse> {
    let response = state
        .packages
        .get_available_package_summaries(&request_metadata(&headers), parse(body)?)
        .await?;
    Ok(Json(response))
}

async fn get_available_package_detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<GetAvailablePackageDetailRequest>, JsonRejection>,
) -> ApiResult<GetAvailablePackageDetailResponse> {
    let response = state
        .packages
        .get_available_package_detail(&request_metadata(&headers), parse(body)?)
        .await?;
    Ok(Json(response))
}

async fn get_available_package_versions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<GetAvailablePackageVersionsRequest>, JsonRejection>,
) -> ApiResult<GetAvailablePackageVersionsResponse> {
    let response = state
        .packages
        .get_available_package_versions(&request_metadata(&headers), parse(body)?)
        .await?;
    Ok(Json(response))
}

async fn get_installed_package_summaries(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<GetInstalledPackageSummariesRequest>, JsonRejection>,
) -> ApiResult<GetInstalledPackageSummariesResponse> {
    let response = state
        .packages
        .get_installed_package_summaries(&request_metadata(&headers), parse(body)?)
        .await?;
    Ok(Json(response))
}

async fn get_installed_package_detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<GetInstalledPackageDetailRequest>, JsonRejection>,
) -> ApiResult<GetInstalledPackageDetailResponse> {
    let response = state
        .packages
        .get_installed_package_detail(&request_metadata(&headers), parse(body)?)
        .await?;
    Ok(Json(response))
}

async fn create_installed_package(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<CreateInstalledPackageRequest>, JsonRejection>,
) -> ApiResult<CreateInstalledPackageResponse> {
    let response = state
        .packages
        .create_installed_package(&request_metadata(&headers), parse(body)?)
        .await?;
    Ok(Json(response))
}

async fn update_installed_package(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<UpdateInstalledPackageRequest>, JsonRejection>,
) -> ApiResult<UpdateInstalledPackageResponse> {
    let response = state
        .packages
        .update_installed_package(&request_metadata(&headers), parse(body)?)
        .await?;
    Ok(Json(response))
}

async fn delete_installed_package(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<DeleteInstalledPackageRequest>, JsonRejection>,
) -> ApiResult<DeleteInstalledPackageResponse> {
    let response = state
        .packages
        .delete_installed_package(&request_metadata(&headers), parse(body)?)
        .await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use packages_core::Code;

    #[test]
    fn test_request_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        headers.insert("x-binary", HeaderValue::from_bytes(b"\xff").unwrap());

        let metadata = request_metadata(&headers);
        assert_eq!(metadata.get("Authorization"), Some("Bearer abc"));
        assert_eq!(metadata.get("x-binary"), None);
    }

    #[test]
    fn test_api_error_status_mapping() {
        let response = ApiError(Status::invalid_argument("bad")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError(Status::new(Code::Cancelled, "gone")).into_response();
        assert_eq!(response.status().as_u16(), 499);

        let response = ApiError(Status::internal("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
