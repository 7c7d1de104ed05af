//! OpenAPI documentation and Swagger UI integration.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::AppContext;

/// OpenAPI documentation for reelsync.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "reelsync API",
        version = "0.1.0",
        description = "Media catalog synchronization against a file server",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Default server")
    ),
    paths(
        super::routes_admin::trigger_sync,
        super::routes_admin::get_sync_status,
        super::routes_admin::get_media,
        super::routes_integrations::get_queue,
    ),
    components(
        schemas(
            super::routes_admin::SyncStatusResponse,
            super::routes_admin::MediaResponse,
            super::routes_admin::MovieSummary,
            super::routes_admin::ShowSummary,
        )
    ),
    tags(
        (name = "admin", description = "Catalog sync and inspection"),
        (name = "integrations", description = "Download-stack queue passthrough"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/api/docs`, OpenAPI document at `/api/openapi.json`.
pub fn openapi_routes() -> Router<AppContext> {
    Router::new().merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}
