//! Download-stack queue passthrough.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::AppContext;
use crate::config::IntegrationKind;

pub fn integration_routes() -> Router<AppContext> {
    Router::new().route("/:service", get(get_queue))
}

/// Proxy the queue of a configured integration.
#[utoipa::path(
    get,
    path = "/api/authenticated/{service}",
    tag = "integrations",
    params(
        ("service" = String, Path, description = "sabnzbd, radarr, sonarr or tdarr")
    ),
    responses(
        (status = 200, description = "Upstream queue JSON"),
        (status = 404, description = "Unknown integration"),
        (status = 501, description = "Integration not configured"),
        (status = 502, description = "Upstream request failed")
    )
)]
pub async fn get_queue(
    State(ctx): State<AppContext>,
    Path(service): Path<String>,
) -> impl IntoResponse {
    let Ok(kind) = service.parse::<IntegrationKind>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("Unknown integration: {}", service)})),
        )
            .into_response();
    };

    let Some(client) = ctx.integrations.get(kind) else {
        return (
            StatusCode::NOT_IMPLEMENTED,
            Json(serde_json::json!({"error": format!("{} is not configured", kind)})),
        )
            .into_response();
    };

    match client.queue().await {
        Ok(queue) => Json(queue).into_response(),
        Err(e) => {
            tracing::warn!(integration = %kind, error = %e, "Integration request failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}
