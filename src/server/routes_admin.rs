//! Admin routes: trigger a catalog sync and inspect the catalog.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use reelsync_common::urls::strip_base;
use reelsync_db::pool::get_conn;
use reelsync_db::queries::{documents, sync_info};
use serde::Serialize;
use utoipa::ToSchema;

use super::AppContext;
use crate::sync::run_full_sync;

/// Create admin routes.
pub fn admin_routes() -> Router<AppContext> {
    Router::new()
        .route("/admin/sync", get(get_sync_status).post(trigger_sync))
        .route("/admin/media", get(get_media))
}

fn error_response(status: StatusCode, message: impl ToString) -> axum::response::Response {
    (
        status,
        Json(serde_json::json!({"error": message.to_string()})),
    )
        .into_response()
}

/// Last completed sync and whether one is running now.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusResponse {
    pub running: bool,
    /// RFC 3339 start time of the last completed sync
    pub last_sync_time: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub last_summary: Option<serde_json::Value>,
}

/// Catalog overview.
#[derive(Debug, Serialize, ToSchema)]
pub struct MediaResponse {
    pub movies: Vec<MovieSummary>,
    pub tv: Vec<ShowSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub title: String,
    /// Video path relative to the file server, when hosted there
    pub video_path: Option<String>,
    pub has_metadata: bool,
    pub caption_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowSummary {
    pub title: String,
    pub season_count: usize,
    pub episode_count: usize,
}

/// Run a full sync pass.
#[utoipa::path(
    post,
    path = "/api/authenticated/admin/sync",
    tag = "admin",
    responses(
        (status = 200, description = "Sync finished; missing media, missing videos, duration, and start time"),
        (status = 409, description = "A sync is already running"),
        (status = 500, description = "Sync failed")
    )
)]
pub async fn trigger_sync(State(ctx): State<AppContext>) -> impl IntoResponse {
    let Ok(_guard) = ctx.sync_lock.try_lock() else {
        tracing::warn!("Sync requested while another sync is running");
        return error_response(StatusCode::CONFLICT, "A sync is already running");
    };

    match run_full_sync(&ctx.sync).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Sync failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/// Report the last sync.
#[utoipa::path(
    get,
    path = "/api/authenticated/admin/sync",
    tag = "admin",
    responses(
        (status = 200, description = "Sync status", body = SyncStatusResponse)
    )
)]
pub async fn get_sync_status(State(ctx): State<AppContext>) -> impl IntoResponse {
    let running = ctx.sync_lock.try_lock().is_err();

    let conn = match get_conn(&ctx.pool) {
        Ok(c) => c,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };
    let last_sync_time = match sync_info::get_last_sync(&conn) {
        Ok(t) => t.map(|t| t.to_rfc3339()),
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };
    let last_summary = sync_info::get_last_summary(&conn).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read last sync summary");
        None
    });

    Json(SyncStatusResponse {
        running,
        last_sync_time,
        last_summary,
    })
    .into_response()
}

/// List catalog movies and shows.
#[utoipa::path(
    get,
    path = "/api/authenticated/admin/media",
    tag = "admin",
    responses(
        (status = 200, description = "Catalog overview", body = MediaResponse),
        (status = 500, description = "Database error")
    )
)]
pub async fn get_media(State(ctx): State<AppContext>) -> impl IntoResponse {
    let conn = match get_conn(&ctx.pool) {
        Ok(c) => c,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };
    let (movies, shows) = match documents::list_movies(&conn)
        .and_then(|movies| Ok((movies, documents::list_shows(&conn)?)))
    {
        Ok(catalog) => catalog,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let base = ctx.sync.file_server.base_url();
    let movies = movies
        .into_iter()
        .map(|movie| MovieSummary {
            video_path: movie
                .video_url
                .as_deref()
                .and_then(|url| strip_base(base, url))
                .map(str::to_string),
            has_metadata: movie.metadata.is_some(),
            caption_count: movie.caption_urls.len(),
            title: movie.title,
        })
        .collect();
    let tv = shows
        .into_iter()
        .map(|show| ShowSummary {
            season_count: show.seasons.len(),
            episode_count: show.episode_count(),
            title: show.title,
        })
        .collect();

    Json(MediaResponse { movies, tv }).into_response()
}
