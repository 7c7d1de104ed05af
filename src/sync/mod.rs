//! Catalog synchronization engine.
//!
//! A sync pass diffs the file-server [`Listing`] against the catalog and
//! applies the minimal set of corrective writes. Each routine is
//! independently invocable and idempotent: it loads a fresh catalog
//! snapshot, computes an [`UpdatePlan`] without touching the database, and
//! then applies the plan.
//!
//! # Module layout
//!
//! - [`merge`] -- Season/episode merging for shows.
//! - [`reconcile`] -- Pure per-field diff rules (metadata staleness, captions, assets).
//! - [`desired`] -- Target field values derived from the listing.
//! - [`plan`] -- Batches of update intents and their application.
//! - [`missing`] -- Creation of movies, shows, seasons, and episodes absent from the catalog.
//! - [`metadata`] -- Metadata sidecar reconciliation.
//! - [`assets`] -- Captions, chapters, video URLs, artwork, blurhashes, dimensions, thumbnails.

pub mod assets;
pub mod desired;
pub mod merge;
pub mod metadata;
pub mod missing;
pub mod plan;
pub mod reconcile;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use reelsync_common::{MediaKind, Result, SkipReason};
use reelsync_db::models::{MovieRecord, ShowRecord};
use reelsync_db::pool::{get_conn, DbPool};
use reelsync_db::queries::{documents, sync_info};
use serde::Serialize;
use tracing::info;

use crate::fileserver::{FileServer, Listing};

pub use assets::{
    sync_blurhash, sync_captions, sync_chapters, sync_episode_thumbnails,
    sync_length_and_dimensions, sync_logos, sync_posters, sync_video_url,
};
pub use metadata::sync_metadata;
pub use missing::{sync_missing_media, MissingMedia, MissingMediaOutcome, MissingMp4};
pub use plan::{PlanOutcome, UpdatePlan};

/// Everything a sync routine needs: the catalog and the file server.
#[derive(Clone)]
pub struct SyncContext {
    pub pool: DbPool,
    pub file_server: Arc<dyn FileServer>,
}

impl SyncContext {
    pub fn new(pool: DbPool, file_server: Arc<dyn FileServer>) -> Self {
        Self { pool, file_server }
    }

    /// Load a consistent snapshot of every movie and show.
    pub fn load_catalog(&self) -> Result<(Vec<MovieRecord>, Vec<ShowRecord>)> {
        let conn = get_conn(&self.pool)?;
        let movies = documents::list_movies(&conn)?;
        let shows = documents::list_shows(&conn)?;
        Ok((movies, shows))
    }
}

/// Identifies a sync routine in reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Routine {
    MissingMedia,
    Metadata,
    Captions,
    Chapters,
    VideoUrl,
    Logos,
    Blurhash,
    Posters,
    LengthAndDimensions,
    EpisodeThumbnails,
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingMedia => "missing_media",
            Self::Metadata => "metadata",
            Self::Captions => "captions",
            Self::Chapters => "chapters",
            Self::VideoUrl => "video_url",
            Self::Logos => "logos",
            Self::Blurhash => "blurhash",
            Self::Posters => "posters",
            Self::LengthAndDimensions => "length_and_dimensions",
            Self::EpisodeThumbnails => "episode_thumbnails",
        };
        f.write_str(name)
    }
}

/// An entity a routine left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntity {
    pub kind: MediaKind,
    pub name: String,
    pub reason: SkipReason,
}

impl SkippedEntity {
    pub fn new(kind: MediaKind, name: impl Into<String>, reason: SkipReason) -> Self {
        let name = name.into();
        info!(kind = %kind, name = %name, reason = %reason, "Skipping entity");
        Self { kind, name, reason }
    }
}

/// Result of one routine.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub routine: Routine,
    /// Intents computed by the diff.
    pub planned: usize,
    /// Intents that changed or created a document.
    pub writes: usize,
    /// Intents whose season/episode target matched nothing.
    pub unmatched: usize,
    pub skipped: Vec<SkippedEntity>,
}

impl SyncReport {
    pub(crate) fn new(
        routine: Routine,
        plan: &UpdatePlan,
        outcome: PlanOutcome,
        skipped: Vec<SkippedEntity>,
    ) -> Self {
        let report = Self {
            routine,
            planned: plan.len(),
            writes: outcome.writes,
            unmatched: outcome.unmatched.len(),
            skipped,
        };
        info!(
            routine = %routine,
            planned = report.planned,
            writes = report.writes,
            skipped = report.skipped.len(),
            "Sync routine finished"
        );
        report
    }
}

/// Aggregate result of [`run_full_sync`], shaped for the admin API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullSyncResult {
    pub missing_media: MissingMedia,
    pub missing_mp4: MissingMp4,
    /// Wall-clock duration in seconds.
    pub duration: f64,
    pub start_time: DateTime<Utc>,
    pub reports: Vec<SyncReport>,
}

impl FullSyncResult {
    /// Total writes across all routines.
    pub fn total_writes(&self) -> usize {
        self.reports.iter().map(|r| r.writes).sum()
    }
}

/// Fetch the listing once and run every routine in order.
///
/// Routines run sequentially; each sees the writes of the ones before it.
/// A routine error aborts the remaining routines, and a failure to record
/// the run fails it.
pub async fn run_full_sync(ctx: &SyncContext) -> Result<FullSyncResult> {
    let start_time = Utc::now();
    let started = Instant::now();
    info!(base_url = %ctx.file_server.base_url(), "Starting full sync");

    let listing = ctx.file_server.fetch_listing().await?;
    info!(
        movies = listing.movies.len(),
        shows = listing.tv.len(),
        "Fetched file-server listing"
    );

    run_full_sync_with_listing(ctx, &listing, start_time, started).await
}

async fn run_full_sync_with_listing(
    ctx: &SyncContext,
    listing: &Listing,
    start_time: DateTime<Utc>,
    started: Instant,
) -> Result<FullSyncResult> {
    let missing = sync_missing_media(ctx, listing).await?;
    let mut reports = vec![missing.report];

    reports.push(sync_metadata(ctx, listing).await?);
    reports.push(sync_captions(ctx, listing)?);
    reports.push(sync_chapters(ctx, listing)?);
    reports.push(sync_video_url(ctx, listing)?);
    reports.push(sync_logos(ctx, listing)?);
    reports.push(sync_blurhash(ctx, listing)?);
    reports.push(sync_posters(ctx, listing)?);
    reports.push(sync_length_and_dimensions(ctx, listing)?);
    reports.push(sync_episode_thumbnails(ctx, listing)?);

    let result = FullSyncResult {
        missing_media: missing.missing_media,
        missing_mp4: missing.missing_mp4,
        duration: started.elapsed().as_secs_f64(),
        start_time,
        reports,
    };

    let summary = serde_json::json!({
        "writes": result.total_writes(),
        "duration": result.duration,
        "missingMovies": result.missing_media.movies.len(),
        "missingShows": result.missing_media.tv.len(),
        "missingMp4": result.missing_mp4.movies.len() + result.missing_mp4.tv.len(),
    });
    let conn = get_conn(&ctx.pool)?;
    sync_info::record_sync(&conn, start_time, &summary)?;

    info!(
        writes = result.total_writes(),
        duration_secs = result.duration,
        "Full sync complete"
    );

    Ok(result)
}
