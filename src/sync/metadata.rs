use reelsync_common::{Error, MediaKind, Result, SkipReason};
use reelsync_db::models::{EpisodeRecord, SeasonRecord};
use reelsync_db::update::{Target, UpdateDoc};
use serde_json::Value;
use tracing::debug;

use super::reconcile::{metadata_needs_update, metadata_title};
use super::{Routine, SkippedEntity, SyncContext, SyncReport, UpdatePlan};
use crate::fileserver::{EpisodeListing, FileServer, Listing, SeasonListing};

/// Fetch a season's metadata document.
///
/// A document whose `episodes` field is present but not an array aborts the
/// routine; everything downstream indexes into it.
pub(crate) async fn fetch_season_metadata(
    fs: &dyn FileServer,
    show: &str,
    label: &str,
    season: &SeasonListing,
) -> Result<Option<Value>> {
    let Some(path) = season.metadata.as_deref() else {
        return Ok(None);
    };
    let Some(doc) = fs.fetch_metadata(path).await else {
        return Ok(None);
    };

    match doc.get("episodes") {
        None | Some(Value::Array(_)) => Ok(Some(doc)),
        Some(_) => Err(Error::malformed(format!(
            "'{}' {}: season metadata `episodes` is not an array",
            show, label
        ))),
    }
}

/// Metadata for one episode: its own sidecar when listed, otherwise the
/// matching entry of the season document.
pub(crate) async fn fetch_episode_metadata(
    fs: &dyn FileServer,
    season_doc: Option<&Value>,
    episode: &EpisodeListing<'_>,
) -> Option<Value> {
    if let Some(path) = episode.urls.and_then(|u| u.metadata.as_deref()) {
        return fs.fetch_metadata(path).await;
    }

    season_doc?
        .get("episodes")?
        .as_array()?
        .iter()
        .find(|e| e.get("episode_number").and_then(Value::as_u64) == Some(u64::from(episode.number)))
        .cloned()
}

fn has_own_sidecar(episode: &EpisodeListing<'_>) -> bool {
    episode.urls.is_some_and(|u| u.metadata.is_some())
}

/// Metadata and title changes for a stored episode.
///
/// The title follows the metadata `name` when the metadata is replaced. An
/// episode with no title at all takes it from the stored metadata; a stored
/// title is otherwise left alone.
pub(crate) fn episode_metadata_update(record: &EpisodeRecord, fetched: Value) -> UpdateDoc {
    let mut update = UpdateDoc::new();
    let replace = metadata_needs_update(record.metadata.as_ref(), &fetched);

    let source = match (replace, &record.title) {
        (true, _) => Some(&fetched),
        (false, None) => record.metadata.as_ref(),
        (false, Some(_)) => None,
    };
    if let Some(title) = source.and_then(metadata_title) {
        if record.title.as_deref() != Some(title) {
            update.set("title", Value::String(title.to_string()));
        }
    }

    if replace {
        update.set("metadata", fetched);
    }
    update
}

fn metadata_update(stored: Option<&Value>, fetched: Value) -> UpdateDoc {
    let mut update = UpdateDoc::new();
    if metadata_needs_update(stored, &fetched) {
        update.set("metadata", fetched);
    }
    update
}

/// Reconcile movie, show, season, and episode metadata with the sidecars
/// listed by the file server.
pub async fn sync_metadata(ctx: &SyncContext, listing: &Listing) -> Result<SyncReport> {
    let (movies, shows) = ctx.load_catalog()?;
    let fs = ctx.file_server.as_ref();
    let mut plan = UpdatePlan::new();
    let mut skipped = Vec::new();

    for movie in &movies {
        let Some(path) = listing
            .movies
            .get(&movie.title)
            .and_then(|m| m.urls.metadata.as_deref())
        else {
            continue;
        };

        match fs.fetch_metadata(path).await {
            Some(fetched) => plan.push(
                Target::movie(&movie.title),
                metadata_update(movie.metadata.as_ref(), fetched),
            ),
            None => skipped.push(SkippedEntity::new(
                MediaKind::Movie,
                &movie.title,
                SkipReason::MetadataUnavailable,
            )),
        }
    }

    for show in &shows {
        let Some(entry) = listing.tv.get(&show.title) else {
            debug!(show = %show.title, "Show not in listing; leaving metadata as is");
            continue;
        };

        if let Some(path) = entry.metadata.as_deref() {
            match fs.fetch_metadata(path).await {
                Some(fetched) => plan.push(
                    Target::show(&show.title),
                    metadata_update(show.metadata.as_ref(), fetched),
                ),
                None => skipped.push(SkippedEntity::new(
                    MediaKind::Show,
                    &show.title,
                    SkipReason::MetadataUnavailable,
                )),
            }
        }

        let (numbered, _) = entry.numbered_seasons();
        for season in &show.seasons {
            let Some(&(_, label, season_listing)) = numbered
                .iter()
                .find(|(number, _, _)| *number == season.season_number)
            else {
                continue;
            };

            sync_season_metadata(
                fs,
                &show.title,
                label,
                season,
                season_listing,
                &mut plan,
                &mut skipped,
            )
            .await?;
        }
    }

    let outcome = plan.apply(&ctx.pool)?;
    Ok(SyncReport::new(Routine::Metadata, &plan, outcome, skipped))
}

async fn sync_season_metadata(
    fs: &dyn FileServer,
    show: &str,
    label: &str,
    season: &SeasonRecord,
    listing: &SeasonListing,
    plan: &mut UpdatePlan,
    skipped: &mut Vec<SkippedEntity>,
) -> Result<()> {
    let season_doc = fetch_season_metadata(fs, show, label, listing).await?;
    match &season_doc {
        Some(doc) => plan.push(
            Target::season(show, season.season_number),
            metadata_update(season.metadata.as_ref(), doc.clone()),
        ),
        None if listing.metadata.is_some() => skipped.push(SkippedEntity::new(
            MediaKind::Season,
            format!("{} - {}", show, label),
            SkipReason::MetadataUnavailable,
        )),
        None => {}
    }

    let (episodes, _) = listing.episodes(show, label);
    for record in &season.episodes {
        let Some(episode) = episodes.iter().find(|e| e.number == record.episode_number) else {
            continue;
        };

        match fetch_episode_metadata(fs, season_doc.as_ref(), episode).await {
            Some(fetched) => plan.push(
                Target::episode(show, season.season_number, record.episode_number),
                episode_metadata_update(record, fetched),
            ),
            None if has_own_sidecar(episode) => skipped.push(SkippedEntity::new(
                MediaKind::Episode,
                Target::episode(show, season.season_number, record.episode_number).to_string(),
                SkipReason::MetadataUnavailable,
            )),
            None => {}
        }
    }
    Ok(())
}
