use std::collections::{HashMap, HashSet};

use reelsync_common::{MediaKind, Result, SkipReason};
use reelsync_db::models::{EpisodeRecord, SeasonRecord, ShowRecord};
use reelsync_db::update::{Target, UpdateDoc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::desired::{self, Fields};
use super::merge::add_or_update_season;
use super::metadata::{fetch_episode_metadata, fetch_season_metadata};
use super::reconcile::metadata_title;
use super::{Routine, SkippedEntity, SyncContext, SyncReport, UpdatePlan};
use crate::fileserver::{
    EpisodeListing, FileServer, Listing, MovieListing, PrimaryVideo, SeasonListing, ShowListing,
};

/// Catalog entries created by a pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MissingMedia {
    pub movies: Vec<String>,
    pub tv: Vec<MissingShow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingShow {
    pub title: String,
    pub seasons: Vec<MissingSeason>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingSeason {
    pub season_number: u32,
    pub episodes: Vec<u32>,
}

/// Listing entries without a playable `.mp4`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MissingMp4 {
    pub movies: Vec<String>,
    /// `"Show - Season N"` labels.
    pub tv: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MissingMediaOutcome {
    pub report: SyncReport,
    pub missing_media: MissingMedia,
    pub missing_mp4: MissingMp4,
}

fn set_fields(update: &mut UpdateDoc, fields: Fields) {
    for (key, value) in fields {
        update.set(key, value);
    }
}

/// Create movies, shows, seasons, and episodes the listing has and the
/// catalog lacks.
///
/// New entries are built with the same field builders the reconcilers use,
/// so a following pass finds nothing to change.
pub async fn sync_missing_media(ctx: &SyncContext, listing: &Listing) -> Result<MissingMediaOutcome> {
    let (movies, shows) = ctx.load_catalog()?;
    let fs = ctx.file_server.as_ref();

    let mut plan = UpdatePlan::new();
    let mut skipped = Vec::new();
    let mut missing_media = MissingMedia::default();
    let mut missing_mp4 = MissingMp4::default();

    let known_movies: HashSet<&str> = movies.iter().map(|m| m.title.as_str()).collect();
    for (title, entry) in &listing.movies {
        let Some(video) = entry.primary_video(title) else {
            missing_mp4.movies.push(title.clone());
            skipped.push(SkippedEntity::new(MediaKind::Movie, title, SkipReason::MissingVideo));
            continue;
        };
        if known_movies.contains(title.as_str()) {
            continue;
        }

        let update = new_movie(fs, entry, &video).await?;
        info!(movie = %title, "Adding movie");
        plan.push_upsert(Target::movie(title), update);
        missing_media.movies.push(title.clone());
    }

    let known_shows: HashMap<&str, &ShowRecord> =
        shows.iter().map(|s| (s.title.as_str(), s)).collect();
    for (title, entry) in &listing.tv {
        let existing = known_shows.get(title.as_str()).copied();
        let Some((seasons, added)) = missing_seasons(
            fs,
            title,
            entry,
            existing,
            &mut skipped,
            &mut missing_mp4,
        )
        .await?
        else {
            continue;
        };

        let mut update = UpdateDoc::new();
        update.set("seasons", serde_json::to_value(&seasons)?);

        match existing {
            Some(_) => {
                info!(show = %title, seasons = added.len(), "Adding seasons/episodes to show");
                plan.push(Target::show(title), update);
            }
            None => {
                info!(show = %title, seasons = added.len(), "Adding show");
                set_fields(&mut update, desired::show_fields(fs.base_url(), entry));
                if let Some(path) = entry.metadata.as_deref() {
                    if let Some(metadata) = fs.fetch_metadata(path).await {
                        update.set("metadata", metadata);
                    }
                }
                plan.push_upsert(Target::show(title), update);
            }
        }

        missing_media.tv.push(MissingShow {
            title: title.clone(),
            seasons: added,
        });
    }

    let outcome = plan.apply(&ctx.pool)?;
    Ok(MissingMediaOutcome {
        report: SyncReport::new(Routine::MissingMedia, &plan, outcome, skipped),
        missing_media,
        missing_mp4,
    })
}

async fn new_movie(
    fs: &dyn FileServer,
    entry: &MovieListing,
    video: &PrimaryVideo,
) -> Result<UpdateDoc> {
    let base = fs.base_url();
    let mut update = UpdateDoc::new();
    set_fields(&mut update, desired::movie_fields(base, entry, Some(video)));

    let captions = desired::captions(base, &entry.urls.subtitles);
    if !captions.is_empty() {
        update.set("captionURLs", serde_json::to_value(&captions)?);
    }

    if let Some(path) = entry.urls.metadata.as_deref() {
        if let Some(metadata) = fs.fetch_metadata(path).await {
            update.set("metadata", metadata);
        }
    }
    Ok(update)
}

/// Merge every season and episode the catalog lacks into the show's season
/// list. Returns `None` when there is nothing to add.
async fn missing_seasons(
    fs: &dyn FileServer,
    title: &str,
    entry: &ShowListing,
    existing: Option<&ShowRecord>,
    skipped: &mut Vec<SkippedEntity>,
    missing_mp4: &mut MissingMp4,
) -> Result<Option<(Vec<SeasonRecord>, Vec<MissingSeason>)>> {
    let (numbered, unparseable) = entry.numbered_seasons();
    for label in unparseable {
        skipped.push(SkippedEntity::new(
            MediaKind::Season,
            format!("{} - {}", title, label),
            SkipReason::UnparseableNumber,
        ));
    }

    let mut seasons = existing.map(|s| s.seasons.clone()).unwrap_or_default();
    let mut added = Vec::new();

    for (number, label, listing) in numbered {
        let (episodes, bad_files) = listing.episodes(title, label);
        for file in bad_files {
            skipped.push(SkippedEntity::new(
                MediaKind::Episode,
                format!("{} - {} - {}", title, label, file),
                SkipReason::UnparseableNumber,
            ));
        }
        if episodes.is_empty() {
            missing_mp4.tv.push(format!("{} - {}", title, label));
            skipped.push(SkippedEntity::new(
                MediaKind::Season,
                format!("{} - {}", title, label),
                SkipReason::MissingVideo,
            ));
            continue;
        }

        let stored = existing.and_then(|s| s.season(number));
        let new_episodes: Vec<&EpisodeListing<'_>> = episodes
            .iter()
            .filter(|e| stored.map_or(true, |s| s.episode(e.number).is_none()))
            .collect();
        if new_episodes.is_empty() {
            continue;
        }

        debug!(show = %title, season = number, episodes = new_episodes.len(), "Building season");
        let incoming =
            build_season(fs, title, label, number, listing, stored.is_none(), &new_episodes).await?;
        added.push(MissingSeason {
            season_number: number,
            episodes: incoming.episodes.iter().map(|e| e.episode_number).collect(),
        });
        seasons = add_or_update_season(seasons, incoming);
    }

    if added.is_empty() {
        return Ok(None);
    }
    Ok(Some((seasons, added)))
}

async fn build_season(
    fs: &dyn FileServer,
    show: &str,
    label: &str,
    number: u32,
    listing: &SeasonListing,
    is_new: bool,
    episodes: &[&EpisodeListing<'_>],
) -> Result<SeasonRecord> {
    let season_doc = fetch_season_metadata(fs, show, label, listing).await?;

    let mut records = Vec::with_capacity(episodes.len());
    for episode in episodes {
        records.push(new_episode(fs, season_doc.as_ref(), episode).await?);
    }

    Ok(SeasonRecord {
        season_number: number,
        episodes: records,
        metadata: if is_new { season_doc } else { None },
        ..Default::default()
    })
}

/// Build an episode record from its listing entry.
async fn new_episode(
    fs: &dyn FileServer,
    season_doc: Option<&Value>,
    episode: &EpisodeListing<'_>,
) -> Result<EpisodeRecord> {
    let base = fs.base_url();
    let mut fields = desired::episode_fields(base, episode);
    fields.insert("episodeNumber".to_string(), Value::from(episode.number));

    if let Some(urls) = episode.urls {
        let captions = desired::captions(base, &urls.subtitles);
        if !captions.is_empty() {
            fields.insert("captionURLs".to_string(), serde_json::to_value(&captions)?);
        }
    }

    if let Some(metadata) = fetch_episode_metadata(fs, season_doc, episode).await {
        if let Some(title) = metadata_title(&metadata) {
            fields.insert("title".to_string(), Value::String(title.to_string()));
        }
        fields.insert("metadata".to_string(), metadata);
    }

    Ok(serde_json::from_value(Value::Object(fields))?)
}
