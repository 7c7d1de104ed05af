//! Asset routines: captions, chapters, video URLs, artwork, blurhashes,
//! playback length/dimensions, and episode thumbnails.
//!
//! Every routine except captions is a [`Family`] of stored fields diffed
//! with [`reconcile_fields`]. The routines share one traversal that pairs
//! catalog entries with their listing entries.

use reelsync_common::{MediaKind, Result, SkipReason};
use reelsync_db::models::{EpisodeRecord, ShowRecord};
use reelsync_db::update::{Target, UpdateDoc};

use super::desired;
use super::reconcile::{
    reconcile_captions, reconcile_fields, BLURHASH_FIELDS, CHAPTER_FIELDS, LENGTH_FIELDS,
    LOGO_FIELDS, POSTER_FIELDS, THUMBNAIL_BLURHASH_FIELDS, THUMBNAIL_FIELDS, VIDEO_FIELDS,
};
use super::{Routine, SkippedEntity, SyncContext, SyncReport, UpdatePlan};
use crate::fileserver::{EpisodeListing, Listing};

/// Stored fields one routine owns, per entity kind.
struct Family {
    routine: Routine,
    movie: &'static [&'static str],
    show: &'static [&'static str],
    episode: &'static [&'static str],
    /// Movies without a primary video are skipped and reported.
    needs_video: bool,
}

const CHAPTERS: Family = Family {
    routine: Routine::Chapters,
    movie: CHAPTER_FIELDS,
    show: &[],
    episode: CHAPTER_FIELDS,
    needs_video: false,
};

const VIDEO_URL: Family = Family {
    routine: Routine::VideoUrl,
    movie: VIDEO_FIELDS,
    show: &[],
    episode: VIDEO_FIELDS,
    needs_video: true,
};

const LOGOS: Family = Family {
    routine: Routine::Logos,
    movie: LOGO_FIELDS,
    show: LOGO_FIELDS,
    episode: &[],
    needs_video: false,
};

const BLURHASH: Family = Family {
    routine: Routine::Blurhash,
    movie: BLURHASH_FIELDS,
    show: BLURHASH_FIELDS,
    episode: THUMBNAIL_BLURHASH_FIELDS,
    needs_video: false,
};

const POSTERS: Family = Family {
    routine: Routine::Posters,
    movie: POSTER_FIELDS,
    show: POSTER_FIELDS,
    episode: &[],
    needs_video: false,
};

const LENGTH_AND_DIMENSIONS: Family = Family {
    routine: Routine::LengthAndDimensions,
    movie: LENGTH_FIELDS,
    show: &[],
    episode: LENGTH_FIELDS,
    needs_video: true,
};

const EPISODE_THUMBNAILS: Family = Family {
    routine: Routine::EpisodeThumbnails,
    movie: &[],
    show: &[],
    episode: THUMBNAIL_FIELDS,
    needs_video: false,
};

/// A catalog episode paired with its listing entry.
struct MatchedEpisode<'a> {
    show: &'a str,
    season: u32,
    record: &'a EpisodeRecord,
    listing: EpisodeListing<'a>,
}

impl MatchedEpisode<'_> {
    fn target(&self) -> Target {
        Target::episode(self.show, self.season, self.record.episode_number)
    }
}

/// Catalog episodes that are still listed. Seasons and episodes the listing
/// no longer has are left alone.
fn matched_episodes<'a>(shows: &'a [ShowRecord], listing: &'a Listing) -> Vec<MatchedEpisode<'a>> {
    let mut matched = Vec::new();
    for show in shows {
        let Some(entry) = listing.tv.get(&show.title) else {
            continue;
        };
        let (numbered, _) = entry.numbered_seasons();

        for season in &show.seasons {
            let Some(&(_, label, season_listing)) = numbered
                .iter()
                .find(|(number, _, _)| *number == season.season_number)
            else {
                continue;
            };

            let (episodes, _) = season_listing.episodes(&show.title, label);
            for episode in episodes {
                if let Some(record) = season.episode(episode.number) {
                    matched.push(MatchedEpisode {
                        show: &show.title,
                        season: season.season_number,
                        record,
                        listing: episode,
                    });
                }
            }
        }
    }
    matched
}

fn sync_family(ctx: &SyncContext, listing: &Listing, family: &Family) -> Result<SyncReport> {
    let (movies, shows) = ctx.load_catalog()?;
    let base = ctx.file_server.base_url();
    let mut plan = UpdatePlan::new();
    let mut skipped = Vec::new();

    if !family.movie.is_empty() {
        for movie in &movies {
            let Some(entry) = listing.movies.get(&movie.title) else {
                continue;
            };
            let video = entry.primary_video(&movie.title);
            if video.is_none() && family.needs_video {
                skipped.push(SkippedEntity::new(
                    MediaKind::Movie,
                    &movie.title,
                    SkipReason::MissingVideo,
                ));
                continue;
            }

            let stored = serde_json::to_value(movie)?;
            let want = desired::movie_fields(base, entry, video.as_ref());
            plan.push(
                Target::movie(&movie.title),
                reconcile_fields(&stored, &want, family.movie),
            );
        }
    }

    if !family.show.is_empty() {
        for show in &shows {
            let Some(entry) = listing.tv.get(&show.title) else {
                continue;
            };
            let stored = serde_json::to_value(show)?;
            let want = desired::show_fields(base, entry);
            plan.push(
                Target::show(&show.title),
                reconcile_fields(&stored, &want, family.show),
            );
        }
    }

    if !family.episode.is_empty() {
        for episode in matched_episodes(&shows, listing) {
            let stored = serde_json::to_value(episode.record)?;
            let want = desired::episode_fields(base, &episode.listing);
            plan.push(
                episode.target(),
                reconcile_fields(&stored, &want, family.episode),
            );
        }
    }

    let outcome = plan.apply(&ctx.pool)?;
    Ok(SyncReport::new(family.routine, &plan, outcome, skipped))
}

/// Merge listed subtitles into movie and episode caption maps.
pub fn sync_captions(ctx: &SyncContext, listing: &Listing) -> Result<SyncReport> {
    let (movies, shows) = ctx.load_catalog()?;
    let base = ctx.file_server.base_url();
    let mut plan = UpdatePlan::new();

    for movie in &movies {
        let Some(entry) = listing.movies.get(&movie.title) else {
            continue;
        };
        let want = desired::captions(base, &entry.urls.subtitles);
        if let Some(merged) = reconcile_captions(&movie.caption_urls, &want) {
            let mut update = UpdateDoc::new();
            update.set("captionURLs", serde_json::to_value(&merged)?);
            plan.push(Target::movie(&movie.title), update);
        }
    }

    for episode in matched_episodes(&shows, listing) {
        let want = episode
            .listing
            .urls
            .map(|urls| desired::captions(base, &urls.subtitles))
            .unwrap_or_default();
        if let Some(merged) = reconcile_captions(&episode.record.caption_urls, &want) {
            let mut update = UpdateDoc::new();
            update.set("captionURLs", serde_json::to_value(&merged)?);
            plan.push(episode.target(), update);
        }
    }

    let outcome = plan.apply(&ctx.pool)?;
    Ok(SyncReport::new(Routine::Captions, &plan, outcome, Vec::new()))
}

/// Movie and episode `chapterURL`.
pub fn sync_chapters(ctx: &SyncContext, listing: &Listing) -> Result<SyncReport> {
    sync_family(ctx, listing, &CHAPTERS)
}

/// Movie and episode `videoURL` and `mediaLastModified`.
pub fn sync_video_url(ctx: &SyncContext, listing: &Listing) -> Result<SyncReport> {
    sync_family(ctx, listing, &VIDEO_URL)
}

/// Movie and show `logo`.
pub fn sync_logos(ctx: &SyncContext, listing: &Listing) -> Result<SyncReport> {
    sync_family(ctx, listing, &LOGOS)
}

/// Poster and backdrop blurhashes, plus episode thumbnail blurhashes.
pub fn sync_blurhash(ctx: &SyncContext, listing: &Listing) -> Result<SyncReport> {
    sync_family(ctx, listing, &BLURHASH)
}

/// Movie and show `posterURL` and `backdrop`.
pub fn sync_posters(ctx: &SyncContext, listing: &Listing) -> Result<SyncReport> {
    sync_family(ctx, listing, &POSTERS)
}

pub fn sync_length_and_dimensions(ctx: &SyncContext, listing: &Listing) -> Result<SyncReport> {
    sync_family(ctx, listing, &LENGTH_AND_DIMENSIONS)
}

pub fn sync_episode_thumbnails(ctx: &SyncContext, listing: &Listing) -> Result<SyncReport> {
    sync_family(ctx, listing, &EPISODE_THUMBNAILS)
}
