//! Season merging for show documents.

use reelsync_common::captions::merge_captions;
use reelsync_db::models::{EpisodeRecord, SeasonRecord};

/// Merge `incoming` into a show's season list.
///
/// A season with a new number is appended. A season whose number already
/// exists absorbs the incoming episodes: new episode numbers are added and
/// existing episodes take every field the incoming one provides. Season
/// metadata is replaced only when the incoming season carries some. Keys the
/// models do not name survive on both seasons and episodes.
///
/// The returned list has exactly one season per number, ascending, and each
/// season's episodes ascend by number. Existing episodes are never dropped.
pub fn add_or_update_season(
    mut seasons: Vec<SeasonRecord>,
    incoming: SeasonRecord,
) -> Vec<SeasonRecord> {
    match seasons
        .iter_mut()
        .find(|s| s.season_number == incoming.season_number)
    {
        Some(existing) => absorb_season(existing, incoming),
        None => seasons.push(incoming),
    }

    dedupe_seasons(&mut seasons);
    for season in &mut seasons {
        season.episodes.sort_by_key(|e| e.episode_number);
    }
    seasons
}

fn absorb_season(existing: &mut SeasonRecord, incoming: SeasonRecord) {
    if incoming.metadata.is_some() {
        existing.metadata = incoming.metadata;
    }
    existing.extra.extend(incoming.extra);
    for episode in incoming.episodes {
        absorb_episode(&mut existing.episodes, episode);
    }
}

fn absorb_episode(episodes: &mut Vec<EpisodeRecord>, incoming: EpisodeRecord) {
    let Some(existing) = episodes
        .iter_mut()
        .find(|e| e.episode_number == incoming.episode_number)
    else {
        episodes.push(incoming);
        return;
    };

    macro_rules! take {
        ($($field:ident),+) => {
            $(if incoming.$field.is_some() {
                existing.$field = incoming.$field;
            })+
        };
    }
    take!(
        title,
        video_url,
        length,
        dimensions,
        chapter_url,
        thumbnail,
        thumbnail_blurhash,
        metadata,
        media_last_modified
    );

    if !incoming.caption_urls.is_empty() {
        existing.caption_urls = merge_captions(&existing.caption_urls, &incoming.caption_urls);
    }
    existing.extra.extend(incoming.extra);
}

/// Collapse duplicate season numbers left by older writers, then sort.
fn dedupe_seasons(seasons: &mut Vec<SeasonRecord>) {
    seasons.sort_by_key(|s| s.season_number);
    let mut merged: Vec<SeasonRecord> = Vec::with_capacity(seasons.len());
    for season in seasons.drain(..) {
        match merged.last_mut() {
            Some(last) if last.season_number == season.season_number => {
                absorb_season(last, season)
            }
            _ => merged.push(season),
        }
    }
    *seasons = merged;
}
