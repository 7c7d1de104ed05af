//! Field values the catalog should hold, derived from the listing.
//!
//! Every builder returns a JSON object keyed by stored field name, holding
//! only the fields the listing provides. Relative paths are joined onto the
//! file-server base URL so stored values are always absolute.

use reelsync_common::captions::sort_english_first;
use reelsync_common::urls::join_asset_url;
use reelsync_common::CaptionMap;
use serde_json::{Map, Value};

use crate::fileserver::{EpisodeListing, MovieListing, PrimaryVideo, ShowListing};

pub type Fields = Map<String, Value>;

fn put_url(fields: &mut Fields, key: &str, base: &str, path: Option<&str>) {
    if let Some(path) = path.filter(|p| !p.is_empty()) {
        fields.insert(key.to_string(), Value::String(join_asset_url(base, path)));
    }
}

fn put_str(fields: &mut Fields, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        fields.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Desired movie fields. Video-derived fields need the primary video.
pub fn movie_fields(base: &str, listing: &MovieListing, video: Option<&PrimaryVideo>) -> Fields {
    let urls = &listing.urls;
    let mut fields = Fields::new();

    if let Some(video) = video {
        put_url(&mut fields, "videoURL", base, Some(&video.path));
        if let Some(length) = listing.length.get(&video.file_name) {
            fields.insert("length".to_string(), Value::from(*length));
        }
        put_str(
            &mut fields,
            "dimensions",
            listing.dimensions.get(&video.file_name).map(String::as_str),
        );
    }

    put_str(&mut fields, "mediaLastModified", urls.media_last_modified.as_deref());
    put_url(&mut fields, "posterURL", base, urls.poster.as_deref());
    put_str(&mut fields, "posterBlurhash", urls.poster_blurhash.as_deref());
    put_url(&mut fields, "backdrop", base, urls.backdrop.as_deref());
    put_str(&mut fields, "backdropBlurhash", urls.backdrop_blurhash.as_deref());
    put_url(&mut fields, "logo", base, urls.logo.as_deref());
    put_url(&mut fields, "chapterURL", base, urls.chapters.as_deref());
    fields
}

/// Desired show-level fields.
pub fn show_fields(base: &str, listing: &ShowListing) -> Fields {
    let mut fields = Fields::new();
    put_url(&mut fields, "posterURL", base, listing.poster.as_deref());
    put_str(&mut fields, "posterBlurhash", listing.poster_blurhash.as_deref());
    put_url(&mut fields, "backdrop", base, listing.backdrop.as_deref());
    put_str(&mut fields, "backdropBlurhash", listing.backdrop_blurhash.as_deref());
    put_url(&mut fields, "logo", base, listing.logo.as_deref());
    fields
}

/// Desired episode fields.
pub fn episode_fields(base: &str, episode: &EpisodeListing<'_>) -> Fields {
    let mut fields = Fields::new();
    put_url(&mut fields, "videoURL", base, Some(&episode.video_path));
    if let Some(length) = episode.length {
        fields.insert("length".to_string(), Value::from(length));
    }
    put_str(&mut fields, "dimensions", episode.dimensions);

    if let Some(urls) = episode.urls {
        put_str(&mut fields, "mediaLastModified", urls.media_last_modified.as_deref());
        put_url(&mut fields, "chapterURL", base, urls.chapters.as_deref());
        put_url(&mut fields, "thumbnail", base, urls.thumbnail.as_deref());
        put_str(&mut fields, "thumbnailBlurhash", urls.thumbnail_blurhash.as_deref());
    }
    fields
}

/// Listing subtitles with absolute URLs, English first.
pub fn captions(base: &str, subtitles: &CaptionMap) -> CaptionMap {
    let mut map: CaptionMap = subtitles
        .iter()
        .map(|(language, track)| {
            let mut track = track.clone();
            track.url = join_asset_url(base, &track.url);
            (language.clone(), track)
        })
        .collect();
    sort_english_first(&mut map);
    map
}
