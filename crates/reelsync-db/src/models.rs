//! Typed views over catalog documents.
//!
//! Documents are stored as JSON; these structs are snapshots the sync engine
//! diffs against. Every record keeps the keys it does not model in `extra`,
//! so a record serialized back into the document (the `seasons` array of a
//! show) loses nothing another writer put there.

use reelsync_common::CaptionMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A movie document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    #[serde(rename = "videoURL", default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(rename = "captionURLs", default, skip_serializing_if = "CaptionMap::is_empty")]
    pub caption_urls: CaptionMap,
    #[serde(rename = "posterURL", default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(rename = "posterBlurhash", default, skip_serializing_if = "Option::is_none")]
    pub poster_blurhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<String>,
    #[serde(rename = "backdropBlurhash", default, skip_serializing_if = "Option::is_none")]
    pub backdrop_blurhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(rename = "chapterURL", default, skip_serializing_if = "Option::is_none")]
    pub chapter_url: Option<String>,
    #[serde(rename = "mediaLastModified", default, skip_serializing_if = "Option::is_none")]
    pub media_last_modified: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A TV show document with its embedded seasons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub seasons: Vec<SeasonRecord>,
    #[serde(rename = "posterURL", default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(rename = "posterBlurhash", default, skip_serializing_if = "Option::is_none")]
    pub poster_blurhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<String>,
    #[serde(rename = "backdropBlurhash", default, skip_serializing_if = "Option::is_none")]
    pub backdrop_blurhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ShowRecord {
    pub fn season(&self, number: u32) -> Option<&SeasonRecord> {
        self.seasons.iter().find(|s| s.season_number == number)
    }

    /// Total number of episodes across all seasons.
    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }
}

/// A season embedded in a show.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    #[serde(rename = "seasonNumber")]
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<EpisodeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Fields this model does not name, carried through rewrites.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SeasonRecord {
    pub fn episode(&self, number: u32) -> Option<&EpisodeRecord> {
        self.episodes.iter().find(|e| e.episode_number == number)
    }
}

/// An episode embedded in a season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    #[serde(rename = "episodeNumber")]
    pub episode_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "videoURL", default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(rename = "captionURLs", default, skip_serializing_if = "CaptionMap::is_empty")]
    pub caption_urls: CaptionMap,
    #[serde(rename = "chapterURL", default, skip_serializing_if = "Option::is_none")]
    pub chapter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(rename = "thumbnailBlurhash", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_blurhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(rename = "mediaLastModified", default, skip_serializing_if = "Option::is_none")]
    pub media_last_modified: Option<String>,
    /// Fields this model does not name, carried through rewrites.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
