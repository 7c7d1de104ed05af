//! File-server listing types.
//!
//! The listing is a read-only snapshot of what the file server hosts: one
//! entry per movie and per show, with relative asset paths, file sizes in
//! playback length, video dimensions, and modification timestamps.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use reelsync_common::CaptionMap;
use serde::{Deserialize, Serialize};

static EPISODE_SXXEYY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bS(\d{1,3})\s*E(\d{1,4})").expect("valid regex"));
static EPISODE_NXNN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})x(\d{2,3})\b").expect("valid regex"));
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Root of the file-server listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub movies: BTreeMap<String, MovieListing>,
    #[serde(default)]
    pub tv: BTreeMap<String, ShowListing>,
}

/// A movie directory on the file server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieListing {
    #[serde(default)]
    pub file_names: Vec<String>,
    /// Playback length in milliseconds, keyed by file name.
    #[serde(default)]
    pub length: HashMap<String, u64>,
    /// `WIDTHxHEIGHT`, keyed by file name.
    #[serde(default)]
    pub dimensions: HashMap<String, String>,
    #[serde(default)]
    pub urls: MovieUrls,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieUrls {
    pub mp4: Option<String>,
    pub media_last_modified: Option<String>,
    pub metadata: Option<String>,
    pub poster: Option<String>,
    pub poster_blurhash: Option<String>,
    pub backdrop: Option<String>,
    pub backdrop_blurhash: Option<String>,
    pub logo: Option<String>,
    pub chapters: Option<String>,
    #[serde(default)]
    pub subtitles: CaptionMap,
}

/// The video file a catalog entry plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryVideo {
    pub file_name: String,
    /// Relative path on the file server.
    pub path: String,
}

fn is_mp4(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".mp4")
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl MovieListing {
    /// Locate the movie's `.mp4`.
    ///
    /// The explicit `urls.mp4` entry wins; otherwise the first listed file
    /// ending in `.mp4` is served from the movie's directory.
    pub fn primary_video(&self, title: &str) -> Option<PrimaryVideo> {
        if let Some(path) = self.urls.mp4.as_deref().filter(|p| is_mp4(p)) {
            return Some(PrimaryVideo {
                file_name: last_segment(path).to_string(),
                path: path.to_string(),
            });
        }

        self.file_names
            .iter()
            .find(|name| is_mp4(name))
            .map(|name| PrimaryVideo {
                file_name: name.clone(),
                path: format!("/movies/{}/{}", title, name),
            })
    }
}

/// A show directory on the file server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowListing {
    pub metadata: Option<String>,
    pub poster: Option<String>,
    pub poster_blurhash: Option<String>,
    pub backdrop: Option<String>,
    pub backdrop_blurhash: Option<String>,
    pub logo: Option<String>,
    /// Seasons keyed by directory label (`"Season 1"`).
    #[serde(default)]
    pub seasons: BTreeMap<String, SeasonListing>,
}

impl ShowListing {
    /// Seasons with a parseable number, ascending; unparseable labels are returned separately.
    pub fn numbered_seasons(&self) -> (Vec<(u32, &str, &SeasonListing)>, Vec<&str>) {
        let mut numbered = Vec::new();
        let mut unparseable = Vec::new();
        for (label, season) in &self.seasons {
            match parse_season_number(label) {
                Some(number) => numbered.push((number, label.as_str(), season)),
                None => unparseable.push(label.as_str()),
            }
        }
        numbered.sort_by_key(|(number, _, _)| *number);
        (numbered, unparseable)
    }
}

/// A season directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonListing {
    pub metadata: Option<String>,
    #[serde(default)]
    pub file_names: Vec<String>,
    #[serde(default)]
    pub lengths: HashMap<String, u64>,
    #[serde(default)]
    pub dimensions: HashMap<String, String>,
    /// Per-episode asset URLs keyed by file name.
    #[serde(default)]
    pub urls: HashMap<String, EpisodeUrls>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeUrls {
    #[serde(rename = "videourl")]
    pub video_url: Option<String>,
    pub media_last_modified: Option<String>,
    pub metadata: Option<String>,
    pub thumbnail: Option<String>,
    pub thumbnail_blurhash: Option<String>,
    pub chapters: Option<String>,
    #[serde(default)]
    pub subtitles: CaptionMap,
}

/// One episode resolved from a season directory.
#[derive(Debug, Clone)]
pub struct EpisodeListing<'a> {
    pub number: u32,
    pub file_name: &'a str,
    /// Relative path of the episode video.
    pub video_path: String,
    pub length: Option<u64>,
    pub dimensions: Option<&'a str>,
    pub urls: Option<&'a EpisodeUrls>,
}

impl SeasonListing {
    /// Resolve the season's episodes, ascending by episode number.
    ///
    /// Every listed `.mp4` is an episode. Files whose episode number cannot
    /// be parsed are returned in the second vector. When two files claim the
    /// same number the first one listed wins.
    pub fn episodes<'a>(
        &'a self,
        show: &str,
        label: &str,
    ) -> (Vec<EpisodeListing<'a>>, Vec<&'a str>) {
        let mut episodes: Vec<EpisodeListing<'a>> = Vec::new();
        let mut unparseable = Vec::new();

        for file_name in self.file_names.iter().filter(|name| is_mp4(name)) {
            let Some(number) = parse_episode_number(file_name) else {
                unparseable.push(file_name.as_str());
                continue;
            };
            if episodes.iter().any(|e| e.number == number) {
                continue;
            }

            let urls = self.urls.get(file_name);
            let video_path = urls
                .and_then(|u| u.video_url.clone())
                .unwrap_or_else(|| format!("/tv/{}/{}/{}", show, label, file_name));

            episodes.push(EpisodeListing {
                number,
                file_name,
                video_path,
                length: self.lengths.get(file_name).copied(),
                dimensions: self.dimensions.get(file_name).map(String::as_str),
                urls,
            });
        }

        episodes.sort_by_key(|e| e.number);
        (episodes, unparseable)
    }
}

/// Parse a season number from a directory label (`"Season 03"` → 3).
pub fn parse_season_number(label: &str) -> Option<u32> {
    FIRST_NUMBER
        .find(label)
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse an episode number from a file name (`S01E02`, `s1e2`, `1x02`).
pub fn parse_episode_number(file_name: &str) -> Option<u32> {
    EPISODE_SXXEYY
        .captures(file_name)
        .or_else(|| EPISODE_NXNN.captures(file_name))
        .and_then(|caps| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}
