//! Per-language caption maps.
//!
//! Captions are stored as an ordered JSON object keyed by language name
//! (`"English"`, `"English (SDH)"`, `"Spanish"`, ...). Entries whose name
//! contains "english" always come first; the remaining entries follow in
//! alphabetical order. The ordering is part of the stored value so players
//! can pick the first entry as the default track.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::timestamps::parse_timestamp;

/// A single caption track as listed by the file server and stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    /// Absolute URL of the subtitle file.
    pub url: String,
    /// Language code used for the `<track srclang>` attribute.
    #[serde(default)]
    pub src_lang: String,
    /// Last modification time of the subtitle file on the file server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl CaptionTrack {
    /// Returns `true` when this track's `lastModified` is strictly newer than `other`'s.
    ///
    /// A missing timestamp on `other` counts as stale.
    pub fn is_newer_than(&self, other: &CaptionTrack) -> bool {
        let ours = self.last_modified.as_deref().and_then(parse_timestamp);
        let theirs = other.last_modified.as_deref().and_then(parse_timestamp);
        crate::timestamps::is_newer(ours, theirs)
    }
}

/// Ordered caption map keyed by language name.
pub type CaptionMap = IndexMap<String, CaptionTrack>;

/// Returns `true` if the language name refers to an English track.
pub fn is_english(language: &str) -> bool {
    language.to_lowercase().contains("english")
}

/// Sort a caption map in place: English entries first, then alphabetical.
///
/// # Examples
///
/// ```
/// use reelsync_common::captions::{sort_english_first, CaptionMap, CaptionTrack};
///
/// let mut map = CaptionMap::new();
/// for lang in ["Spanish", "French", "English"] {
///     map.insert(lang.to_string(), CaptionTrack {
///         url: format!("/{lang}.vtt"),
///         src_lang: String::new(),
///         last_modified: None,
///     });
/// }
/// sort_english_first(&mut map);
/// let order: Vec<_> = map.keys().map(String::as_str).collect();
/// assert_eq!(order, ["English", "French", "Spanish"]);
/// ```
pub fn sort_english_first(map: &mut CaptionMap) {
    map.sort_by(|a, _, b, _| {
        is_english(b)
            .cmp(&is_english(a))
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
    });
}

/// Order-sensitive equality; `IndexMap`'s `PartialEq` ignores ordering.
pub fn same_order_and_content(a: &CaptionMap, b: &CaptionMap) -> bool {
    a.len() == b.len() && a.iter().eq(b.iter())
}

/// Merge `incoming` tracks into `current`.
///
/// A language is taken from `incoming` when it is missing from `current` or
/// its `lastModified` is strictly newer. Languages only present in `current`
/// are kept. The result is sorted English-first.
pub fn merge_captions(current: &CaptionMap, incoming: &CaptionMap) -> CaptionMap {
    let mut merged = current.clone();

    for (language, track) in incoming {
        let replace = match merged.get(language) {
            None => true,
            Some(existing) => track.is_newer_than(existing),
        };
        if replace {
            merged.insert(language.clone(), track.clone());
        }
    }

    sort_english_first(&mut merged);
    merged
}
