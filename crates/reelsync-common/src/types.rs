//! Core type definitions shared by the store and the sync engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of catalog entity touched by a sync routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A movie document.
    Movie,
    /// A TV show document.
    Show,
    /// A season embedded in a show.
    Season,
    /// An episode embedded in a season.
    Episode,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Show => write!(f, "show"),
            Self::Season => write!(f, "season"),
            Self::Episode => write!(f, "episode"),
        }
    }
}

/// Why an entity was left untouched during a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No primary `.mp4` video was listed.
    MissingVideo,
    /// The metadata sidecar could not be fetched or parsed.
    MetadataUnavailable,
    /// A season or episode number could not be derived from its label.
    UnparseableNumber,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVideo => write!(f, "missing video"),
            Self::MetadataUnavailable => write!(f, "metadata unavailable"),
            Self::UnparseableNumber => write!(f, "unparseable number"),
        }
    }
}
