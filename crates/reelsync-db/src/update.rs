//! Update intents: targeted `$set` / `$unset` operations on catalog documents.
//!
//! The sync engine never writes documents wholesale. It computes a batch of
//! [`UpdateIntent`]s, each naming a [`Target`] (a movie or show by title, a
//! season by number inside a show, an episode by number inside a season) and
//! an [`UpdateDoc`] listing the fields to set and the fields to remove.
//!
//! Season and episode targets follow array-filter semantics: every element
//! whose `seasonNumber` / `episodeNumber` matches receives the update, and an
//! update that matches nothing is a no-op.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Catalog collection a document lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Movie documents.
    Movies,
    /// TV show documents (with embedded seasons and episodes).
    Tv,
}

impl Collection {
    /// SQLite table backing the collection.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::Tv => "tv",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// The (sub)document an update applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Movie {
        title: String,
    },
    Show {
        title: String,
    },
    Season {
        show: String,
        season: u32,
    },
    Episode {
        show: String,
        season: u32,
        episode: u32,
    },
}

impl Target {
    pub fn movie(title: impl Into<String>) -> Self {
        Self::Movie {
            title: title.into(),
        }
    }

    pub fn show(title: impl Into<String>) -> Self {
        Self::Show {
            title: title.into(),
        }
    }

    pub fn season(show: impl Into<String>, season: u32) -> Self {
        Self::Season {
            show: show.into(),
            season,
        }
    }

    pub fn episode(show: impl Into<String>, season: u32, episode: u32) -> Self {
        Self::Episode {
            show: show.into(),
            season,
            episode,
        }
    }

    /// Collection holding the top-level document.
    pub fn collection(&self) -> Collection {
        match self {
            Self::Movie { .. } => Collection::Movies,
            _ => Collection::Tv,
        }
    }

    /// Title of the top-level document.
    pub fn title(&self) -> &str {
        match self {
            Self::Movie { title } | Self::Show { title } => title,
            Self::Season { show, .. } | Self::Episode { show, .. } => show,
        }
    }

}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie { title } => write!(f, "movie '{}'", title),
            Self::Show { title } => write!(f, "show '{}'", title),
            Self::Season { show, season } => write!(f, "'{}' season {}", show, season),
            Self::Episode {
                show,
                season,
                episode,
            } => write!(f, "'{}' S{:02}E{:02}", show, season, episode),
        }
    }
}

/// Fields to set and fields to remove on a single (sub)document.
///
/// Keys may be dotted paths (`metadata.last_updated`); intermediate objects
/// are created on set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateDoc {
    #[serde(rename = "$set", skip_serializing_if = "BTreeMap::is_empty")]
    pub set: BTreeMap<String, Value>,
    #[serde(rename = "$unset", skip_serializing_if = "BTreeSet::is_empty")]
    pub unset: BTreeSet<String>,
}

impl UpdateDoc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field to set.
    pub fn set(&mut self, path: impl Into<String>, value: Value) -> &mut Self {
        let path = path.into();
        self.unset.remove(&path);
        self.set.insert(path, value);
        self
    }

    /// Record a field to remove.
    pub fn unset(&mut self, path: impl Into<String>) -> &mut Self {
        let path = path.into();
        self.set.remove(&path);
        self.unset.insert(path);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    /// Number of field operations recorded.
    pub fn len(&self) -> usize {
        self.set.len() + self.unset.len()
    }

    /// Apply the update to a JSON object in place.
    ///
    /// Returns `true` when the document changed. Non-object documents are
    /// replaced by an empty object before sets are applied.
    pub fn apply_to(&self, doc: &mut Value) -> bool {
        let mut changed = false;

        for (path, value) in &self.set {
            changed |= set_path(doc, path, value.clone());
        }
        for path in &self.unset {
            changed |= unset_path(doc, path);
        }

        changed
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

fn set_path(doc: &mut Value, path: &str, value: Value) -> bool {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return false;
    };

    let mut current = doc;
    for segment in segments {
        current = ensure_object(current)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = ensure_object(current);
    match map.get(last) {
        Some(existing) if *existing == value => false,
        _ => {
            map.insert(last.to_string(), value);
            true
        }
    }
}

fn unset_path(doc: &mut Value, path: &str) -> bool {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return false;
    };

    let mut current = doc;
    for segment in segments {
        match current.get_mut(segment) {
            Some(next) => current = next,
            None => return false,
        }
    }

    current
        .as_object_mut()
        .map(|map| map.remove(last).is_some())
        .unwrap_or(false)
}

/// A single targeted write computed by the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateIntent {
    pub target: Target,
    pub update: UpdateDoc,
    /// Create the top-level document when it does not exist yet.
    /// Ignored for season and episode targets.
    pub upsert: bool,
}

impl UpdateIntent {
    pub fn new(target: Target, update: UpdateDoc) -> Self {
        Self {
            target,
            update,
            upsert: false,
        }
    }

    pub fn upsert(target: Target, update: UpdateDoc) -> Self {
        Self {
            target,
            update,
            upsert: true,
        }
    }
}
