//! Catalog document queries.
//!
//! Movies and shows are stored one JSON document per row, keyed by title.
//! Writes go through [`apply_intent`], which resolves the intent's target
//! inside the document, applies the `$set` / `$unset` fields, and persists
//! the document in a single transaction.

use rusqlite::{Connection, OptionalExtension};
use reelsync_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{MovieRecord, ShowRecord};
use crate::update::{Collection, Target, UpdateIntent};

/// What happened when an intent was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    /// Number of (sub)documents matched by the target.
    pub matched: usize,
    /// Whether the stored document changed.
    pub modified: bool,
    /// Whether a new top-level document was created.
    pub upserted: bool,
}

/// Load the raw JSON document for `title`.
pub fn get_document(conn: &Connection, collection: Collection, title: &str) -> Result<Option<Value>> {
    let raw: Option<String> = conn
        .query_row(
            &format!("SELECT doc FROM {} WHERE title = ?", collection.table()),
            [title],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    raw.map(|raw| serde_json::from_str(&raw).map_err(Error::from))
        .transpose()
}

fn list_documents<T: DeserializeOwned>(conn: &Connection, collection: Collection) -> Result<Vec<T>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT title, doc FROM {} ORDER BY title",
            collection.table()
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|e| Error::database(e.to_string()))?;

    let mut documents = Vec::new();
    for row in rows {
        let (title, raw) = row.map_err(|e| Error::database(e.to_string()))?;
        let doc = serde_json::from_str(&raw).map_err(|e| {
            Error::database(format!("Corrupt {} document '{}': {}", collection, title, e))
        })?;
        documents.push(doc);
    }

    Ok(documents)
}

/// List all movie documents ordered by title.
pub fn list_movies(conn: &Connection) -> Result<Vec<MovieRecord>> {
    list_documents(conn, Collection::Movies)
}

/// List all show documents ordered by title.
pub fn list_shows(conn: &Connection) -> Result<Vec<ShowRecord>> {
    list_documents(conn, Collection::Tv)
}

pub fn get_movie(conn: &Connection, title: &str) -> Result<Option<MovieRecord>> {
    get_document(conn, Collection::Movies, title)?
        .map(|doc| serde_json::from_value(doc).map_err(Error::from))
        .transpose()
}

pub fn get_show(conn: &Connection, title: &str) -> Result<Option<ShowRecord>> {
    get_document(conn, Collection::Tv, title)?
        .map(|doc| serde_json::from_value(doc).map_err(Error::from))
        .transpose()
}

fn number_matches(element: &Value, field: &str, number: u32) -> bool {
    element.get(field).and_then(Value::as_u64) == Some(u64::from(number))
}

/// Collect mutable references to every subdocument the target addresses.
fn resolve_targets<'a>(doc: &'a mut Value, target: &Target) -> Vec<&'a mut Value> {
    match target {
        Target::Movie { .. } | Target::Show { .. } => vec![doc],
        Target::Season { season, .. } => doc
            .get_mut("seasons")
            .and_then(Value::as_array_mut)
            .map(|seasons| {
                seasons
                    .iter_mut()
                    .filter(|s| number_matches(s, "seasonNumber", *season))
                    .collect()
            })
            .unwrap_or_default(),
        Target::Episode {
            season, episode, ..
        } => doc
            .get_mut("seasons")
            .and_then(Value::as_array_mut)
            .map(|seasons| {
                seasons
                    .iter_mut()
                    .filter(|s| number_matches(s, "seasonNumber", *season))
                    .filter_map(|s| s.get_mut("episodes").and_then(Value::as_array_mut))
                    .flat_map(|episodes| episodes.iter_mut())
                    .filter(|e| number_matches(e, "episodeNumber", *episode))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Apply a single update intent.
///
/// Movie and show targets are created when `upsert` is set and no document
/// exists; season and episode targets never create elements. The document is
/// only rewritten when the update actually changed it.
pub fn apply_intent(conn: &Connection, intent: &UpdateIntent) -> Result<ApplyOutcome> {
    let collection = intent.target.collection();
    let title = intent.target.title();

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let mut outcome = ApplyOutcome::default();
    let mut doc = match get_document(&tx, collection, title)? {
        Some(doc) => doc,
        None => {
            let top_level = matches!(intent.target, Target::Movie { .. } | Target::Show { .. });
            if !(intent.upsert && top_level) {
                return Ok(outcome);
            }
            outcome.upserted = true;
            let mut fresh = Map::new();
            fresh.insert("title".to_string(), Value::String(title.to_string()));
            Value::Object(fresh)
        }
    };

    let targets = resolve_targets(&mut doc, &intent.target);
    outcome.matched = targets.len();
    for subdocument in targets {
        outcome.modified |= intent.update.apply_to(subdocument);
    }

    if outcome.modified || outcome.upserted {
        let raw = serde_json::to_string(&doc)?;
        tx.execute(
            &format!(
                "INSERT INTO {} (title, doc) VALUES (:title, :doc)
                 ON CONFLICT(title) DO UPDATE SET doc = excluded.doc, updated_at = datetime('now')",
                collection.table()
            ),
            rusqlite::named_params! {
                ":title": title,
                ":doc": raw,
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(outcome)
}
