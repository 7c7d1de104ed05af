//! Per-field reconciliation rules.
//!
//! These functions are pure: they compare a stored value against the desired
//! one and return what to write, or nothing when the catalog is already
//! current. Running them twice against their own output yields no update.

use reelsync_common::captions::{merge_captions, same_order_and_content};
use reelsync_common::timestamps::{last_updated, metadata_floor};
use reelsync_common::CaptionMap;
use reelsync_db::update::UpdateDoc;
use serde_json::Value;

use super::desired::Fields;

/// Fields that are set from the listing but never removed when it stops
/// providing them.
const NEVER_UNSET: &[&str] = &["videoURL"];

// Field families, one per asset routine.
pub const LOGO_FIELDS: &[&str] = &["logo"];
pub const POSTER_FIELDS: &[&str] = &["posterURL", "backdrop"];
pub const BLURHASH_FIELDS: &[&str] = &["posterBlurhash", "backdropBlurhash"];
pub const CHAPTER_FIELDS: &[&str] = &["chapterURL"];
pub const VIDEO_FIELDS: &[&str] = &["videoURL", "mediaLastModified"];
pub const LENGTH_FIELDS: &[&str] = &["length", "dimensions"];
pub const THUMBNAIL_FIELDS: &[&str] = &["thumbnail"];
pub const THUMBNAIL_BLURHASH_FIELDS: &[&str] = &["thumbnailBlurhash"];

/// Diff `fields` of a stored document against the desired values.
///
/// Present and different values are set; stored values the listing no
/// longer provides are unset, except for [`NEVER_UNSET`] fields.
pub fn reconcile_fields(stored: &Value, desired: &Fields, fields: &[&str]) -> UpdateDoc {
    let mut update = UpdateDoc::new();
    for &field in fields {
        match (stored.get(field), desired.get(field)) {
            (current, Some(want)) if current != Some(want) => {
                update.set(field, want.clone());
            }
            (Some(_), None) if !NEVER_UNSET.contains(&field) => {
                update.unset(field);
            }
            _ => {}
        }
    }
    update
}

/// Merged caption map to store, or `None` when the stored map is current.
///
/// Tracks the listing no longer has are kept; the comparison is
/// order-sensitive so a mis-ordered stored map is rewritten.
pub fn reconcile_captions(stored: &CaptionMap, desired: &CaptionMap) -> Option<CaptionMap> {
    let merged = merge_captions(stored, desired);
    if same_order_and_content(&merged, stored) {
        None
    } else {
        Some(merged)
    }
}

/// Whether `fetched` metadata should replace `stored`.
///
/// - No stored metadata: always replace.
/// - Stored metadata without `last_updated`: replace unless identical.
/// - Otherwise: replace only when the fetched `last_updated` is strictly
///   newer. A fetched document without one counts as the metadata floor.
pub fn metadata_needs_update(stored: Option<&Value>, fetched: &Value) -> bool {
    let Some(stored) = stored.filter(|v| !v.is_null()) else {
        return true;
    };

    match last_updated(stored) {
        None => stored != fetched,
        Some(stored_at) => {
            let fetched_at = last_updated(fetched).unwrap_or_else(metadata_floor);
            fetched_at > stored_at
        }
    }
}

/// Episode title carried by a metadata document.
pub fn metadata_title(metadata: &Value) -> Option<&str> {
    metadata
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
}
