//! Sync bookkeeping: last sync time and the summary of the last full run.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use reelsync_common::{Error, Result};
use serde_json::Value;

const LAST_SYNC_TIME: &str = "last_sync_time";
const LAST_SYNC_SUMMARY: &str = "last_sync_summary";

/// Read a raw JSON value by key.
pub fn get_value(conn: &Connection, key: &str) -> Result<Option<Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM sync_info WHERE key = ?",
            [key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    raw.map(|raw| serde_json::from_str(&raw).map_err(Error::from))
        .transpose()
}

/// Store a raw JSON value by key, replacing any previous value.
pub fn set_value(conn: &Connection, key: &str, value: &Value) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO sync_info (key, value) VALUES (:key, :value)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        rusqlite::named_params! {
            ":key": key,
            ":value": raw,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Time the last full sync started, if any sync has been recorded.
pub fn get_last_sync(conn: &Connection) -> Result<Option<DateTime<Utc>>> {
    Ok(get_value(conn, LAST_SYNC_TIME)?
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

/// Summary stored by the last [`record_sync`] call.
pub fn get_last_summary(conn: &Connection) -> Result<Option<Value>> {
    get_value(conn, LAST_SYNC_SUMMARY)
}

/// Record a completed full sync.
pub fn record_sync(conn: &Connection, started_at: DateTime<Utc>, summary: &Value) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    set_value(&tx, LAST_SYNC_TIME, &Value::String(started_at.to_rfc3339()))?;
    set_value(&tx, LAST_SYNC_SUMMARY, summary)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))
}
