//! Reelsync-DB: Catalog document store, migrations, and update intents
//!
//! This crate stores the media catalog in SQLite using rusqlite and r2d2
//! connection pooling. Movies and shows are kept as JSON documents keyed by
//! title and are modified through targeted update intents.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Typed views over catalog documents
//! - `update` - `$set` / `$unset` update intents with array-filter targets
//! - `queries` - Document and sync bookkeeping queries
//!
//! # Example
//!
//! ```no_run
//! use reelsync_db::pool::{init_pool, get_conn};
//! use reelsync_db::queries::documents;
//! use reelsync_db::update::{Target, UpdateDoc, UpdateIntent};
//!
//! let pool = init_pool("/var/lib/reelsync/catalog.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let mut update = UpdateDoc::new();
//! update.set("logo", serde_json::json!("http://files.local/movies/A/logo.png"));
//! documents::apply_intent(&conn, &UpdateIntent::upsert(Target::movie("A"), update)).unwrap();
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod update;
