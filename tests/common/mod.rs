//! Shared test harness for integration tests.
//!
//! Provides [`StaticFileServer`], an in-memory [`FileServer`] whose listing
//! and metadata sidecars can be swapped between passes, and [`TestHarness`]
//! which wires it to an in-memory catalog.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reelsync::config::Config;
use reelsync::fileserver::{FileServer, Listing};
use reelsync::server::AppContext;
use reelsync::sync::SyncContext;
use reelsync_common::Result;
use reelsync_db::models::{MovieRecord, ShowRecord};
use reelsync_db::pool::{get_conn, init_memory_pool, DbPool};
use reelsync_db::queries::documents;
use reelsync_db::update::{Target, UpdateDoc, UpdateIntent};
use serde_json::Value;

pub const BASE_URL: &str = "http://fs.test";

/// File server backed by an in-memory listing and metadata map.
pub struct StaticFileServer {
    listing: Mutex<Listing>,
    metadata: Mutex<HashMap<String, Value>>,
    metadata_fetches: AtomicUsize,
}

impl StaticFileServer {
    pub fn new(listing: Listing) -> Self {
        Self {
            listing: Mutex::new(listing),
            metadata: Mutex::new(HashMap::new()),
            metadata_fetches: AtomicUsize::new(0),
        }
    }

    pub fn set_listing(&self, listing: Listing) {
        *self.listing.lock().unwrap() = listing;
    }

    pub fn set_metadata(&self, path: &str, value: Value) {
        self.metadata.lock().unwrap().insert(path.to_string(), value);
    }

    pub fn remove_metadata(&self, path: &str) {
        self.metadata.lock().unwrap().remove(path);
    }

    pub fn metadata_fetches(&self) -> usize {
        self.metadata_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileServer for StaticFileServer {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn fetch_listing(&self) -> Result<Listing> {
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn fetch_metadata(&self, path: &str) -> Option<Value> {
        self.metadata_fetches.fetch_add(1, Ordering::SeqCst);
        self.metadata.lock().unwrap().get(path).cloned()
    }
}

/// Parse a listing from its JSON wire shape.
pub fn listing(value: Value) -> Listing {
    serde_json::from_value(value).expect("valid listing")
}

/// In-memory catalog plus a [`StaticFileServer`].
pub struct TestHarness {
    pub pool: DbPool,
    pub fs: Arc<StaticFileServer>,
    pub ctx: SyncContext,
}

impl TestHarness {
    pub fn new(listing: Listing) -> Self {
        let pool = init_memory_pool().expect("failed to create in-memory pool");
        let fs = Arc::new(StaticFileServer::new(listing));
        let ctx = SyncContext::new(pool.clone(), fs.clone());
        Self { pool, fs, ctx }
    }

    /// Admin API context sharing this harness's catalog and file server.
    pub fn app_context(&self, config: Config) -> AppContext {
        AppContext::new(config, self.pool.clone(), self.fs.clone())
    }

    pub async fn listing(&self) -> Listing {
        self.fs.fetch_listing().await.unwrap()
    }

    /// Insert a document directly, bypassing the sync routines.
    pub fn seed(&self, target: Target, fields: Value) {
        let mut update = UpdateDoc::new();
        for (key, value) in fields.as_object().expect("object").clone() {
            update.set(key, value);
        }
        let conn = get_conn(&self.pool).unwrap();
        documents::apply_intent(&conn, &UpdateIntent::upsert(target, update)).unwrap();
    }

    pub fn movie(&self, title: &str) -> Option<MovieRecord> {
        let conn = get_conn(&self.pool).unwrap();
        documents::get_movie(&conn, title).unwrap()
    }

    pub fn show(&self, title: &str) -> Option<ShowRecord> {
        let conn = get_conn(&self.pool).unwrap();
        documents::get_show(&conn, title).unwrap()
    }

    pub fn movie_count(&self) -> usize {
        let conn = get_conn(&self.pool).unwrap();
        documents::list_movies(&conn).unwrap().len()
    }
}
