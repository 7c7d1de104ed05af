use std::time::Duration;

use async_trait::async_trait;
use reelsync_common::urls::join_asset_url;
use reelsync_common::{Error, Result};
use reqwest::Client;
use serde_json::Value;

use super::listing::Listing;
use crate::config::FileServerConfig;

/// Source of the listing and metadata sidecars a sync pass reconciles toward.
#[async_trait]
pub trait FileServer: Send + Sync {
    /// Base URL that relative asset paths are joined onto.
    fn base_url(&self) -> &str;

    /// Fetch the full listing. Failure aborts the sync run.
    async fn fetch_listing(&self) -> Result<Listing>;

    /// Fetch a JSON metadata document.
    ///
    /// Returns `None` on network errors, non-2xx responses, and parse errors;
    /// callers skip the entity for this pass.
    async fn fetch_metadata(&self, path: &str) -> Option<Value>;

    /// Absolute URL for a listing path.
    fn asset_url(&self, path: &str) -> String {
        join_asset_url(self.base_url(), path)
    }
}

/// [`FileServer`] backed by HTTP.
pub struct HttpFileServer {
    client: Client,
    base_url: String,
    listing_path: String,
}

impl HttpFileServer {
    pub fn new(config: &FileServerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            listing_path: config.listing_path.clone(),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!("GET {} returned {}", url, status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::fetch(format!("GET {} returned invalid JSON: {}", url, e)))
    }
}

#[async_trait]
impl FileServer for HttpFileServer {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_listing(&self) -> Result<Listing> {
        let url = self.asset_url(&self.listing_path);
        tracing::debug!(url = %url, "Fetching file-server listing");

        let body = self.get_json(&url).await?;
        serde_json::from_value(body).map_err(|e| Error::malformed(format!("listing: {}", e)))
    }

    async fn fetch_metadata(&self, path: &str) -> Option<Value> {
        let url = self.asset_url(path);
        match self.get_json(&url).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Metadata fetch failed; skipping");
                None
            }
        }
    }
}
