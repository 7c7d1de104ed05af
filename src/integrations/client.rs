use crate::config::{IntegrationConfig, IntegrationKind};
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;

/// Timeout for download-stack API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for one download-stack service's queue
#[async_trait::async_trait]
pub trait QueueClient: Send + Sync {
    fn kind(&self) -> IntegrationKind;

    /// Fetch the service's current queue as raw JSON
    async fn queue(&self) -> Result<Value>;
}

/// Create the client matching `kind`
pub fn create_client(kind: IntegrationKind, config: &IntegrationConfig) -> Box<dyn QueueClient> {
    let base = BaseClient::new(config);
    match kind {
        IntegrationKind::Sabnzbd => Box::new(SabnzbdClient(base)),
        IntegrationKind::Radarr => Box::new(ArrQueueClient {
            kind,
            base,
        }),
        IntegrationKind::Sonarr => Box::new(ArrQueueClient {
            kind,
            base,
        }),
        IntegrationKind::Tdarr => Box::new(TdarrClient(base)),
    }
}

struct BaseClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BaseClient {
    fn new(config: &IntegrationConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json(&self, request: RequestBuilder, what: &str) -> Result<Value> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", what))?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            anyhow::bail!("{} returned {}: {}", what, status, error);
        }

        response
            .json()
            .await
            .with_context(|| format!("{} returned invalid JSON", what))
    }
}

struct SabnzbdClient(BaseClient);

#[async_trait::async_trait]
impl QueueClient for SabnzbdClient {
    fn kind(&self) -> IntegrationKind {
        IntegrationKind::Sabnzbd
    }

    async fn queue(&self) -> Result<Value> {
        let mut query = vec![("mode", "queue"), ("output", "json")];
        if let Some(key) = self.0.api_key.as_deref() {
            query.push(("apikey", key));
        }
        let request = self.0.client.get(self.0.url("/api")).query(&query);
        self.0.send_json(request, "SABnzbd queue").await
    }
}

/// Radarr and Sonarr share the v3 queue endpoint.
struct ArrQueueClient {
    kind: IntegrationKind,
    base: BaseClient,
}

#[async_trait::async_trait]
impl QueueClient for ArrQueueClient {
    fn kind(&self) -> IntegrationKind {
        self.kind
    }

    async fn queue(&self) -> Result<Value> {
        let mut request = self.base.client.get(self.base.url("/api/v3/queue"));
        if let Some(key) = self.base.api_key.as_deref() {
            request = request.header("X-Api-Key", key);
        }
        self.base
            .send_json(request, &format!("{} queue", self.kind))
            .await
    }
}

struct TdarrClient(BaseClient);

#[async_trait::async_trait]
impl QueueClient for TdarrClient {
    fn kind(&self) -> IntegrationKind {
        IntegrationKind::Tdarr
    }

    /// Tdarr exposes worker state through its node database.
    async fn queue(&self) -> Result<Value> {
        let body = json!({
            "data": {
                "collection": "NodeJSONDB",
                "mode": "getAll",
            }
        });
        let mut request = self.0.client.post(self.0.url("/api/v2/cruddb")).json(&body);
        if let Some(key) = self.0.api_key.as_deref() {
            request = request.header("x-api-key", key);
        }
        self.0.send_json(request, "Tdarr nodes").await
    }
}
