//! Download-stack integrations (SABnzbd, Radarr, Sonarr, Tdarr).
//!
//! Each configured service gets a [`QueueClient`]; the admin API passes
//! their queue JSON through unchanged.

mod client;

pub use client::{create_client, QueueClient};

use crate::config::{IntegrationKind, IntegrationsConfig};
use std::collections::HashMap;
use std::sync::Arc;

/// Clients for every enabled integration.
#[derive(Clone, Default)]
pub struct Integrations {
    clients: HashMap<IntegrationKind, Arc<dyn QueueClient>>,
}

impl Integrations {
    pub fn from_config(config: &IntegrationsConfig) -> Self {
        let clients: HashMap<IntegrationKind, Arc<dyn QueueClient>> = IntegrationKind::ALL
            .into_iter()
            .filter_map(|kind| {
                config.get(kind).map(|c| {
                    tracing::debug!(integration = %kind, url = %c.url, "Configured integration");
                    (kind, Arc::<dyn QueueClient>::from(create_client(kind, c)))
                })
            })
            .collect();
        Self { clients }
    }

    /// Register a client, replacing any existing one of the same kind.
    pub fn insert(&mut self, client: Arc<dyn QueueClient>) {
        self.clients.insert(client.kind(), client);
    }

    pub fn get(&self, kind: IntegrationKind) -> Option<Arc<dyn QueueClient>> {
        self.clients.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
