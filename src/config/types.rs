use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub file_server: FileServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    /// Base URL that every relative asset path in the listing is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the listing document relative to `base_url`
    #[serde(default = "default_listing_path")]
    pub listing_path: String,

    /// Per-request timeout for listing and metadata fetches (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_listing_path() -> String {
    "/media_list.json".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_path: default_listing_path(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite catalog file; relative paths resolve against the config file's directory
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("reelsync.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IntegrationsConfig {
    #[serde(default)]
    pub sabnzbd: Option<IntegrationConfig>,

    #[serde(default)]
    pub radarr: Option<IntegrationConfig>,

    #[serde(default)]
    pub sonarr: Option<IntegrationConfig>,

    #[serde(default)]
    pub tdarr: Option<IntegrationConfig>,
}

impl IntegrationsConfig {
    /// Configuration for an integration, if present and enabled.
    pub fn get(&self, kind: IntegrationKind) -> Option<&IntegrationConfig> {
        let entry = match kind {
            IntegrationKind::Sabnzbd => self.sabnzbd.as_ref(),
            IntegrationKind::Radarr => self.radarr.as_ref(),
            IntegrationKind::Sonarr => self.sonarr.as_ref(),
            IntegrationKind::Tdarr => self.tdarr.as_ref(),
        };
        entry.filter(|c| c.enabled)
    }

    /// Iterate over every configured entry, enabled or not.
    pub fn configured(&self) -> impl Iterator<Item = (IntegrationKind, &IntegrationConfig)> {
        IntegrationKind::ALL.into_iter().filter_map(move |kind| {
            let entry = match kind {
                IntegrationKind::Sabnzbd => self.sabnzbd.as_ref(),
                IntegrationKind::Radarr => self.radarr.as_ref(),
                IntegrationKind::Sonarr => self.sonarr.as_ref(),
                IntegrationKind::Tdarr => self.tdarr.as_ref(),
            };
            entry.map(|c| (kind, c))
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntegrationConfig {
    pub url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationKind {
    Sabnzbd,
    Radarr,
    Sonarr,
    Tdarr,
}

impl IntegrationKind {
    pub const ALL: [IntegrationKind; 4] = [Self::Sabnzbd, Self::Radarr, Self::Sonarr, Self::Tdarr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sabnzbd => "sabnzbd",
            Self::Radarr => "radarr",
            Self::Sonarr => "sonarr",
            Self::Tdarr => "tdarr",
        }
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IntegrationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sabnzbd" => Ok(Self::Sabnzbd),
            "radarr" => Ok(Self::Radarr),
            "sonarr" => Ok(Self::Sonarr),
            "tdarr" => Ok(Self::Tdarr),
            _ => Err(format!("Unknown integration: {}", s)),
        }
    }
}
