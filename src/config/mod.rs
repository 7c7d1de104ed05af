mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    if config.database.path.is_relative() {
        if let Some(dir) = path.parent() {
            config.database.path = dir.join(&config.database.path);
        }
    }

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./reelsync.toml",
        "./config.toml",
        "~/.config/reelsync/config.toml",
        "/etc/reelsync/config.toml",
    ];

    for path_str in default_paths {
        let path = PathBuf::from(shellexpand::tilde(path_str).as_ref());
        if path.exists() {
            return load_config(&path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    let base = &config.file_server.base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!("File server base_url must be an http(s) URL, got '{}'", base);
    }

    if config.file_server.request_timeout_secs == 0 {
        anyhow::bail!("File server request_timeout_secs cannot be 0");
    }

    for (kind, integration) in config.integrations.configured() {
        if integration.enabled && integration.url.trim().is_empty() {
            anyhow::bail!("Integration '{}' is enabled but has no URL", kind);
        }
    }

    Ok(())
}
