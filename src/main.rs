mod cli;

use reelsync::{
    config,
    fileserver::{FileServer, HttpFileServer},
    server,
    sync::{run_full_sync, SyncContext},
};
use reelsync_db::pool::init_pool;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

fn open_catalog(config: &config::Config) -> Result<reelsync_db::pool::DbPool> {
    let db_path = config.database.path.to_string_lossy();
    tracing::info!("Opening catalog at {}", db_path);
    init_pool(&db_path).with_context(|| format!("Failed to open catalog at {}", db_path))
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!(
        "Starting reelsync server on {}:{}",
        config.server.host,
        config.server.port
    );

    let pool = open_catalog(&config)?;
    server::start_server(config, pool).await
}

async fn sync_once(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let pool = open_catalog(&config)?;

    let file_server: Arc<dyn FileServer> = Arc::new(HttpFileServer::new(&config.file_server));
    let ctx = SyncContext::new(pool, file_server);

    let result = run_full_sync(&ctx).await.context("Sync failed")?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelsync=trace,reelsync_db=debug,reelsync_common=debug,tower_http=debug".to_string()
        } else {
            "reelsync=info,reelsync_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Sync => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(sync_once(cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelsync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  File server: {}", config.file_server.base_url);
            println!("  Catalog: {}", config.database.path.display());
            let integrations: Vec<_> = config
                .integrations
                .configured()
                .filter(|(_, c)| c.enabled)
                .map(|(kind, _)| kind.as_str())
                .collect();
            println!("  Integrations: {}", integrations.join(", "));
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  File server: {}", config.file_server.base_url);
        }
    }

    Ok(())
}
