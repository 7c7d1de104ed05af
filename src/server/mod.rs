use crate::config::Config;
use crate::fileserver::{FileServer, HttpFileServer};
use crate::integrations::Integrations;
use crate::sync::SyncContext;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use reelsync_db::pool::DbPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod openapi;
pub mod routes_admin;
pub mod routes_integrations;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub pool: DbPool,
    pub sync: SyncContext,
    /// Held for the duration of a sync pass; a second request gets 409
    pub sync_lock: Arc<Mutex<()>>,
    pub integrations: Integrations,
}

impl AppContext {
    pub fn new(config: Config, pool: DbPool, file_server: Arc<dyn FileServer>) -> Self {
        let integrations = Integrations::from_config(&config.integrations);
        Self {
            sync: SyncContext::new(pool.clone(), file_server),
            config: Arc::new(config),
            pool,
            sync_lock: Arc::new(Mutex::new(())),
            integrations,
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/authenticated", authenticated_routes())
        // OpenAPI documentation (Swagger UI at /api/docs)
        .nest("/api", openapi::openapi_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn authenticated_routes() -> Router<AppContext> {
    routes_admin::admin_routes().merge(routes_integrations::integration_routes())
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config, pool: DbPool) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let file_server: Arc<dyn FileServer> = Arc::new(HttpFileServer::new(&config.file_server));
    let ctx = AppContext::new(config, pool, file_server);
    tracing::info!(
        file_server = %ctx.config.file_server.base_url,
        integrations = ctx.integrations.len(),
        "Server context ready"
    );

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
