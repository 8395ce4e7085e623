use crate::config::Config;
use crate::split::SplitService;
use crate::storage::create_store;
use anyhow::{Context, Result};
use axum::Router;
use splitforge_av::{check_tool, ChunkSplitter, ToolInfo, FFMPEG};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

mod error;
pub mod routes_health;
pub mod routes_split;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub service: Arc<SplitService>,
    /// ffmpeg discovery result, resolved once at startup
    pub ffmpeg: Arc<ToolInfo>,
}

impl AppContext {
    pub fn new(config: Config, service: SplitService, ffmpeg: ToolInfo) -> Self {
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            ffmpeg: Arc::new(ffmpeg),
        }
    }

    /// Wire up the storage backend, ffmpeg and the split service from configuration.
    ///
    /// A missing ffmpeg is not fatal: the service starts, `/health` reports
    /// it, and each split request fails with a tool-not-found error.
    pub async fn from_config(config: Config) -> Result<Self> {
        let store = create_store(&config.storage)?;
        tracing::info!("Using {} storage backend", store.name());

        let configured = config.tools.ffmpeg_path.clone();
        let ffmpeg = tokio::task::spawn_blocking(move || check_tool(FFMPEG, configured.as_deref()))
            .await
            .context("ffmpeg discovery task failed")?;
        match (&ffmpeg.path, &ffmpeg.version) {
            (Some(path), version) => tracing::info!(
                "Found ffmpeg at {:?} ({})",
                path,
                version.as_deref().unwrap_or("unknown version")
            ),
            (None, _) => tracing::warn!("ffmpeg not found; split requests will fail until it is installed"),
        }

        let splitter = ChunkSplitter::new(ffmpeg.path.clone(), config.audio.encoding())
            .with_timeout(config.tools.timeout());
        let service = SplitService::from_config(&config, store, splitter)?;

        Ok(Self::new(config, service, ffmpeg))
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let app = Router::new()
        .merge(routes_split::split_routes())
        .merge(routes_health::health_routes());

    let app = if ctx.config.server.cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app.layer(cors)
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http()).with_state(ctx)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::from_config(config).await?;
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

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
