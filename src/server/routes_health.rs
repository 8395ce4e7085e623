use crate::server::AppContext;
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

pub fn health_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}

/// Liveness plus the ffmpeg discovery result captured at startup.
async fn health(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": {
            "ffmpeg": ctx.ffmpeg.as_ref(),
        }
    }))
}
