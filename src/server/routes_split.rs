use crate::server::{AppContext, AppError};
use axum::{extract::State, routing::post, Json, Router};
use splitforge_common::{SplitRequest, SplitResponse};

pub fn split_routes() -> Router<AppContext> {
    Router::new().route("/split", post(split))
}

async fn split(
    State(ctx): State<AppContext>,
    Json(request): Json<SplitRequest>,
) -> Result<Json<SplitResponse>, AppError> {
    let response = ctx.service.split(&request).await?;
    Ok(Json(response))
}
