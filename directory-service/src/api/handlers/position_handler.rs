// directory-service/src/api/handlers/position_handler.rs

use axum::{extract::State, routing::post, Router};
use uuid::Uuid;

use super::request_cancellation;
use crate::{
    api::{dto::position_dto::CreatePositionRequest, AppState},
    error::AppResult,
    extractors::ValidatedJson,
    types::ApiResponse,
};

// 役職の作成
pub async fn create_position_handler(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePositionRequest>,
) -> AppResult<ApiResponse<Uuid>> {
    let (cancel, _guard) = request_cancellation();

    let position_id = app_state
        .position_service
        .create_position(payload.into(), &cancel)
        .await?;

    Ok(ApiResponse::success(position_id))
}

pub fn position_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/positions", post(create_position_handler))
        .with_state(app_state)
}
