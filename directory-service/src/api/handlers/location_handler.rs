// directory-service/src/api/handlers/location_handler.rs

use axum::{extract::State, routing::post, Router};
use uuid::Uuid;

use super::request_cancellation;
use crate::{
    api::{dto::location_dto::CreateLocationRequest, AppState},
    error::AppResult,
    extractors::ValidatedJson,
    types::ApiResponse,
};

// 拠点の作成
pub async fn create_location_handler(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateLocationRequest>,
) -> AppResult<ApiResponse<Uuid>> {
    let (cancel, _guard) = request_cancellation();

    let location_id = app_state
        .location_service
        .create_location(payload.into(), &cancel)
        .await?;

    Ok(ApiResponse::success(location_id))
}

pub fn location_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/locations", post(create_location_handler))
        .with_state(app_state)
}
