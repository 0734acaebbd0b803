// directory-service/src/api/handlers/system_handler.rs

use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};

use crate::{api::AppState, error::AppResult, types::ApiResponse, utils::error_helper::internal_server_error};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

// ヘルスチェック（DB への ping を含む）
pub async fn health_check_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<HealthResponse>> {
    app_state.db.ping().await.map_err(|e| {
        internal_server_error(e, "system_handler::health_check", "Database is unavailable")
    })?;

    Ok(ApiResponse::success(HealthResponse {
        status: "ok".to_string(),
        database: "ok".to_string(),
    }))
}

pub fn system_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .with_state(app_state)
}
