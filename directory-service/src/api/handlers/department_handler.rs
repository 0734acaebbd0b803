// directory-service/src/api/handlers/department_handler.rs

use axum::{
    extract::State,
    routing::{post, put},
    Router,
};
use uuid::Uuid;

use super::request_cancellation;
use crate::{
    api::{
        dto::department_dto::{CreateDepartmentRequest, ReplaceLocationsRequest, UpdateParentRequest},
        AppState,
    },
    error::AppResult,
    extractors::{ValidatedJson, ValidatedUuid},
    types::ApiResponse,
};

// 部署の作成
pub async fn create_department_handler(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDepartmentRequest>,
) -> AppResult<ApiResponse<Uuid>> {
    let (cancel, _guard) = request_cancellation();

    let department_id = app_state
        .department_service
        .create_department(payload.into(), &cancel)
        .await?;

    Ok(ApiResponse::success(department_id))
}

// 親部署の付け替え
pub async fn update_parent_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(department_id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<UpdateParentRequest>,
) -> AppResult<ApiResponse<Uuid>> {
    let (cancel, _guard) = request_cancellation();

    let department_id = app_state
        .hierarchy_service
        .reparent(payload.into_command(department_id), &cancel)
        .await?;

    Ok(ApiResponse::success(department_id))
}

// 拠点の置き換え
pub async fn replace_locations_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(department_id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<ReplaceLocationsRequest>,
) -> AppResult<ApiResponse<Uuid>> {
    let (cancel, _guard) = request_cancellation();

    let department_id = app_state
        .department_location_service
        .replace_locations(payload.into_command(department_id), &cancel)
        .await?;

    Ok(ApiResponse::success(department_id))
}

pub fn department_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/departments", post(create_department_handler))
        .route("/api/departments/{id}/parent", put(update_parent_handler))
        .route(
            "/api/departments/{id}/locations",
            put(replace_locations_handler),
        )
        .with_state(app_state)
}
