use crate::error::AppError;
use crate::utils::error_helper::value_is_invalid;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// URLパスからUUIDパラメータ名を推測する（直前のリソース名から決める）
fn extract_uuid_param_name(path: &str) -> &'static str {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    segments
        .windows(2)
        .find_map(|pair| match pair[0] {
            "departments" => Some("department_id"),
            "locations" => Some("location_id"),
            "positions" => Some("position_id"),
            _ => None,
        })
        .unwrap_or("id")
}

/// 統一UUID Extractor
/// パスパラメータからUUIDを抽出し、検証を行う
#[derive(Debug, Clone, Copy)]
pub struct ValidatedUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidatedUuid
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let param_name = extract_uuid_param_name(parts.uri.path());

        let Path(uuid_str) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                value_is_invalid(
                    param_name,
                    format!("Missing path parameter '{}': {}", param_name, e),
                )
            })?;

        let uuid = Uuid::parse_str(&uuid_str).map_err(|_| {
            value_is_invalid(
                param_name,
                format!("Invalid UUID format for '{}': '{}'", param_name, uuid_str),
            )
        })?;

        Ok(ValidatedUuid(uuid))
    }
}
