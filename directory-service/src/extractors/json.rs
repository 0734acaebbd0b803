use axum::{
    extract::{FromRequest, Json, Request},
    extract::rejection::JsonRejection,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;
use crate::utils::error_helper::{codes, convert_validation_errors};

/// JSON ボディを読み取り、validator で検証する Extractor
///
/// 読み取り・検証の失敗はどちらも VALIDATION のエラーエンベロープで返す。
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                AppError::validation(codes::VALUE_IS_INVALID, rejection.body_text())
                    .with_field("body")
            })?;

        value
            .validate()
            .map_err(|errors| convert_validation_errors(errors, &path))?;

        Ok(ValidatedJson(value))
    }
}
