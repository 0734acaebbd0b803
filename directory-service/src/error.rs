// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ApiResponse;

/// エラー種別（レスポンスの `kind` としてクライアントに返す）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Failure,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Failure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 機械可読なエラー情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
        }
    }
}

/// レスポンスのエラーリストの1要素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ErrorKind,
    #[serde(flatten)]
    pub detail: ErrorDetail,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {}", .0.message)]
    Validation(ErrorDetail),

    #[error("Item not found: {}", .0.message)]
    NotFound(ErrorDetail),

    #[error("Conflict: {}", .0.message)]
    Conflict(ErrorDetail),

    #[error("Failure: {}", .0.message)]
    Failure(ErrorDetail),

    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Multiple errors ({} total)", .0.len())]
    Multiple(Vec<AppError>),
}

impl AppError {
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(ErrorDetail::new(code, message))
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::NotFound(ErrorDetail::new(code, message))
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Conflict(ErrorDetail::new(code, message))
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Failure(ErrorDetail::new(code, message))
    }

    /// 複数の検証結果のエラーを1つにまとめる。エラーがなければ None
    pub fn combine(errors: impl IntoIterator<Item = Option<AppError>>) -> Option<AppError> {
        let mut errors: Vec<AppError> = errors.into_iter().flatten().collect();
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(AppError::Multiple(errors)),
        }
    }

    /// 対象フィールド名を付与する（単一エラーのみ）
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        match &mut self {
            AppError::Validation(detail)
            | AppError::NotFound(detail)
            | AppError::Conflict(detail)
            | AppError::Failure(detail) => detail.field = Some(field.into()),
            AppError::DbErr(_) | AppError::Multiple(_) => {}
        }
        self
    }

    /// 種別。種別の異なる複数エラーは FAILURE に集約する
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Failure(_) | AppError::DbErr(_) => ErrorKind::Failure,
            AppError::Multiple(errors) => {
                let mut kinds = errors.iter().map(AppError::kind);
                match kinds.next() {
                    Some(first) if kinds.all(|kind| kind == first) => first,
                    _ => ErrorKind::Failure,
                }
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// 先頭エラーのコード（ログ・テスト用）
    pub fn code(&self) -> &str {
        match self {
            AppError::Validation(detail)
            | AppError::NotFound(detail)
            | AppError::Conflict(detail)
            | AppError::Failure(detail) => &detail.code,
            AppError::DbErr(_) => "server.failure",
            AppError::Multiple(errors) => errors.first().map_or("server.failure", AppError::code),
        }
    }

    /// クライアントへ返すエラーリストに平坦化する
    pub fn to_api_errors(&self) -> Vec<ApiError> {
        match self {
            AppError::Validation(detail) => vec![ApiError {
                kind: ErrorKind::Validation,
                detail: detail.clone(),
            }],
            AppError::NotFound(detail) => vec![ApiError {
                kind: ErrorKind::NotFound,
                detail: detail.clone(),
            }],
            AppError::Conflict(detail) => vec![ApiError {
                kind: ErrorKind::Conflict,
                detail: detail.clone(),
            }],
            AppError::Failure(detail) => vec![ApiError {
                kind: ErrorKind::Failure,
                detail: detail.clone(),
            }],
            // DB の詳細はサーバーログにのみ出す
            AppError::DbErr(_) => vec![ApiError {
                kind: ErrorKind::Failure,
                detail: ErrorDetail::new("server.failure", "A database error occurred"),
            }],
            AppError::Multiple(errors) => errors.iter().flat_map(AppError::to_api_errors).collect(),
        }
    }
}

// axum でエラーをHTTPレスポンスに変換するための実装
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed with server error");
        } else {
            tracing::debug!(error = %self, kind = ?self.kind(), "Request rejected");
        }

        (status, Json(ApiResponse::<()>::error(self.to_api_errors()))).into_response()
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;
