// directory-service/src/utils/error_helper.rs

//! エラーハンドリングの統一化ヘルパー
//!
//! サービス層とハンドラー層で共通して使用するエラー生成を提供します。

use crate::error::{AppError, ErrorDetail};
use sea_orm::SqlErr;
use tracing::{error, warn};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// クライアントへ返すエラーコード
pub mod codes {
    pub const VALUE_IS_INVALID: &str = "value.is.invalid";
    pub const VALUE_IS_REQUIRED: &str = "value.is.required";
    pub const RECORD_ALREADY_EXIST: &str = "record.already.exist";
    pub const DEPARTMENT_NOT_FOUND: &str = "department.not.found";
    pub const LOCATION_NOT_FOUND: &str = "location.not.found";
    pub const PARENT_IS_CONFLICT: &str = "parent.is.conflict";
    pub const DEPTH_LIMIT_EXCEEDED: &str = "depth.limit.exceeded";
    pub const SERVER_FAILURE: &str = "server.failure";
}

// =============================================================================
// バリデーションエラー処理の統一
// =============================================================================

/// validator の ValidationErrors を AppError に変換する
///
/// ネストした構造体のフィールドは `address.postal_code` のようにドット区切りで返す。
pub fn convert_validation_errors(validation_errors: ValidationErrors, context: &str) -> AppError {
    let mut errors = Vec::new();
    collect_validation_errors(&validation_errors, None, &mut errors);
    errors.sort_by(|a, b| a.field.cmp(&b.field));

    warn!(
        context = %context,
        error_count = errors.len(),
        "Validation failed"
    );

    AppError::Multiple(errors.into_iter().map(AppError::Validation).collect())
}

fn collect_validation_errors(
    validation_errors: &ValidationErrors,
    prefix: Option<&str>,
    out: &mut Vec<ErrorDetail>,
) {
    for (field, kind) in validation_errors.errors() {
        let field = match prefix {
            Some(prefix) => format!("{}.{}", prefix, field),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|error| ErrorDetail {
                    code: error.code.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map_or_else(|| format!("{} is invalid", field), |cow| cow.to_string()),
                    field: Some(field.clone()),
                }));
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_validation_errors(nested, Some(&field), out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    let item_field = format!("{}[{}]", field, index);
                    collect_validation_errors(nested, Some(&item_field), out);
                }
            }
        }
    }
}

/// 単一フィールドの ValidationError を AppError に変換する
pub fn from_validation_error(field: &str, error: ValidationError) -> AppError {
    AppError::Validation(ErrorDetail {
        code: error.code.to_string(),
        message: error
            .message
            .map_or_else(|| format!("{} is invalid", field), |cow| cow.to_string()),
        field: Some(field.to_string()),
    })
}

/// 不正な値
pub fn value_is_invalid(field: &str, message: impl Into<String>) -> AppError {
    AppError::validation(codes::VALUE_IS_INVALID, message).with_field(field)
}

/// 必須値の欠落
pub fn value_is_required(field: &str) -> AppError {
    AppError::validation(codes::VALUE_IS_REQUIRED, format!("{} is required", field))
        .with_field(field)
}

/// 有効なレコードとの重複
pub fn already_exists(field: &str, value: &str) -> AppError {
    AppError::validation(
        codes::RECORD_ALREADY_EXIST,
        format!("Record with {} '{}' already exists", field, value),
    )
    .with_field(field)
}

pub fn department_not_found(id: impl std::fmt::Display) -> AppError {
    AppError::not_found(
        codes::DEPARTMENT_NOT_FOUND,
        format!("Department {} not found", id),
    )
}

pub fn location_not_found() -> AppError {
    AppError::not_found(
        codes::LOCATION_NOT_FOUND,
        "One or more locations do not exist or are inactive",
    )
    .with_field("location_ids")
}

/// 一意制約違反なら `replacement` のエラーに置き換える
pub fn on_unique_violation(error: AppError, replacement: impl FnOnce() -> AppError) -> AppError {
    match &error {
        AppError::DbErr(db_err)
            if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
        {
            warn!(error = %db_err, "Unique constraint violated");
            replacement()
        }
        _ => error,
    }
}

// =============================================================================
// ログ付きエラー変換パターン
// =============================================================================

/// 内部サーバーエラーをログ付きで生成
pub fn internal_server_error<E: std::fmt::Display>(
    error: E,
    context: &str,
    user_message: &str,
) -> AppError {
    error!(
        error = %error,
        context = %context,
        "Internal server error occurred"
    );
    AppError::failure(codes::SERVER_FAILURE, user_message)
}
