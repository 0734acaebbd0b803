// directory-service/src/domain/mod.rs

pub mod department;
pub mod department_location_model;
pub mod department_model;
pub mod department_position_model;
pub mod location;
pub mod location_model;
pub mod path;
pub mod position;
pub mod position_model;

use crate::error::AppResult;
use crate::utils::error_helper::{value_is_invalid, value_is_required};

/// 前後の空白を除いた文字列を文字数の範囲で検証する
pub(crate) fn bounded_text(field: &str, value: &str, min: u64, max: u64) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(value_is_required(field));
    }

    let length = trimmed.chars().count() as u64;
    if length < min || length > max {
        return Err(value_is_invalid(
            field,
            format!("{} must be between {} and {} characters", field, min, max),
        ));
    }
    Ok(trimmed.to_string())
}
