// directory-service/src/utils/validation.rs

//! 共通バリデーション定数と関数
//!
//! DTO のバリデーションとドメインの値オブジェクトで同じ制約を使う。

use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use uuid::Uuid;
use validator::ValidationError;

use crate::utils::error_helper::codes;

// =============================================================================
// バリデーション定数
// =============================================================================

/// 部署の制約
pub mod department {
    pub const NAME_MIN_LENGTH: u64 = 3;
    pub const NAME_MAX_LENGTH: u64 = 150;
    pub const IDENTIFIER_MAX_LENGTH: u64 = 150;
}

/// 拠点の制約
pub mod location {
    pub const NAME_MIN_LENGTH: u64 = 3;
    pub const NAME_MAX_LENGTH: u64 = 120;
    pub const ADDRESS_PART_MAX_LENGTH: u64 = 100;
    pub const HOUSE_MAX_LENGTH: u64 = 10;
    pub const POSTAL_CODE_LENGTH: u64 = 6;
}

/// 役職の制約
pub mod position {
    pub const NAME_MIN_LENGTH: u64 = 3;
    pub const NAME_MAX_LENGTH: u64 = 100;
    pub const DESCRIPTION_MAX_LENGTH: u64 = 1000;
}

// =============================================================================
// バリデーション正規表現
// =============================================================================

/// 部署識別子（英字のみ。パスの1セグメントになる）
pub static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{1,150}$").expect("Invalid identifier regex"));

/// 郵便番号（6桁の数字）
pub static POSTAL_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}$").expect("Invalid postal code regex"));

// =============================================================================
// カスタムバリデーション関数
// =============================================================================

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn validate_identifier(identifier: &str) -> Result<(), ValidationError> {
    if !IDENTIFIER_REGEX.is_match(identifier) {
        return Err(invalid(
            codes::VALUE_IS_INVALID,
            "Identifier must contain only latin letters",
        ));
    }
    Ok(())
}

pub fn validate_postal_code(postal_code: &str) -> Result<(), ValidationError> {
    if !POSTAL_CODE_REGEX.is_match(postal_code.trim()) {
        return Err(invalid(
            codes::VALUE_IS_INVALID,
            "Postal code must consist of exactly 6 digits",
        ));
    }
    Ok(())
}

/// 文字列が空白のみでないかをチェック
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid(
            codes::VALUE_IS_REQUIRED,
            "Field cannot be empty or contain only whitespace",
        ));
    }
    Ok(())
}

/// IANA タイムゾーン名かをチェック
pub fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    if timezone.trim().parse::<Tz>().is_err() {
        return Err(invalid(
            codes::VALUE_IS_INVALID,
            "Timezone must be a valid IANA time zone name",
        ));
    }
    Ok(())
}

/// ID リスト: 空でない、nil を含まない、重複しない
pub fn validate_id_list(ids: &[Uuid]) -> Result<(), ValidationError> {
    if ids.is_empty() {
        return Err(invalid(
            codes::VALUE_IS_REQUIRED,
            "At least one id is required",
        ));
    }
    if ids.iter().any(Uuid::is_nil) {
        return Err(invalid(codes::VALUE_IS_INVALID, "Ids must not be empty"));
    }
    if has_duplicates(ids) {
        return Err(invalid(
            codes::VALUE_IS_INVALID,
            "Ids must not contain duplicates",
        ));
    }
    Ok(())
}

pub fn has_duplicates(ids: &[Uuid]) -> bool {
    let mut seen = HashSet::with_capacity(ids.len());
    !ids.iter().all(|id| seen.insert(*id))
}

// =============================================================================
// テスト
// =============================================================================
