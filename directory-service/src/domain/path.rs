// directory-service/src/domain/path.rs

//! 部署階層のマテリアライズドパス
//!
//! パスは祖先の識別子を `.` で連結した文字列（`root.child.grandchild`）。
//! 深さはセグメント数 - 1 で、ルートは 0。部分木はプレフィックス一致で求める。

use std::fmt;

use crate::error::{AppError, AppResult};
use crate::utils::error_helper::codes;
use crate::utils::validation::IDENTIFIER_REGEX;

pub const SEPARATOR: char = '.';

/// 設定可能な深さ上限の最大値（depth 列は smallint）
pub const MAX_DEPTH_CEILING: i16 = i16::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepartmentPath(String);

impl DepartmentPath {
    /// ルート部署のパス（識別子そのもの）
    pub fn root(identifier: &str) -> Self {
        Self(identifier.to_string())
    }

    /// 親パスの直下に識別子を連結したパス
    pub fn child_of(parent: &DepartmentPath, identifier: &str) -> Self {
        Self(format!("{}{}{}", parent.0, SEPARATOR, identifier))
    }

    /// 保存済みの値からパスを復元する。各セグメントは識別子の形式でなければならない
    pub fn parse(value: &str) -> AppResult<Self> {
        if value.split(SEPARATOR).all(|segment| IDENTIFIER_REGEX.is_match(segment)) {
            Ok(Self(value.to_string()))
        } else {
            Err(AppError::validation(
                codes::VALUE_IS_INVALID,
                format!("'{}' is not a valid department path", value),
            )
            .with_field("path"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    pub fn segment_count(&self) -> usize {
        self.segments().count()
    }

    /// 祖先の数（ルートは 0）
    pub fn depth(&self) -> usize {
        self.segment_count() - 1
    }

    /// 末尾のセグメント（自身の識別子）
    pub fn identifier(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }

    /// `ancestor + "."` で始まるとき真（自身は含まない）
    pub fn is_descendant_of(&self, ancestor: &DepartmentPath) -> bool {
        self.0.len() > ancestor.0.len()
            && self.0.starts_with(&ancestor.0)
            && self.0[ancestor.0.len()..].starts_with(SEPARATOR)
    }

    pub fn is_self_or_descendant_of(&self, ancestor: &DepartmentPath) -> bool {
        self == ancestor || self.is_descendant_of(ancestor)
    }

    /// `old_prefix` 配下のパスを `new_prefix` 配下へ付け替える
    ///
    /// `old_prefix` 自身か、その子孫でなければ None。
    pub fn rebase(
        &self,
        old_prefix: &DepartmentPath,
        new_prefix: &DepartmentPath,
    ) -> Option<DepartmentPath> {
        if !self.is_self_or_descendant_of(old_prefix) {
            return None;
        }
        Some(Self(format!(
            "{}{}",
            new_prefix.0,
            &self.0[old_prefix.0.len()..]
        )))
    }

    /// 付け替えによる深さの変化量
    pub fn depth_delta(old_prefix: &DepartmentPath, new_prefix: &DepartmentPath) -> i32 {
        new_prefix.depth() as i32 - old_prefix.depth() as i32
    }
}

impl fmt::Display for DepartmentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DepartmentPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 深さが上限以内かを確認し、保存用の値に変換する
pub fn checked_depth(depth: i64, max_depth: i16) -> AppResult<i16> {
    let limit = max_depth.clamp(0, MAX_DEPTH_CEILING);
    if depth < 0 || depth > i64::from(limit) {
        return Err(AppError::validation(
            codes::DEPTH_LIMIT_EXCEEDED,
            format!("Department depth {} exceeds the limit of {}", depth, limit),
        )
        .with_field("parent_id"));
    }
    // limit は i16 の範囲内
    Ok(depth as i16)
}
