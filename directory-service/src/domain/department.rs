// directory-service/src/domain/department.rs

//! 部署集約
//!
//! 階層上の位置（親・パス・深さ）と、所有する拠点・役職の関連レコードを持つ。
//! 関連レコードは集約のメソッド経由でのみ変更でき、外部には読み取り専用で公開する。

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::bounded_text;
use super::department_model;
use super::path::{checked_depth, DepartmentPath};
use crate::error::{AppError, AppResult};
use crate::utils::error_helper::{codes, from_validation_error, value_is_invalid};
use crate::utils::validation::{department as limits, validate_id_list, validate_identifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentName(String);

impl DepartmentName {
    pub fn new(value: &str) -> AppResult<Self> {
        bounded_text("name", value, limits::NAME_MIN_LENGTH, limits::NAME_MAX_LENGTH).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 部署識別子。パスの1セグメントになる
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: &str) -> AppResult<Self> {
        let value = value.trim();
        validate_identifier(value).map_err(|e| from_validation_error("identifier", e))?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepartmentLocation {
    pub department_id: Uuid,
    pub location_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepartmentPosition {
    pub department_id: Uuid,
    pub position_id: Uuid,
}

/// 付け替え前後のパスと深さの変化量
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    pub old_path: DepartmentPath,
    pub new_path: DepartmentPath,
    pub depth_delta: i32,
}

#[derive(Debug, Clone)]
pub struct Department {
    id: Uuid,
    name: DepartmentName,
    identifier: Identifier,
    parent_id: Option<Uuid>,
    path: DepartmentPath,
    depth: i16,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    locations: Vec<DepartmentLocation>,
    positions: Vec<DepartmentPosition>,
}

impl Department {
    pub fn create_root(
        name: DepartmentName,
        identifier: Identifier,
        location_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let path = DepartmentPath::root(identifier.as_str());
        Self::build(name, identifier, None, path, 0, location_ids, now)
    }

    pub fn create_child(
        name: DepartmentName,
        identifier: Identifier,
        parent: &Department,
        location_ids: &[Uuid],
        now: DateTime<Utc>,
        max_depth: i16,
    ) -> AppResult<Self> {
        if !parent.is_active {
            return Err(AppError::not_found(
                codes::DEPARTMENT_NOT_FOUND,
                format!("Parent department {} is not active", parent.id),
            )
            .with_field("parent_id"));
        }

        let path = DepartmentPath::child_of(&parent.path, identifier.as_str());
        let depth = checked_depth(path.depth() as i64, max_depth)?;
        Self::build(
            name,
            identifier,
            Some(parent.id),
            path,
            depth,
            location_ids,
            now,
        )
    }

    fn build(
        name: DepartmentName,
        identifier: Identifier,
        parent_id: Option<Uuid>,
        path: DepartmentPath,
        depth: i16,
        location_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        validate_id_list(location_ids).map_err(|e| from_validation_error("location_ids", e))?;

        let id = Uuid::new_v4();
        Ok(Self {
            id,
            name,
            identifier,
            parent_id,
            path,
            depth,
            is_active: true,
            created_at: now,
            updated_at: now,
            locations: location_links(id, location_ids),
            positions: Vec::new(),
        })
    }

    /// 保存済みの行と関連レコードから集約を復元する
    pub fn from_model(
        model: department_model::Model,
        location_ids: Vec<Uuid>,
        position_ids: Vec<Uuid>,
    ) -> AppResult<Self> {
        let path = DepartmentPath::parse(&model.path)?;
        if path.depth() != model.depth as usize || path.identifier() != model.identifier {
            return Err(AppError::failure(
                codes::SERVER_FAILURE,
                format!("Department {} has an inconsistent path", model.id),
            ));
        }

        Ok(Self {
            id: model.id,
            name: DepartmentName(model.name),
            identifier: Identifier(model.identifier),
            parent_id: model.parent_id,
            path,
            depth: model.depth,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            locations: location_links(model.id, &location_ids),
            positions: position_ids
                .into_iter()
                .map(|position_id| DepartmentPosition {
                    department_id: model.id,
                    position_id,
                })
                .collect(),
        })
    }

    pub fn to_model(&self) -> department_model::Model {
        department_model::Model {
            id: self.id,
            name: self.name.as_str().to_string(),
            identifier: self.identifier.as_str().to_string(),
            parent_id: self.parent_id,
            path: self.path.as_str().to_string(),
            depth: self.depth,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// 親を付け替え、自身のパスと深さを再計算する（子孫の書き換えは呼び出し側）
    ///
    /// `parent` が None ならルートに昇格する。
    pub fn update_parent(
        &mut self,
        parent: Option<&Department>,
        now: DateTime<Utc>,
        max_depth: i16,
    ) -> AppResult<PathChange> {
        let new_path = match parent {
            Some(parent) => {
                if parent.id == self.id {
                    return Err(value_is_invalid(
                        "parent_id",
                        "A department cannot be its own parent",
                    ));
                }
                if parent.path.is_self_or_descendant_of(&self.path) {
                    return Err(AppError::conflict(
                        codes::PARENT_IS_CONFLICT,
                        format!(
                            "Department {} is inside the subtree of {}",
                            parent.id, self.id
                        ),
                    )
                    .with_field("parent_id"));
                }
                DepartmentPath::child_of(&parent.path, self.identifier.as_str())
            }
            None => DepartmentPath::root(self.identifier.as_str()),
        };

        let new_depth = checked_depth(new_path.depth() as i64, max_depth)?;
        let depth_delta = DepartmentPath::depth_delta(&self.path, &new_path);
        let old_path = std::mem::replace(&mut self.path, new_path.clone());

        self.parent_id = parent.map(|parent| parent.id);
        self.depth = new_depth;
        self.touch(now);

        Ok(PathChange {
            old_path,
            new_path,
            depth_delta,
        })
    }

    /// 拠点の関連を丸ごと置き換える
    pub fn replace_locations(&mut self, location_ids: &[Uuid], now: DateTime<Utc>) -> AppResult<()> {
        validate_id_list(location_ids).map_err(|e| from_validation_error("location_ids", e))?;
        self.locations = location_links(self.id, location_ids);
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &DepartmentName {
        &self.name
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    pub fn path(&self) -> &DepartmentPath {
        &self.path
    }

    pub fn depth(&self) -> i16 {
        self.depth
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn locations(&self) -> &[DepartmentLocation] {
        &self.locations
    }

    pub fn location_ids(&self) -> Vec<Uuid> {
        self.locations.iter().map(|link| link.location_id).collect()
    }

    pub fn positions(&self) -> &[DepartmentPosition] {
        &self.positions
    }
}

fn location_links(department_id: Uuid, location_ids: &[Uuid]) -> Vec<DepartmentLocation> {
    location_ids
        .iter()
        .map(|&location_id| DepartmentLocation {
            department_id,
            location_id,
        })
        .collect()
}
