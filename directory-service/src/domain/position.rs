// directory-service/src/domain/position.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::bounded_text;
use super::position_model;
use crate::error::AppResult;
use crate::utils::error_helper::{from_validation_error, value_is_invalid};
use crate::utils::validation::{position as limits, validate_id_list};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionName(String);

impl PositionName {
    pub fn new(value: &str) -> AppResult<Self> {
        bounded_text("name", value, limits::NAME_MIN_LENGTH, limits::NAME_MAX_LENGTH).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 任意の説明文（空文字は未指定扱い）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Description(Option<String>);

impl Description {
    pub fn new(value: Option<&str>) -> AppResult<Self> {
        let value = value.map(str::trim).filter(|value| !value.is_empty());
        if let Some(value) = value {
            if value.chars().count() as u64 > limits::DESCRIPTION_MAX_LENGTH {
                return Err(value_is_invalid(
                    "description",
                    format!(
                        "description must be at most {} characters",
                        limits::DESCRIPTION_MAX_LENGTH
                    ),
                ));
            }
        }
        Ok(Self(value.map(str::to_string)))
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct Position {
    id: Uuid,
    name: PositionName,
    description: Description,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    department_ids: Vec<Uuid>,
}

impl Position {
    /// 役職は1つ以上の部署に所属させて作成する
    pub fn create(
        name: PositionName,
        description: Description,
        department_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        validate_id_list(department_ids)
            .map_err(|e| from_validation_error("department_ids", e))?;

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description,
            is_active: true,
            created_at: now,
            updated_at: now,
            department_ids: department_ids.to_vec(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &PositionName {
        &self.name
    }

    pub fn department_ids(&self) -> &[Uuid] {
        &self.department_ids
    }

    pub fn to_model(&self) -> position_model::Model {
        position_model::Model {
            id: self.id,
            name: self.name.as_str().to_string(),
            description: self.description.as_deref().map(str::to_string),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
