use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub identifier: String,
    pub parent_id: Option<Uuid>,
    pub path: String,
    pub depth: i16,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "Restrict"
    )]
    Parent,
    #[sea_orm(has_many = "super::department_location_model::Entity")]
    DepartmentLocations,
    #[sea_orm(has_many = "super::department_position_model::Entity")]
    DepartmentPositions,
}

impl Related<super::department_location_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DepartmentLocations.def()
    }
}

impl Related<super::department_position_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DepartmentPositions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
