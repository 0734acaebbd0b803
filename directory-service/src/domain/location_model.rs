use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub postal_code: String,
    pub region: String,
    pub city: String,
    pub street: String,
    pub house: String,
    pub apartment: Option<String>,
    pub timezone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::department_location_model::Entity")]
    DepartmentLocations,
}

impl Related<super::department_location_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DepartmentLocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
