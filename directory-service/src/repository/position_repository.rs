// directory-service/src/repository/position_repository.rs

use async_trait::async_trait;
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::domain::department_position_model::{self, Entity as DepartmentPositionEntity};
use crate::domain::position::Position;
use crate::domain::position_model::{self, Entity as PositionEntity};
use crate::error::AppResult;

#[async_trait]
pub trait PositionRepository<C: Send + Sync>: Send + Sync {
    async fn active_name_exists(&self, conn: &C, name: &str) -> AppResult<bool>;

    /// 役職と部署への関連を追加する
    async fn add(&self, conn: &C, position: &Position) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmPositionRepository;

impl SeaOrmPositionRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<C> PositionRepository<C> for SeaOrmPositionRepository
where
    C: ConnectionTrait + Send + Sync,
{
    async fn active_name_exists(&self, conn: &C, name: &str) -> AppResult<bool> {
        let count = PositionEntity::find()
            .filter(position_model::Column::Name.eq(name))
            .filter(position_model::Column::IsActive.eq(true))
            .count(conn)
            .await?;

        Ok(count > 0)
    }

    async fn add(&self, conn: &C, position: &Position) -> AppResult<()> {
        let model = position.to_model();
        let active = position_model::ActiveModel {
            id: Set(model.id),
            name: Set(model.name),
            description: Set(model.description),
            is_active: Set(model.is_active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        };
        PositionEntity::insert(active)
            .exec_without_returning(conn)
            .await?;

        if !position.department_ids().is_empty() {
            let links = position
                .department_ids()
                .iter()
                .map(|&department_id| department_position_model::ActiveModel {
                    department_id: Set(department_id),
                    position_id: Set(model.id),
                });
            DepartmentPositionEntity::insert_many(links)
                .exec_without_returning(conn)
                .await?;
        }

        Ok(())
    }
}
