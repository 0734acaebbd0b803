// directory-service/src/repository/location_repository.rs

use async_trait::async_trait;
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::domain::location::{Address, Location};
use crate::domain::location_model::{self, Entity as LocationEntity};
use crate::error::AppResult;

#[async_trait]
pub trait LocationRepository<C: Send + Sync>: Send + Sync {
    /// すべての ID が有効な拠点を指すなら真
    async fn active_locations_exist(&self, conn: &C, ids: &[Uuid]) -> AppResult<bool>;

    async fn active_name_exists(&self, conn: &C, name: &str) -> AppResult<bool>;

    async fn active_address_exists(&self, conn: &C, address: &Address) -> AppResult<bool>;

    async fn add(&self, conn: &C, location: &Location) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmLocationRepository;

impl SeaOrmLocationRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<C> LocationRepository<C> for SeaOrmLocationRepository
where
    C: ConnectionTrait + Send + Sync,
{
    async fn active_locations_exist(&self, conn: &C, ids: &[Uuid]) -> AppResult<bool> {
        if ids.is_empty() {
            return Ok(true);
        }

        let count = LocationEntity::find()
            .filter(location_model::Column::Id.is_in(ids.iter().copied()))
            .filter(location_model::Column::IsActive.eq(true))
            .count(conn)
            .await?;

        Ok(count == ids.len() as u64)
    }

    async fn active_name_exists(&self, conn: &C, name: &str) -> AppResult<bool> {
        let count = LocationEntity::find()
            .filter(location_model::Column::Name.eq(name))
            .filter(location_model::Column::IsActive.eq(true))
            .count(conn)
            .await?;

        Ok(count > 0)
    }

    async fn active_address_exists(&self, conn: &C, address: &Address) -> AppResult<bool> {
        let mut query = LocationEntity::find()
            .filter(location_model::Column::PostalCode.eq(address.postal_code()))
            .filter(location_model::Column::Region.eq(address.region()))
            .filter(location_model::Column::City.eq(address.city()))
            .filter(location_model::Column::Street.eq(address.street()))
            .filter(location_model::Column::House.eq(address.house()))
            .filter(location_model::Column::IsActive.eq(true));

        query = match address.apartment() {
            Some(apartment) => query.filter(location_model::Column::Apartment.eq(apartment)),
            None => query.filter(location_model::Column::Apartment.is_null()),
        };

        Ok(query.count(conn).await? > 0)
    }

    async fn add(&self, conn: &C, location: &Location) -> AppResult<()> {
        let model = location.to_model();
        let active = location_model::ActiveModel {
            id: Set(model.id),
            name: Set(model.name),
            postal_code: Set(model.postal_code),
            region: Set(model.region),
            city: Set(model.city),
            street: Set(model.street),
            house: Set(model.house),
            apartment: Set(model.apartment),
            timezone: Set(model.timezone),
            is_active: Set(model.is_active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        };

        LocationEntity::insert(active)
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }
}
