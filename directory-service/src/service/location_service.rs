// directory-service/src/service/location_service.rs

use chrono::Utc;
use sea_orm::IsolationLevel;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::location::{Address, Location, LocationName, Timezone};
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::LocationRepository;
use crate::utils::error_helper::{already_exists, codes, on_unique_violation};
use crate::utils::transaction::{ensure_not_cancelled, finish, TransactionManager};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInput {
    pub postal_code: String,
    pub region: String,
    pub city: String,
    pub street: String,
    pub house: String,
    pub apartment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLocationCommand {
    pub name: String,
    pub address: AddressInput,
    pub timezone: String,
}

pub struct LocationService<M, L> {
    transactions: M,
    locations: L,
}

impl<M, L> LocationService<M, L>
where
    M: TransactionManager,
    L: LocationRepository<M::Transaction>,
{
    pub fn new(transactions: M, locations: L) -> Self {
        Self {
            transactions,
            locations,
        }
    }

    // 拠点の作成
    #[instrument(skip(self, command, cancel), fields(name = %command.name))]
    pub async fn create_location(
        &self,
        command: CreateLocationCommand,
        cancel: &CancellationToken,
    ) -> AppResult<Uuid> {
        let started = Instant::now();

        let name = LocationName::new(&command.name);
        let address = Address::new(
            &command.address.postal_code,
            &command.address.region,
            &command.address.city,
            &command.address.street,
            &command.address.house,
            command.address.apartment.as_deref(),
        );
        let timezone = Timezone::new(&command.timezone);
        let location = match (name, address, timezone) {
            (Ok(name), Ok(address), Ok(timezone)) => {
                Location::create(name, address, timezone, Utc::now())
            }
            (name, address, timezone) => {
                return Err(
                    AppError::combine([name.err(), address.err(), timezone.err()])
                        .unwrap_or_else(|| {
                            AppError::validation(codes::VALUE_IS_INVALID, "Invalid command")
                        }),
                );
            }
        };
        ensure_not_cancelled(cancel)?;

        let txn = self
            .transactions
            .begin_transaction(IsolationLevel::ReadCommitted)
            .await?;

        let result = async {
            if self
                .locations
                .active_name_exists(&txn, location.name().as_str())
                .await?
            {
                return Err(already_exists("name", location.name().as_str()));
            }
            if self
                .locations
                .active_address_exists(&txn, location.address())
                .await?
            {
                return Err(AppError::validation(
                    codes::RECORD_ALREADY_EXIST,
                    "A location with the same address already exists",
                )
                .with_field("address"));
            }
            ensure_not_cancelled(cancel)?;

            self.locations
                .add(&txn, &location)
                .await
                .map_err(|e| {
                    on_unique_violation(e, || already_exists("name", location.name().as_str()))
                })?;
            Ok(location.id())
        }
        .await;

        let location_id = finish(txn, result, cancel, started).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Location created",
            "location_id" => location_id,
            "timezone" => location.timezone().name(),
        );

        Ok(location_id)
    }
}
