// directory-service/src/service/position_service.rs

use chrono::Utc;
use sea_orm::IsolationLevel;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::position::{Description, Position, PositionName};
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::{DepartmentRepository, PositionRepository};
use crate::utils::error_helper::{already_exists, codes, on_unique_violation};
use crate::utils::transaction::{ensure_not_cancelled, finish, TransactionManager};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePositionCommand {
    pub name: String,
    pub description: Option<String>,
    pub department_ids: Vec<Uuid>,
}

pub struct PositionService<M, P, D> {
    transactions: M,
    positions: P,
    departments: D,
}

impl<M, P, D> PositionService<M, P, D>
where
    M: TransactionManager,
    P: PositionRepository<M::Transaction>,
    D: DepartmentRepository<M::Transaction>,
{
    pub fn new(transactions: M, positions: P, departments: D) -> Self {
        Self {
            transactions,
            positions,
            departments,
        }
    }

    // 役職の作成
    #[instrument(skip(self, command, cancel), fields(name = %command.name))]
    pub async fn create_position(
        &self,
        command: CreatePositionCommand,
        cancel: &CancellationToken,
    ) -> AppResult<Uuid> {
        let started = Instant::now();

        let name = PositionName::new(&command.name);
        let description = Description::new(command.description.as_deref());
        let position = match (name, description) {
            (Ok(name), Ok(description)) => {
                Position::create(name, description, &command.department_ids, Utc::now())?
            }
            (name, description) => {
                return Err(AppError::combine([name.err(), description.err()]).unwrap_or_else(
                    || AppError::validation(codes::VALUE_IS_INVALID, "Invalid command"),
                ));
            }
        };
        ensure_not_cancelled(cancel)?;

        let txn = self
            .transactions
            .begin_transaction(IsolationLevel::ReadCommitted)
            .await?;

        let result = async {
            if self
                .positions
                .active_name_exists(&txn, position.name().as_str())
                .await?
            {
                return Err(already_exists("name", position.name().as_str()));
            }
            if !self
                .departments
                .active_departments_exist(&txn, position.department_ids())
                .await?
            {
                return Err(AppError::not_found(
                    codes::DEPARTMENT_NOT_FOUND,
                    "One or more departments do not exist or are inactive",
                )
                .with_field("department_ids"));
            }
            ensure_not_cancelled(cancel)?;

            self.positions
                .add(&txn, &position)
                .await
                .map_err(|e| {
                    on_unique_violation(e, || already_exists("name", position.name().as_str()))
                })?;
            Ok(position.id())
        }
        .await;

        let position_id = finish(txn, result, cancel, started).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Position created",
            "position_id" => position_id,
            "departments" => position.department_ids().len(),
        );

        Ok(position_id)
    }
}
