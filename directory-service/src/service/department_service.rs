// directory-service/src/service/department_service.rs

use chrono::Utc;
use sea_orm::IsolationLevel;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::department::{Department, DepartmentName, Identifier};
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::{DepartmentRepository, LocationRepository};
use crate::utils::error_helper::{
    already_exists, codes, department_not_found, from_validation_error, location_not_found,
    on_unique_violation,
};
use crate::utils::transaction::{ensure_not_cancelled, finish, TransactionManager};
use crate::utils::validation::validate_id_list;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDepartmentCommand {
    pub name: String,
    pub identifier: String,
    pub parent_id: Option<Uuid>,
    pub location_ids: Vec<Uuid>,
}

pub struct DepartmentService<M, R, L> {
    transactions: M,
    departments: R,
    locations: L,
    max_depth: i16,
}

impl<M, R, L> DepartmentService<M, R, L>
where
    M: TransactionManager,
    R: DepartmentRepository<M::Transaction>,
    L: LocationRepository<M::Connection>,
{
    pub fn new(transactions: M, departments: R, locations: L, max_depth: i16) -> Self {
        Self {
            transactions,
            departments,
            locations,
            max_depth,
        }
    }

    // 部署の作成
    #[instrument(skip(self, command, cancel), fields(identifier = %command.identifier))]
    pub async fn create_department(
        &self,
        command: CreateDepartmentCommand,
        cancel: &CancellationToken,
    ) -> AppResult<Uuid> {
        let started = Instant::now();

        let name = DepartmentName::new(&command.name);
        let identifier = Identifier::new(&command.identifier);
        let location_list = validate_id_list(&command.location_ids)
            .map_err(|e| from_validation_error("location_ids", e));
        let (name, identifier) = match (name, identifier, location_list) {
            (Ok(name), Ok(identifier), Ok(())) => (name, identifier),
            (name, identifier, location_list) => {
                return Err(
                    AppError::combine([name.err(), identifier.err(), location_list.err()])
                        .unwrap_or_else(|| {
                            AppError::validation(codes::VALUE_IS_INVALID, "Invalid command")
                        }),
                );
            }
        };

        ensure_not_cancelled(cancel)?;
        if !self
            .locations
            .active_locations_exist(self.transactions.connection(), &command.location_ids)
            .await?
        {
            return Err(location_not_found());
        }

        let txn = self
            .transactions
            .begin_transaction(IsolationLevel::ReadCommitted)
            .await?;

        let result = async {
            if self
                .departments
                .active_identifier_exists(&txn, identifier.as_str())
                .await?
            {
                return Err(already_exists("identifier", identifier.as_str()));
            }
            ensure_not_cancelled(cancel)?;

            let now = Utc::now();
            let department = match command.parent_id {
                Some(parent_id) => {
                    // 親行をロックして書き換え、同じ部分木の付け替えと直列化する
                    let parent = self
                        .departments
                        .get_by_id_locked(&txn, parent_id)
                        .await?
                        .ok_or_else(|| department_not_found(parent_id).with_field("parent_id"))?;
                    self.departments.mark_modified(&txn, parent.id()).await?;
                    Department::create_child(
                        name,
                        identifier,
                        &parent,
                        &command.location_ids,
                        now,
                        self.max_depth,
                    )?
                }
                None => Department::create_root(name, identifier, &command.location_ids, now)?,
            };
            ensure_not_cancelled(cancel)?;

            self.departments
                .add(&txn, &department)
                .await
                .map_err(|e| {
                    on_unique_violation(e, || {
                        already_exists("identifier", department.identifier().as_str())
                    })
                })?;

            Ok(department)
        }
        .await;

        let department = finish(txn, result, cancel, started).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Department created",
            "department_id" => department.id(),
            "path" => department.path().as_str(),
            "depth" => department.depth(),
        );

        Ok(department.id())
    }
}
