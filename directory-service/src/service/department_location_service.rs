// directory-service/src/service/department_location_service.rs

use chrono::Utc;
use sea_orm::IsolationLevel;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::{DepartmentRepository, LocationRepository};
use crate::utils::error_helper::{department_not_found, from_validation_error, location_not_found};
use crate::utils::transaction::{ensure_not_cancelled, finish, TransactionManager};
use crate::utils::validation::validate_id_list;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceLocationsCommand {
    pub department_id: Uuid,
    pub location_ids: Vec<Uuid>,
}

/// 部署に紐づく拠点の集合を置き換える
pub struct DepartmentLocationService<M, R, L> {
    transactions: M,
    departments: R,
    locations: L,
}

impl<M, R, L> DepartmentLocationService<M, R, L>
where
    M: TransactionManager,
    R: DepartmentRepository<M::Transaction>,
    L: LocationRepository<M::Connection>,
{
    pub fn new(transactions: M, departments: R, locations: L) -> Self {
        Self {
            transactions,
            departments,
            locations,
        }
    }

    #[instrument(
        skip(self, command, cancel),
        fields(department_id = %command.department_id, count = command.location_ids.len())
    )]
    pub async fn replace_locations(
        &self,
        command: ReplaceLocationsCommand,
        cancel: &CancellationToken,
    ) -> AppResult<Uuid> {
        let started = Instant::now();

        validate_id_list(&command.location_ids)
            .map_err(|e| from_validation_error("location_ids", e))?;
        ensure_not_cancelled(cancel)?;

        // 書き込み前に拠点の存在を確認する
        if !self
            .locations
            .active_locations_exist(self.transactions.connection(), &command.location_ids)
            .await?
        {
            return Err(location_not_found());
        }
        ensure_not_cancelled(cancel)?;

        let txn = self
            .transactions
            .begin_transaction(IsolationLevel::ReadCommitted)
            .await?;

        let result = async {
            let mut department = self
                .departments
                .get_by_id_locked(&txn, command.department_id)
                .await?
                .ok_or_else(|| department_not_found(command.department_id))?;
            ensure_not_cancelled(cancel)?;

            department.replace_locations(&command.location_ids, Utc::now())?;

            let removed = self
                .departments
                .delete_location_links(&txn, department.id())
                .await?;
            ensure_not_cancelled(cancel)?;

            self.departments
                .insert_location_links(&txn, department.id(), &department.location_ids())
                .await?;
            self.departments.save(&txn, &department).await?;

            Ok((department.id(), removed))
        }
        .await;

        let (department_id, removed) = finish(txn, result, cancel, started).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Department locations replaced",
            "department_id" => department_id,
            "removed" => removed,
            "added" => command.location_ids.len(),
        );

        Ok(department_id)
    }
}
