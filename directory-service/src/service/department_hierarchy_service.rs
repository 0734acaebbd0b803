// directory-service/src/service/department_hierarchy_service.rs

//! 部署の親付け替え
//!
//! 対象・新しい親・移動する部分木の全行をロックしてから、
//! 対象行を保存し、子孫のパスと深さを1文で書き換える。
//! ステップ 3 以降の失敗とキャンセルはすべてロールバックされる。

use chrono::Utc;
use sea_orm::IsolationLevel;
use std::fmt;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::path::checked_depth;
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::DepartmentRepository;
use crate::utils::error_helper::{codes, department_not_found, value_is_invalid};
use crate::utils::transaction::{ensure_not_cancelled, finish, TransactionManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReparentDepartmentCommand {
    pub department_id: Uuid,
    /// None ならルートに昇格する
    pub parent_id: Option<Uuid>,
}

/// 親付け替えの進行状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparentState {
    Validating,
    TransactionOpen,
    TargetLocked,
    ParentValidated,
    CycleChecked,
    DescendantsLocked,
    TargetUpdated,
    DescendantsRewritten,
    Committed,
    RolledBack,
}

impl ReparentState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReparentState::Committed | ReparentState::RolledBack)
    }

    /// 許可される遷移か
    pub fn can_transition_to(self, next: ReparentState) -> bool {
        use ReparentState::*;

        if self.is_terminal() {
            return false;
        }
        if next == RolledBack {
            return true;
        }
        matches!(
            (self, next),
            (Validating, TransactionOpen)
                | (TransactionOpen, TargetLocked)
                | (TargetLocked, ParentValidated)
                | (ParentValidated, CycleChecked)
                | (CycleChecked, DescendantsLocked)
                | (DescendantsLocked, TargetUpdated)
                | (TargetUpdated, DescendantsRewritten)
                | (DescendantsRewritten, Committed)
        )
    }
}

impl fmt::Display for ReparentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 状態遷移をトレースに残す
struct StateTracker {
    department_id: Uuid,
    state: ReparentState,
}

impl StateTracker {
    fn new(department_id: Uuid) -> Self {
        Self {
            department_id,
            state: ReparentState::Validating,
        }
    }

    fn advance(&mut self, next: ReparentState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid reparent transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(
            department_id = %self.department_id,
            from = %self.state,
            to = %next,
            "Reparent state changed"
        );
        self.state = next;
    }

    fn conclude<T>(&mut self, result: &AppResult<T>) {
        let next = if result.is_ok() {
            ReparentState::Committed
        } else {
            ReparentState::RolledBack
        };
        self.advance(next);
    }
}

pub struct DepartmentHierarchyService<M, R> {
    transactions: M,
    departments: R,
    max_depth: i16,
}

impl<M, R> DepartmentHierarchyService<M, R>
where
    M: TransactionManager,
    R: DepartmentRepository<M::Transaction>,
{
    pub fn new(transactions: M, departments: R, max_depth: i16) -> Self {
        Self {
            transactions,
            departments,
            max_depth,
        }
    }

    // 部署の親付け替え
    #[instrument(
        skip(self, cancel),
        fields(department_id = %command.department_id, parent_id = ?command.parent_id)
    )]
    pub async fn reparent(
        &self,
        command: ReparentDepartmentCommand,
        cancel: &CancellationToken,
    ) -> AppResult<Uuid> {
        let started = Instant::now();
        let mut tracker = StateTracker::new(command.department_id);

        if command.parent_id == Some(command.department_id) {
            tracker.advance(ReparentState::RolledBack);
            return Err(value_is_invalid(
                "parent_id",
                "A department cannot be its own parent",
            ));
        }

        let opened = match ensure_not_cancelled(cancel) {
            Ok(()) => {
                self.transactions
                    .begin_transaction(IsolationLevel::RepeatableRead)
                    .await
            }
            Err(e) => Err(e),
        };
        let txn = match opened {
            Ok(txn) => txn,
            Err(e) => {
                tracker.advance(ReparentState::RolledBack);
                return Err(e);
            }
        };
        tracker.advance(ReparentState::TransactionOpen);

        let result = self
            .reparent_in_transaction(&txn, command, cancel, &mut tracker)
            .await;
        let result = finish(txn, result, cancel, started).await;
        tracker.conclude(&result);

        match &result {
            Ok(_) => log_with_context!(
                tracing::Level::INFO,
                "Department reparented",
                "department_id" => command.department_id,
                "parent_id" => command.parent_id,
            ),
            Err(e) => log_with_context!(
                tracing::Level::WARN,
                "Department reparent failed",
                "department_id" => command.department_id,
                "parent_id" => command.parent_id,
                "error_code" => e.code(),
            ),
        }

        result
    }

    async fn reparent_in_transaction(
        &self,
        txn: &M::Transaction,
        command: ReparentDepartmentCommand,
        cancel: &CancellationToken,
        tracker: &mut StateTracker,
    ) -> AppResult<Uuid> {
        let mut target = self
            .departments
            .get_by_id_locked(txn, command.department_id)
            .await?
            .ok_or_else(|| department_not_found(command.department_id))?;
        tracker.advance(ReparentState::TargetLocked);
        ensure_not_cancelled(cancel)?;

        let parent = match command.parent_id {
            Some(parent_id) => Some(
                self.departments
                    .get_by_id_locked(txn, parent_id)
                    .await?
                    .ok_or_else(|| department_not_found(parent_id).with_field("parent_id"))?,
            ),
            None => None,
        };
        tracker.advance(ReparentState::ParentValidated);
        ensure_not_cancelled(cancel)?;

        if let Some(parent) = &parent {
            if self
                .departments
                .is_ancestor(txn, target.path(), parent.id())
                .await?
            {
                return Err(AppError::conflict(
                    codes::PARENT_IS_CONFLICT,
                    format!(
                        "Moving department {} under {} would create a cycle",
                        target.id(),
                        parent.id()
                    ),
                )
                .with_field("parent_id"));
            }
        }
        tracker.advance(ReparentState::CycleChecked);
        ensure_not_cancelled(cancel)?;

        let subtree = self
            .departments
            .lock_descendants(txn, target.path())
            .await?;
        tracker.advance(ReparentState::DescendantsLocked);
        ensure_not_cancelled(cancel)?;

        let change = target.update_parent(parent.as_ref(), Utc::now(), self.max_depth)?;
        if let Some(deepest) = subtree.deepest() {
            checked_depth(
                i64::from(deepest) + i64::from(change.depth_delta),
                self.max_depth,
            )?;
        }

        self.departments.save(txn, &target).await?;
        tracker.advance(ReparentState::TargetUpdated);
        ensure_not_cancelled(cancel)?;

        let rewritten = self
            .departments
            .rewrite_descendant_paths(txn, &change.old_path, &change.new_path)
            .await?;
        tracker.advance(ReparentState::DescendantsRewritten);

        log_with_context!(
            tracing::Level::DEBUG,
            "Descendant paths rewritten",
            "old_path" => change.old_path.as_str(),
            "new_path" => change.new_path.as_str(),
            "depth_delta" => change.depth_delta,
            "locked" => subtree.len(),
            "rewritten" => rewritten,
        );

        Ok(target.id())
    }
}
