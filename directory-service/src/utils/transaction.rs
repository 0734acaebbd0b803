// directory-service/src/utils/transaction.rs

//! トランザクション管理の統一化
//!
//! サービス層はこのポート越しにトランザクションを開始・確定・破棄する。
//! sea-orm 実装のほか、テストではインメモリ実装を差し込む。

use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

// =============================================================================
// トランザクションポート
// =============================================================================

/// 開始済みトランザクション。commit も rollback もされずに drop された場合はロールバックされる
#[async_trait]
pub trait TransactionScope: Send + Sync + Sized {
    async fn commit(self) -> AppResult<()>;
    async fn rollback(self) -> AppResult<()>;
}

/// トランザクションの開始を抽象化するトレイト
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// トランザクション外の読み取りに使う接続
    type Connection: Send + Sync;
    type Transaction: TransactionScope;

    fn connection(&self) -> &Self::Connection;

    async fn begin_transaction(&self, isolation: IsolationLevel) -> AppResult<Self::Transaction>;
}

// =============================================================================
// sea-orm 実装
// =============================================================================

#[derive(Clone, Debug)]
pub struct DbTransactionManager {
    db: DatabaseConnection,
}

impl DbTransactionManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionManager for DbTransactionManager {
    type Connection = DatabaseConnection;
    type Transaction = DatabaseTransaction;

    fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn begin_transaction(&self, isolation: IsolationLevel) -> AppResult<DatabaseTransaction> {
        debug!(isolation = ?isolation, "Starting database transaction");

        self.db
            .begin_with_config(Some(isolation), None)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to begin transaction");
                AppError::from(e)
            })
    }
}

#[async_trait]
impl TransactionScope for DatabaseTransaction {
    async fn commit(self) -> AppResult<()> {
        DatabaseTransaction::commit(self).await.map_err(|e| {
            error!(error = %e, "Failed to commit transaction");
            AppError::from(e)
        })
    }

    async fn rollback(self) -> AppResult<()> {
        DatabaseTransaction::rollback(self).await.map_err(|e| {
            error!(error = %e, "Failed to rollback transaction");
            AppError::from(e)
        })
    }
}

// =============================================================================
// キャンセルと確定処理
// =============================================================================

pub const OPERATION_CANCELLED: &str = "operation.cancelled";

/// キャンセル要求を観測したら FAILURE を返す
pub fn ensure_not_cancelled(cancel: &CancellationToken) -> AppResult<()> {
    if cancel.is_cancelled() {
        warn!("Operation cancelled");
        return Err(AppError::failure(
            OPERATION_CANCELLED,
            "The operation was cancelled",
        ));
    }
    Ok(())
}

/// 処理結果に応じてトランザクションを確定または破棄する
///
/// 成功時でも確定直前にキャンセルを観測した場合はロールバックする。
/// ロールバック自体が失敗しても、呼び出し元には元のエラーを返す。
pub async fn finish<T, R>(
    txn: T,
    result: AppResult<R>,
    cancel: &CancellationToken,
    started: Instant,
) -> AppResult<R>
where
    T: TransactionScope,
{
    let result = result.and_then(|value| ensure_not_cancelled(cancel).map(|()| value));

    match result {
        Ok(value) => {
            debug!("Transaction operation successful, committing");
            txn.commit().await?;

            info!(
                duration_ms = started.elapsed().as_millis(),
                "Transaction completed successfully"
            );
            Ok(value)
        }
        Err(app_error) => {
            warn!(error = %app_error, "Transaction operation failed, rolling back");

            if let Err(rollback_error) = txn.rollback().await {
                error!(
                    original_error = %app_error,
                    rollback_error = %rollback_error,
                    "Failed to rollback transaction"
                );
            }

            warn!(
                duration_ms = started.elapsed().as_millis(),
                "Transaction rolled back"
            );
            Err(app_error)
        }
    }
}
