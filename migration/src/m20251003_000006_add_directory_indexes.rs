use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// 一意性は「有効なレコード」の間だけで保証するため、部分インデックスは SQL で作成する
const UP_STATEMENTS: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_departments_active_identifier \
     ON departments (identifier) WHERE is_active = TRUE",
    "CREATE INDEX IF NOT EXISTS idx_departments_path_prefix \
     ON departments (path text_pattern_ops)",
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_locations_active_name \
     ON locations (name) WHERE is_active = TRUE",
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_positions_active_name \
     ON positions (name) WHERE is_active = TRUE",
];

const DOWN_STATEMENTS: &[&str] = &[
    "DROP INDEX IF EXISTS uq_positions_active_name",
    "DROP INDEX IF EXISTS uq_locations_active_name",
    "DROP INDEX IF EXISTS idx_departments_path_prefix",
    "DROP INDEX IF EXISTS uq_departments_active_identifier",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for statement in UP_STATEMENTS {
            db.execute_unprepared(statement).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for statement in DOWN_STATEMENTS {
            db.execute_unprepared(statement).await?;
        }
        Ok(())
    }
}
