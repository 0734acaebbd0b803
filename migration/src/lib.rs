// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// ディレクトリ（部門・拠点・役職）マイグレーション
mod m20251003_000001_create_locations_table;
mod m20251003_000002_create_departments_table;
mod m20251003_000003_create_positions_table;
mod m20251003_000004_create_department_locations_table;
mod m20251003_000005_create_department_positions_table;

// インデックス
mod m20251003_000006_add_directory_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. 基本テーブル作成（依存関係なし）
            Box::new(m20251003_000001_create_locations_table::Migration),
            Box::new(m20251003_000002_create_departments_table::Migration),
            Box::new(m20251003_000003_create_positions_table::Migration),
            // 2. 関連テーブル作成（departments / locations / positions に依存）
            Box::new(m20251003_000004_create_department_locations_table::Migration),
            Box::new(m20251003_000005_create_department_positions_table::Migration),
            // 3. 部分一意インデックスとパス検索用インデックス
            Box::new(m20251003_000006_add_directory_indexes::Migration),
        ]
    }
}
