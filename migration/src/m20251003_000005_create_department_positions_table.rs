use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DepartmentPositions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DepartmentPositions::DepartmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepartmentPositions::PositionId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_department_positions")
                            .col(DepartmentPositions::DepartmentId)
                            .col(DepartmentPositions::PositionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_positions_department")
                            .from(DepartmentPositions::Table, DepartmentPositions::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_positions_position")
                            .from(DepartmentPositions::Table, DepartmentPositions::PositionId)
                            .to(Positions::Table, Positions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_department_positions_position_id")
                    .table(DepartmentPositions::Table)
                    .col(DepartmentPositions::PositionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DepartmentPositions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DepartmentPositions {
    Table,
    DepartmentId,
    PositionId,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Positions {
    Table,
    Id,
}
