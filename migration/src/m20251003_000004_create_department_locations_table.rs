use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DepartmentLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DepartmentLocations::DepartmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepartmentLocations::LocationId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_department_locations")
                            .col(DepartmentLocations::DepartmentId)
                            .col(DepartmentLocations::LocationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_locations_department")
                            .from(DepartmentLocations::Table, DepartmentLocations::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_locations_location")
                            .from(DepartmentLocations::Table, DepartmentLocations::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_department_locations_location_id")
                    .table(DepartmentLocations::Table)
                    .col(DepartmentLocations::LocationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DepartmentLocations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DepartmentLocations {
    Table,
    DepartmentId,
    LocationId,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
}
