use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Locations::Name).string_len(120).not_null())
                    .col(
                        ColumnDef::new(Locations::PostalCode)
                            .string_len(6)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Locations::Region).string_len(100).not_null())
                    .col(ColumnDef::new(Locations::City).string_len(100).not_null())
                    .col(ColumnDef::new(Locations::Street).string_len(100).not_null())
                    .col(ColumnDef::new(Locations::House).string_len(10).not_null())
                    .col(ColumnDef::new(Locations::Apartment).string_len(10))
                    .col(ColumnDef::new(Locations::Timezone).text().not_null())
                    .col(
                        ColumnDef::new(Locations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Locations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Locations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    Name,
    PostalCode,
    Region,
    City,
    Street,
    House,
    Apartment,
    Timezone,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
