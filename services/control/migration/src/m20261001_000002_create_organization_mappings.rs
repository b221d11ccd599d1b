use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrganizationMappings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationMappings::OrganizationId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationMappings::Slug)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(OrganizationMappings::Name).string().not_null())
                    .col(
                        ColumnDef::new(OrganizationMappings::RegionName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationMappings::DateUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrganizationMappings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OrganizationMappings {
    Table,
    OrganizationId,
    Slug,
    Name,
    RegionName,
    DateUpdated,
}
