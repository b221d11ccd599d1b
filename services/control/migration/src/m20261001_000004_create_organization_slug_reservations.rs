use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrganizationSlugReservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationSlugReservations::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservations::Slug)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservations::RequestedSlug)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservations::OrganizationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservations::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservations::RegionName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservations::ReservationType)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservations::DateAdded)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OrganizationSlugReservations::Table)
                    .col(OrganizationSlugReservations::UserId)
                    .col(OrganizationSlugReservations::RequestedSlug)
                    .col(OrganizationSlugReservations::RegionName)
                    .unique()
                    .name("idx_organization_slug_reservations_request")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OrganizationSlugReservations::Table)
                    .col(OrganizationSlugReservations::OrganizationId)
                    .name("idx_organization_slug_reservations_organization_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(OrganizationSlugReservations::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum OrganizationSlugReservations {
    Table,
    Id,
    Slug,
    RequestedSlug,
    OrganizationId,
    UserId,
    RegionName,
    ReservationType,
    DateAdded,
}
