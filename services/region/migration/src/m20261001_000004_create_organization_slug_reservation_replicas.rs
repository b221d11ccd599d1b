use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrganizationSlugReservationReplicas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationSlugReservationReplicas::ReservationId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservationReplicas::Slug)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservationReplicas::OrganizationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservationReplicas::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservationReplicas::RegionName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservationReplicas::ReservationType)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSlugReservationReplicas::DateUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OrganizationSlugReservationReplicas::Table)
                    .col(OrganizationSlugReservationReplicas::Slug)
                    .name("idx_organization_slug_reservation_replicas_slug")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(OrganizationSlugReservationReplicas::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum OrganizationSlugReservationReplicas {
    Table,
    ReservationId,
    Slug,
    OrganizationId,
    UserId,
    RegionName,
    ReservationType,
    DateUpdated,
}
