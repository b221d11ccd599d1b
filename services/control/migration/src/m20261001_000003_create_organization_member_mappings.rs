use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key to organization_mappings: member and organization
        // updates travel under different coalescing keys and may land in
        // either order.
        manager
            .create_table(
                Table::create()
                    .table(OrganizationMemberMappings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationMemberMappings::OrganizationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationMemberMappings::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationMemberMappings::Role)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationMemberMappings::DateUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(OrganizationMemberMappings::OrganizationId)
                            .col(OrganizationMemberMappings::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        // Region fan-out looks memberships up by user.
        manager
            .create_index(
                Index::create()
                    .table(OrganizationMemberMappings::Table)
                    .col(OrganizationMemberMappings::UserId)
                    .name("idx_organization_member_mappings_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(OrganizationMemberMappings::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum OrganizationMemberMappings {
    Table,
    OrganizationId,
    UserId,
    Role,
    DateUpdated,
}
