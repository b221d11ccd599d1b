use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RegionOutboxes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RegionOutboxes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RegionOutboxes::ShardScope)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegionOutboxes::ShardIdentifier)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RegionOutboxes::Category).integer().not_null())
                    .col(
                        ColumnDef::new(RegionOutboxes::ObjectIdentifier)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RegionOutboxes::Payload).json_binary())
                    .col(
                        ColumnDef::new(RegionOutboxes::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(RegionOutboxes::LastAttemptDurationMs).big_integer())
                    .col(
                        ColumnDef::new(RegionOutboxes::ScheduledFrom)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegionOutboxes::ScheduledFor)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegionOutboxes::DateAdded)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Coalescing lookups: claim, delete and reschedule all filter on the key.
        manager
            .create_index(
                Index::create()
                    .table(RegionOutboxes::Table)
                    .col(RegionOutboxes::ShardScope)
                    .col(RegionOutboxes::ShardIdentifier)
                    .col(RegionOutboxes::Category)
                    .col(RegionOutboxes::ObjectIdentifier)
                    .name("idx_region_outboxes_coalescing_key")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(RegionOutboxes::Table)
                    .col(RegionOutboxes::ScheduledFor)
                    .name("idx_region_outboxes_scheduled_for")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RegionOutboxes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RegionOutboxes {
    Table,
    Id,
    ShardScope,
    ShardIdentifier,
    Category,
    ObjectIdentifier,
    Payload,
    Attempts,
    LastAttemptDurationMs,
    ScheduledFrom,
    ScheduledFor,
    DateAdded,
}
