use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ControlOutboxes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ControlOutboxes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ControlOutboxes::RegionName).string().not_null())
                    .col(
                        ColumnDef::new(ControlOutboxes::ShardScope)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ControlOutboxes::ShardIdentifier)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ControlOutboxes::Category).integer().not_null())
                    .col(
                        ColumnDef::new(ControlOutboxes::ObjectIdentifier)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ControlOutboxes::Payload).json_binary())
                    .col(
                        ColumnDef::new(ControlOutboxes::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ControlOutboxes::LastAttemptDurationMs).big_integer())
                    .col(
                        ColumnDef::new(ControlOutboxes::ScheduledFrom)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ControlOutboxes::ScheduledFor)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ControlOutboxes::DateAdded)
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
                    .table(ControlOutboxes::Table)
                    .col(ControlOutboxes::RegionName)
                    .col(ControlOutboxes::ShardScope)
                    .col(ControlOutboxes::ShardIdentifier)
                    .col(ControlOutboxes::Category)
                    .col(ControlOutboxes::ObjectIdentifier)
                    .name("idx_control_outboxes_coalescing_key")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(ControlOutboxes::Table)
                    .col(ControlOutboxes::ScheduledFor)
                    .name("idx_control_outboxes_scheduled_for")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ControlOutboxes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ControlOutboxes {
    Table,
    Id,
    RegionName,
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
