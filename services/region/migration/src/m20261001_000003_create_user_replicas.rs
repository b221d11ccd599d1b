use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserReplicas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserReplicas::UserId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserReplicas::Email).string().not_null())
                    .col(ColumnDef::new(UserReplicas::Name).string().not_null())
                    .col(
                        ColumnDef::new(UserReplicas::DateUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserReplicas::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserReplicas {
    Table,
    UserId,
    Email,
    Name,
    DateUpdated,
}
