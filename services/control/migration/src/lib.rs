use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users;
mod m20261001_000002_create_organization_mappings;
mod m20261001_000003_create_organization_member_mappings;
mod m20261001_000004_create_organization_slug_reservations;
mod m20261001_000005_create_control_outboxes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users::Migration),
            Box::new(m20261001_000002_create_organization_mappings::Migration),
            Box::new(m20261001_000003_create_organization_member_mappings::Migration),
            Box::new(m20261001_000004_create_organization_slug_reservations::Migration),
            Box::new(m20261001_000005_create_control_outboxes::Migration),
        ]
    }
}
