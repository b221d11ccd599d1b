use sea_orm_migration::prelude::*;

mod m20261001_000001_create_organizations;
mod m20261001_000002_create_organization_members;
mod m20261001_000003_create_user_replicas;
mod m20261001_000004_create_organization_slug_reservation_replicas;
mod m20261001_000005_create_region_outboxes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_organizations::Migration),
            Box::new(m20261001_000002_create_organization_members::Migration),
            Box::new(m20261001_000003_create_user_replicas::Migration),
            Box::new(m20261001_000004_create_organization_slug_reservation_replicas::Migration),
            Box::new(m20261001_000005_create_region_outboxes::Migration),
        ]
    }
}
