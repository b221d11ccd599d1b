use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(silo_region_migration::Migrator).await;
}
