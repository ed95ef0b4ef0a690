//! `SeaORM` migrations for `SqliteStore`.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_registry_tables;
mod m20260315_000002_create_zone_serials;

/// Migration entrypoint used by `sea_orm_migration::MigratorTrait`.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_registry_tables::Migration),
            Box::new(m20260315_000002_create_zone_serials::Migration),
        ]
    }
}
