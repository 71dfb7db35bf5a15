pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_team_table;
mod m20261001_000002_create_user_table;
mod m20261001_000003_create_event_table;
mod m20261001_000004_create_event_team_table;
mod m20261001_000005_create_user_favourite_table;
mod m20261001_000006_create_log_entry_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_team_table::Migration),
            Box::new(m20261001_000002_create_user_table::Migration),
            Box::new(m20261001_000003_create_event_table::Migration),
            Box::new(m20261001_000004_create_event_team_table::Migration),
            Box::new(m20261001_000005_create_user_favourite_table::Migration),
            Box::new(m20261001_000006_create_log_entry_table::Migration),
        ]
    }
}
