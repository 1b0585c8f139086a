use sea_orm_migration::prelude::*;

mod m20250101000000_create_boards_and_tasks;
mod m20250102000000_updated_at_triggers;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101000000_create_boards_and_tasks::Migration),
            Box::new(m20250102000000_updated_at_triggers::Migration),
        ]
    }
}
