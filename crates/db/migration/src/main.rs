//! Schema CLI for the task board store, e.g. `DATABASE_URL=sqlite://taskboard.sqlite db-migration up`.
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(db_migration::Migrator).await;
}
