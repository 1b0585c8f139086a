use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend};
use sea_orm_migration::MigratorTrait;

pub use sea_orm::{DatabaseConnection as DbPool, DbErr, TransactionTrait};

pub mod entities;
pub mod models;
pub mod types;

/// Handle to the relational store. Cloning shares the underlying connection.
#[derive(Clone)]
pub struct DBService {
    pub pool: DbPool,
}

impl DBService {
    /// Opens `database_url`, applies pragmas and runs pending migrations.
    pub async fn new(database_url: &str) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        // An in-memory database is private to the connection that created it.
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let pool = Database::connect(options).await?;
        Self::configure(&pool, database_url).await?;
        db_migration::Migrator::up(&pool, None).await?;
        tracing::debug!("Database ready at {}", redact_url(database_url));

        Ok(DBService { pool })
    }

    /// Fresh private store, migrated. Each call yields an isolated database.
    pub async fn new_in_memory() -> Result<DBService, DbErr> {
        Self::new("sqlite::memory:").await
    }

    async fn configure(pool: &DbPool, database_url: &str) -> Result<(), DbErr> {
        if pool.get_database_backend() != DatabaseBackend::Sqlite {
            return Ok(());
        }

        pool.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
        if !database_url.contains(":memory:") {
            pool.execute_unprepared("PRAGMA journal_mode = WAL;").await?;
        }
        Ok(())
    }
}

fn redact_url(database_url: &str) -> &str {
    database_url.split('?').next().unwrap_or(database_url)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sea_orm::{EntityTrait, PaginatorTrait};
    use uuid::Uuid;

    use super::*;
    use crate::{
        entities::board,
        models::{
            board::{Board, CreateBoard},
            task::Task,
        },
    };

    #[tokio::test]
    async fn in_memory_stores_are_isolated_and_enforce_foreign_keys() {
        let first = DBService::new_in_memory().await.unwrap();
        let second = DBService::new_in_memory().await.unwrap();

        first
            .pool
            .execute_unprepared("INSERT INTO boards (id, name) VALUES ('b1', 'first');")
            .await
            .unwrap();

        assert_eq!(board::Entity::find().count(&first.pool).await.unwrap(), 1);
        assert_eq!(board::Entity::find().count(&second.pool).await.unwrap(), 0);

        let orphan = first
            .pool
            .execute_unprepared(
                "INSERT INTO tasks (id, board_id, name) VALUES ('t1', 'missing', 'orphan');",
            )
            .await;
        assert!(orphan.is_err());
    }

    #[tokio::test]
    async fn raw_updates_move_updated_at_forward() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = Board::create(&db.pool, &CreateBoard::default(), Uuid::new_v4())
            .await
            .unwrap();
        let task = created.tasks[0].clone();
        tokio::time::sleep(Duration::from_millis(5)).await;

        db.pool
            .execute_unprepared(&format!(
                "UPDATE tasks SET name = 'renamed' WHERE id = '{}';",
                task.id
            ))
            .await
            .unwrap();
        db.pool
            .execute_unprepared(&format!(
                "UPDATE boards SET name = 'renamed' WHERE id = '{}';",
                created.id
            ))
            .await
            .unwrap();

        let task_after = Task::find_by_id(&db.pool, &task.id).await.unwrap().unwrap();
        assert_eq!(task_after.name, "renamed");
        assert!(task_after.updated_at > task.updated_at);

        let board_after = Board::find_by_id(&db.pool, &created.id)
            .await
            .unwrap()
            .unwrap();
        assert!(board_after.updated_at > created.updated_at);

        // Back-to-back raw updates within one millisecond still advance.
        for _ in 0..3 {
            db.pool
                .execute_unprepared(&format!(
                    "UPDATE tasks SET icon = icon WHERE id = '{}';",
                    task.id
                ))
                .await
                .unwrap();
        }
        let task_last = Task::find_by_id(&db.pool, &task.id).await.unwrap().unwrap();
        assert!(task_last.updated_at > task_after.updated_at);
    }

    #[tokio::test]
    async fn column_default_timestamps_decode() {
        let db = DBService::new_in_memory().await.unwrap();
        db.pool
            .execute_unprepared("INSERT INTO boards (id, name) VALUES ('b1', 'raw');")
            .await
            .unwrap();

        let board = Board::find_by_id(&db.pool, "b1").await.unwrap().unwrap();
        assert_eq!(board.created_at, board.updated_at);
        assert_eq!(board.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn redact_url_drops_query_string() {
        assert_eq!(
            redact_url("sqlite:///tmp/board.sqlite?mode=rwc"),
            "sqlite:///tmp/board.sqlite"
        );
        assert_eq!(redact_url("sqlite::memory:"), "sqlite::memory:");
    }
}
