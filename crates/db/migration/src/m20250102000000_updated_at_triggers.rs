use sea_orm_migration::{prelude::*, sea_orm::DatabaseBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

// Only fires when the statement itself left updated_at alone, so rows
// written through the models keep their own timestamps. The refreshed value
// has millisecond precision and is always at least 1ms past the old one.
const CREATE_TRIGGERS: [&str; 2] = [
    "CREATE TRIGGER IF NOT EXISTS trg_boards_updated_at \
     AFTER UPDATE ON boards \
     FOR EACH ROW WHEN NEW.updated_at = OLD.updated_at \
     BEGIN \
       UPDATE boards SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', \
         MAX(julianday('now'), julianday(OLD.updated_at) + 1.0 / 86400000)) \
       WHERE id = NEW.id; \
     END;",
    "CREATE TRIGGER IF NOT EXISTS trg_tasks_updated_at \
     AFTER UPDATE ON tasks \
     FOR EACH ROW WHEN NEW.updated_at = OLD.updated_at \
     BEGIN \
       UPDATE tasks SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', \
         MAX(julianday('now'), julianday(OLD.updated_at) + 1.0 / 86400000)) \
       WHERE id = NEW.id; \
     END;",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Sqlite {
            return Ok(());
        }

        let conn = manager.get_connection();
        for sql in CREATE_TRIGGERS {
            conn.execute_unprepared(sql).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Sqlite {
            return Ok(());
        }

        let conn = manager.get_connection();
        conn.execute_unprepared("DROP TRIGGER IF EXISTS trg_tasks_updated_at;")
            .await?;
        conn.execute_unprepared("DROP TRIGGER IF EXISTS trg_boards_updated_at;")
            .await?;
        Ok(())
    }
}
