use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const TASK_STATUS_CHECK: &str = "CHECK (status IN ('todo', 'in_progress', 'completed', 'wont_do'))";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Boards::Table)
                    .col(id_col(Boards::Id))
                    .col(
                        ColumnDef::new(Boards::Name)
                            .string()
                            .not_null()
                            .default(Expr::val("My Task Board")),
                    )
                    .col(
                        ColumnDef::new(Boards::Description)
                            .text()
                            .not_null()
                            .default(Expr::val("Tasks to keep organised")),
                    )
                    .col(timestamp_col(Boards::CreatedAt))
                    .col(timestamp_col(Boards::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Tasks::Table)
                    .col(id_col(Tasks::Id))
                    .col(ColumnDef::new(Tasks::BoardId).string().not_null())
                    .col(
                        ColumnDef::new(Tasks::Name)
                            .string()
                            .not_null()
                            .default(Expr::val("New Task")),
                    )
                    .col(
                        ColumnDef::new(Tasks::Description)
                            .text()
                            .not_null()
                            .default(Expr::val("")),
                    )
                    .col(
                        ColumnDef::new(Tasks::Icon)
                            .string_len(16)
                            .not_null()
                            .default(Expr::val("📝")),
                    )
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("todo"))
                            .extra(TASK_STATUS_CHECK),
                    )
                    .col(
                        ColumnDef::new(Tasks::TaskOrder)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(timestamp_col(Tasks::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_board_id")
                            .from(Tasks::Table, Tasks::BoardId)
                            .to(Boards::Table, Boards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_board_id_task_order")
                    .table(Tasks::Table)
                    .col(Tasks::BoardId)
                    .col(Tasks::TaskOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Boards::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn id_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .string_len(36)
        .not_null()
        .primary_key()
        .to_owned()
}

// RFC3339 with milliseconds, matching the precision the triggers write.
const NOW_MILLIS: &str = "(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))";

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::cust(NOW_MILLIS))
        .to_owned()
}

#[derive(Iden)]
enum Boards {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    BoardId,
    Name,
    Description,
    Icon,
    Status,
    TaskOrder,
    CreatedAt,
    UpdatedAt,
}
