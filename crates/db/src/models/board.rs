use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set, TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::Task;
use crate::{
    entities::{board, task},
    types::TaskStatus,
};

pub const DEFAULT_BOARD_NAME: &str = "My Task Board";
pub const DEFAULT_BOARD_DESCRIPTION: &str = "Tasks to keep organised";

#[derive(Debug, Clone, Copy)]
pub struct SeedTask {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub status: TaskStatus,
    pub task_order: i32,
}

/// Inserted with every new board, in this order.
pub const SEEDED_TASKS: [SeedTask; 4] = [
    SeedTask {
        name: "Task in Progress",
        description: "",
        icon: "⏰",
        status: TaskStatus::InProgress,
        task_order: 0,
    },
    SeedTask {
        name: "Task Completed",
        description: "",
        icon: "🏆",
        status: TaskStatus::Completed,
        task_order: 1,
    },
    SeedTask {
        name: "Task Won't Do",
        description: "",
        icon: "☕",
        status: TaskStatus::WontDo,
        task_order: 2,
    },
    SeedTask {
        name: "Task To Do",
        description: "Work on a Challenge on devChallenges.io, learn TypeScript.",
        icon: "📚",
        status: TaskStatus::Todo,
        task_order: 3,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardWithTasks {
    #[serde(flatten)]
    pub board: Board,
    pub tasks: Vec<Task>,
}

impl std::ops::Deref for BoardWithTasks {
    type Target = Board;
    fn deref(&self) -> &Self::Target {
        &self.board
    }
}

impl std::ops::DerefMut for BoardWithTasks {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.board
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBoard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBoard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Board {
    fn from_model(model: board::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn exists<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, DbErr> {
        let found: Option<String> = board::Entity::find()
            .select_only()
            .column(board::Column::Id)
            .filter(board::Column::Id.eq(id))
            .into_tuple()
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Self>, DbErr> {
        let record = board::Entity::find()
            .filter(board::Column::Id.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    /// The board plus its tasks in display order, or `None` if absent.
    pub async fn find_with_tasks<C: ConnectionTrait>(
        db: &C,
        id: &str,
    ) -> Result<Option<BoardWithTasks>, DbErr> {
        let Some(board) = Self::find_by_id(db, id).await? else {
            return Ok(None);
        };
        let tasks = Task::find_by_board_id(db, id).await?;
        Ok(Some(BoardWithTasks { board, tasks }))
    }

    /// Inserts the board and its [`SEEDED_TASKS`] in a single transaction.
    pub async fn create<C: TransactionTrait>(
        db: &C,
        data: &CreateBoard,
        board_id: Uuid,
    ) -> Result<BoardWithTasks, DbErr> {
        let id = board_id.to_string();
        let name = data
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_BOARD_NAME.to_string());
        let description = data
            .description
            .clone()
            .filter(|description| !description.is_empty())
            .unwrap_or_else(|| DEFAULT_BOARD_DESCRIPTION.to_string());

        let txn = db.begin().await?;
        let now = Utc::now();

        board::ActiveModel {
            id: Set(id.clone()),
            name: Set(name),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for seed in SEEDED_TASKS {
            task::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                board_id: Set(id.clone()),
                name: Set(seed.name.to_string()),
                description: Set(seed.description.to_string()),
                icon: Set(seed.icon.to_string()),
                status: Set(seed.status),
                task_order: Set(seed.task_order),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        let created = Self::find_with_tasks(&txn, &id)
            .await?
            .ok_or(DbErr::RecordNotFound("Board not found".to_string()))?;
        txn.commit().await?;

        Ok(created)
    }

    /// Partial update. With no fields supplied the board is returned as is.
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: &str,
        data: &UpdateBoard,
    ) -> Result<Option<BoardWithTasks>, DbErr> {
        let Some(record) = board::Entity::find()
            .filter(board::Column::Id.eq(id))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        if data.name.is_none() && data.description.is_none() {
            return Self::find_with_tasks(db, id).await;
        }

        let mut active: board::ActiveModel = record.into();
        if let Some(name) = data.name.clone() {
            active.name = Set(name);
        }
        if let Some(description) = data.description.clone() {
            active.description = Set(description);
        }
        active.updated_at = Set(Utc::now());
        active.update(db).await?;

        Self::find_with_tasks(db, id).await
    }

    /// Deletes the board; its tasks go with it through the foreign key cascade.
    pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, DbErr> {
        let result = board::Entity::delete_many()
            .filter(board::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
