use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use crate::types::TaskStatus;

use crate::entities::task;

pub const DEFAULT_TASK_NAME: &str = "New Task";
pub const DEFAULT_TASK_ICON: &str = "📝";

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Invalid status: {0}. Valid values: todo, in_progress, completed, wont_do")]
    InvalidStatus(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub board_id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub status: TaskStatus,
    pub task_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when adding a task. Missing or empty values fall back to
/// the column defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_order: Option<i32>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.icon.is_none()
            && self.status.is_none()
            && self.task_order.is_none()
    }
}

/// Scalar status values as the client sent them. Non-string scalars are kept
/// as text so they fail validation like any other unknown status.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<RawStatus>::deserialize(deserializer)?;
    Ok(raw.map(|status| match status {
        RawStatus::Text(text) => text,
        RawStatus::Integer(value) => value.to_string(),
        RawStatus::Float(value) => value.to_string(),
        RawStatus::Flag(value) => value.to_string(),
    }))
}

pub fn parse_status(raw: &str) -> Result<TaskStatus, TaskError> {
    TaskStatus::from_str(raw).map_err(|_| TaskError::InvalidStatus(raw.to_string()))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl Task {
    pub(crate) fn from_model(model: task::Model) -> Self {
        Self {
            id: model.id,
            board_id: model.board_id,
            name: model.name,
            description: model.description,
            icon: model.icon,
            status: model.status,
            task_order: model.task_order,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Id.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn exists<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, DbErr> {
        let found: Option<String> = task::Entity::find()
            .select_only()
            .column(task::Column::Id)
            .filter(task::Column::Id.eq(id))
            .into_tuple()
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    /// Tasks of a board in display order.
    pub async fn find_by_board_id<C: ConnectionTrait>(
        db: &C,
        board_id: &str,
    ) -> Result<Vec<Self>, DbErr> {
        let records = task::Entity::find()
            .filter(task::Column::BoardId.eq(board_id))
            .order_by_asc(task::Column::TaskOrder)
            .order_by_asc(task::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    // Not atomic with the insert that follows: two concurrent creates on the
    // same board can read the same max and end up sharing an order value.
    async fn next_order<C: ConnectionTrait>(db: &C, board_id: &str) -> Result<i32, DbErr> {
        let max_order: Option<Option<i32>> = task::Entity::find()
            .select_only()
            .column_as(task::Column::TaskOrder.max(), "max_order")
            .filter(task::Column::BoardId.eq(board_id))
            .into_tuple()
            .one(db)
            .await?;
        Ok(max_order.flatten().map_or(0, |max| max + 1))
    }

    /// Appends a task to `board_id`. Board existence is the caller's concern;
    /// an unknown board surfaces as a foreign key violation.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        board_id: &str,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, TaskError> {
        let status = match non_empty(&data.status) {
            Some(raw) => parse_status(&raw)?,
            None => TaskStatus::default(),
        };
        let task_order = Self::next_order(db, board_id).await?;

        let now = Utc::now();
        let active = task::ActiveModel {
            id: Set(task_id.to_string()),
            board_id: Set(board_id.to_string()),
            name: Set(non_empty(&data.name).unwrap_or_else(|| DEFAULT_TASK_NAME.to_string())),
            description: Set(data.description.clone().unwrap_or_default()),
            icon: Set(non_empty(&data.icon).unwrap_or_else(|| DEFAULT_TASK_ICON.to_string())),
            status: Set(status),
            task_order: Set(task_order),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    /// Applies the supplied fields. The status is validated before the row is
    /// read, so a bad value never reaches storage. `Ok(None)` when the task
    /// does not exist.
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: &str,
        data: &UpdateTask,
    ) -> Result<Option<Self>, TaskError> {
        let status = data.status.as_deref().map(parse_status).transpose()?;

        let Some(record) = task::Entity::find()
            .filter(task::Column::Id.eq(id))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        if data.is_empty() {
            return Ok(Some(Self::from_model(record)));
        }

        let mut active: task::ActiveModel = record.into();
        if let Some(name) = data.name.clone() {
            active.name = Set(name);
        }
        if let Some(description) = data.description.clone() {
            active.description = Set(description);
        }
        if let Some(icon) = data.icon.clone() {
            active.icon = Set(icon);
        }
        if let Some(status) = status {
            active.status = Set(status);
        }
        if let Some(task_order) = data.task_order {
            active.task_order = Set(task_order);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Some(Self::from_model(updated)))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, DbErr> {
        let result = task::Entity::delete_many()
            .filter(task::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Sets `task_order` to each id's position in `task_ids`, all in one
    /// transaction. Every update is scoped to `board_id`, so ids belonging to
    /// another board are skipped. Tasks missing from the list keep their
    /// order. Returns the number of rows touched.
    pub async fn reorder<C: TransactionTrait>(
        db: &C,
        board_id: &str,
        task_ids: &[String],
    ) -> Result<u64, DbErr> {
        let txn = db.begin().await?;
        let now = Utc::now();

        let mut touched = 0;
        for (position, task_id) in task_ids.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| DbErr::Custom("Too many tasks to reorder".to_string()))?;
            let result = task::Entity::update_many()
                .col_expr(task::Column::TaskOrder, Expr::value(position))
                .col_expr(task::Column::UpdatedAt, Expr::value(now))
                .filter(task::Column::Id.eq(task_id.as_str()))
                .filter(task::Column::BoardId.eq(board_id))
                .exec(&txn)
                .await?;
            touched += result.rows_affected;
        }

        txn.commit().await?;
        Ok(touched)
    }
}
