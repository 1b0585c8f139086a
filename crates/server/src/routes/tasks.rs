use axum::{
    Extension, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::{
    board::{Board, BoardWithTasks},
    task::{CreateTask, Task, UpdateTask},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DeleteResponse;
use crate::{
    Deployment,
    error::ApiError,
    extract::JsonBody,
    middleware::{load_task_middleware, require_board_middleware},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReorderTasks {
    #[serde(default)]
    pub task_ids: Vec<String>,
}

pub async fn get_board_tasks(
    State(deployment): State<Deployment>,
    Path(board_id): Path<String>,
) -> Result<ResponseJson<Vec<Task>>, ApiError> {
    let tasks = Task::find_by_board_id(&deployment.db().pool, &board_id).await?;
    Ok(ResponseJson(tasks))
}

pub async fn create_task(
    State(deployment): State<Deployment>,
    Path(board_id): Path<String>,
    JsonBody(payload): JsonBody<CreateTask>,
) -> Result<(StatusCode, ResponseJson<Task>), ApiError> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Creating task '{}' on board {}",
        payload.name.as_deref().unwrap_or_default(),
        board_id
    );

    let task = Task::create(&deployment.db().pool, &board_id, &payload, id).await?;
    Ok((StatusCode::CREATED, ResponseJson(task)))
}

pub async fn reorder_tasks(
    State(deployment): State<Deployment>,
    Path(board_id): Path<String>,
    JsonBody(payload): JsonBody<ReorderTasks>,
) -> Result<ResponseJson<BoardWithTasks>, ApiError> {
    let pool = &deployment.db().pool;

    let touched = Task::reorder(pool, &board_id, &payload.task_ids).await?;
    if touched < payload.task_ids.len() as u64 {
        tracing::debug!(
            "Reorder on board {} skipped {} unknown task ids",
            board_id,
            payload.task_ids.len() as u64 - touched
        );
    }

    let board = Board::find_with_tasks(pool, &board_id)
        .await?
        .ok_or(ApiError::BoardNotFound(board_id))?;
    Ok(ResponseJson(board))
}

pub async fn get_task(Extension(task): Extension<Task>) -> ResponseJson<Task> {
    ResponseJson(task)
}

pub async fn update_task(
    Extension(existing_task): Extension<Task>,
    State(deployment): State<Deployment>,
    JsonBody(payload): JsonBody<UpdateTask>,
) -> Result<ResponseJson<Task>, ApiError> {
    let task = Task::update(&deployment.db().pool, &existing_task.id, &payload)
        .await?
        .ok_or_else(|| ApiError::TaskNotFound(existing_task.id.clone()))?;
    Ok(ResponseJson(task))
}

pub async fn delete_task(
    Extension(task): Extension<Task>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<DeleteResponse>, ApiError> {
    if !Task::delete(&deployment.db().pool, &task.id).await? {
        return Err(ApiError::TaskNotFound(task.id));
    }

    Ok(ResponseJson(DeleteResponse::new("Task deleted successfully")))
}

/// Routes under `/boards/{board_id}/tasks`.
pub fn board_tasks_router(deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/", get(get_board_tasks).post(create_task))
        .route("/reorder", put(reorder_tasks))
        .layer(from_fn_with_state(
            deployment.clone(),
            require_board_middleware::<Deployment>,
        ))
}

pub fn router(deployment: &Deployment) -> Router<Deployment> {
    let task_id_router = Router::new()
        .route("/", get(get_task).put(update_task).delete(delete_task))
        .layer(from_fn_with_state(deployment.clone(), load_task_middleware::<Deployment>));

    Router::new().nest("/tasks/{task_id}", task_id_router)
}
