use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::board::{Board, BoardWithTasks, CreateBoard, UpdateBoard};
use uuid::Uuid;

use super::{DeleteResponse, tasks};
use crate::{
    Deployment, error::ApiError, extract::JsonBody, middleware::load_board_middleware,
};

pub async fn get_board(
    Extension(board): Extension<Board>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<BoardWithTasks>, ApiError> {
    let loaded = Board::find_with_tasks(&deployment.db().pool, &board.id)
        .await?
        .ok_or_else(|| ApiError::BoardNotFound(board.id.clone()))?;
    Ok(ResponseJson(loaded))
}

/// The body is optional; a bare POST creates a board with default fields.
pub async fn create_board(
    State(deployment): State<Deployment>,
    JsonBody(payload): JsonBody<CreateBoard>,
) -> Result<(StatusCode, ResponseJson<BoardWithTasks>), ApiError> {
    let id = Uuid::new_v4();

    let board = Board::create(&deployment.db().pool, &payload, id).await?;
    tracing::debug!("Created board {} with {} tasks", board.id, board.tasks.len());

    Ok((StatusCode::CREATED, ResponseJson(board)))
}

pub async fn update_board(
    Extension(board): Extension<Board>,
    State(deployment): State<Deployment>,
    JsonBody(payload): JsonBody<UpdateBoard>,
) -> Result<ResponseJson<BoardWithTasks>, ApiError> {
    let updated = Board::update(&deployment.db().pool, &board.id, &payload)
        .await?
        .ok_or_else(|| ApiError::BoardNotFound(board.id.clone()))?;
    Ok(ResponseJson(updated))
}

pub async fn delete_board(
    Extension(board): Extension<Board>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<DeleteResponse>, ApiError> {
    if !Board::delete(&deployment.db().pool, &board.id).await? {
        return Err(ApiError::BoardNotFound(board.id));
    }

    tracing::debug!("Deleted board {}", board.id);
    Ok(ResponseJson(DeleteResponse::new("Board deleted successfully")))
}

pub fn router(deployment: &Deployment) -> Router<Deployment> {
    let board_id_router = Router::new()
        .route("/", get(get_board).put(update_board).delete(delete_board))
        .layer(from_fn_with_state(deployment.clone(), load_board_middleware::<Deployment>));

    let inner = Router::new()
        .route("/", post(create_board))
        .nest("/{board_id}/tasks", tasks::board_tasks_router(deployment))
        .nest("/{board_id}", board_id_router);

    Router::new().nest("/boards", inner)
}
