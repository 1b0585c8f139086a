use std::{fmt::Display, future::Future};

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use db::{
    DBService,
    models::{board::Board, task::Task},
};

use crate::{Deployment, error::ApiError};

pub trait ModelLoaderDeps {
    fn db_service(&self) -> &DBService;
}

impl ModelLoaderDeps for Deployment {
    fn db_service(&self) -> &DBService {
        self.db()
    }
}

async fn fetch_model_or_error<M, E, Fut>(
    model_name: &'static str,
    model_id: String,
    load_future: Fut,
    not_found: fn(String) -> ApiError,
) -> Result<M, ApiError>
where
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    match load_future.await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            tracing::warn!("{model_name} {model_id} not found");
            Err(not_found(model_id))
        }
        Err(error) => Err(ApiError::Internal(format!(
            "Failed to fetch {model_name} {model_id}: {error}"
        ))),
    }
}

async fn load_request_extension<M, E, Fut>(
    request: Request,
    next: Next,
    model_name: &'static str,
    model_id: String,
    load_future: Fut,
    not_found: fn(String) -> ApiError,
) -> Result<Response, ApiError>
where
    M: Clone + Send + Sync + 'static,
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    let model = fetch_model_or_error(model_name, model_id, load_future, not_found).await?;
    let mut request = request;
    request.extensions_mut().insert(model);
    Ok(next.run(request).await)
}

/// Inserts the addressed [`Board`] row into the request extensions.
pub async fn load_board_middleware<S>(
    State(deployment): State<S>,
    Path(board_id): Path<String>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: ModelLoaderDeps,
{
    let load = Board::find_by_id(&deployment.db_service().pool, &board_id);
    load_request_extension(
        request,
        next,
        "Board",
        board_id.clone(),
        load,
        ApiError::BoardNotFound,
    )
    .await
}

/// Rejects the request with 404 unless the board exists. Nothing is loaded.
pub async fn require_board_middleware<S>(
    State(deployment): State<S>,
    Path(board_id): Path<String>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: ModelLoaderDeps,
{
    let exists = async {
        Board::exists(&deployment.db_service().pool, &board_id)
            .await
            .map(|found| found.then_some(()))
    };
    fetch_model_or_error("Board", board_id.clone(), exists, ApiError::BoardNotFound).await?;
    Ok(next.run(request).await)
}

pub async fn load_task_middleware<S>(
    State(deployment): State<S>,
    Path(task_id): Path<String>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: ModelLoaderDeps,
{
    let load = Task::find_by_id(&deployment.db_service().pool, &task_id);
    load_request_extension(
        request,
        next,
        "Task",
        task_id.clone(),
        load,
        ApiError::TaskNotFound,
    )
    .await
}
