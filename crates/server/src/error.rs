use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    DbErr,
    models::task::{TaskError, TaskStatus},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Board not found: {0}")]
    BoardNotFound(String),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("Invalid request body: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::BoardNotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "Board not found".to_string(),
                    message: Some(format!("No board found with ID: {id}")),
                },
            ),
            ApiError::TaskNotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "Task not found".to_string(),
                    message: Some(format!("No task found with ID: {id}")),
                },
            ),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Invalid request body".to_string(),
                    message: Some(detail.clone()),
                },
            ),
            ApiError::Task(TaskError::InvalidStatus(_)) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Invalid status".to_string(),
                    message: Some(format!(
                        "Status must be one of: {}",
                        TaskStatus::valid_values()
                    )),
                },
            ),
            ApiError::Task(TaskError::Database(_))
            | ApiError::Database(_)
            | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Internal server error".to_string(),
                    message: None,
                },
            ),
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BoardNotFound(_) => "BoardNotFound",
            ApiError::TaskNotFound(_) => "TaskNotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Task(_) => "TaskError",
            ApiError::Database(_) => "DatabaseError",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, body) = self.status_and_body();

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type = self.error_type(),
                error = %self,
                "API request failed"
            );
        }
        (status_code, Json(body)).into_response()
    }
}
