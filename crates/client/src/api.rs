use db::models::{
    board::{BoardWithTasks, CreateBoard, UpdateBoard},
    task::{CreateTask, Task, UpdateTask},
};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use thiserror::Error;

pub const FALLBACK_ERROR_MESSAGE: &str = "Request failed";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Text suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Http(_) => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub success: bool,
    pub message: String,
}

/// HTTP client for the board API. `base_url` points at the `/api` prefix,
/// e.g. `http://127.0.0.1:3001/api`.
#[derive(Debug, Clone)]
pub struct BoardApi {
    http: reqwest::Client,
    base_url: String,
}

impl BoardApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::debug!(%status, error_message = %message, "board API request failed");
        Err(ClientError::Api { status, message })
    }

    pub async fn get_board(&self, board_id: &str) -> Result<BoardWithTasks, ClientError> {
        self.send(self.request(Method::GET, &format!("/boards/{board_id}")))
            .await
    }

    pub async fn create_board(&self, data: &CreateBoard) -> Result<BoardWithTasks, ClientError> {
        self.send(self.request(Method::POST, "/boards").json(data))
            .await
    }

    pub async fn update_board(
        &self,
        board_id: &str,
        data: &UpdateBoard,
    ) -> Result<BoardWithTasks, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("/boards/{board_id}"))
                .json(data),
        )
        .await
    }

    pub async fn delete_board(&self, board_id: &str) -> Result<Deleted, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/boards/{board_id}")))
            .await
    }

    pub async fn list_tasks(&self, board_id: &str) -> Result<Vec<Task>, ClientError> {
        self.send(self.request(Method::GET, &format!("/boards/{board_id}/tasks")))
            .await
    }

    pub async fn add_task(&self, board_id: &str, data: &CreateTask) -> Result<Task, ClientError> {
        self.send(
            self.request(Method::POST, &format!("/boards/{board_id}/tasks"))
                .json(data),
        )
        .await
    }

    pub async fn reorder_tasks(
        &self,
        board_id: &str,
        task_ids: &[String],
    ) -> Result<BoardWithTasks, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("/boards/{board_id}/tasks/reorder"))
                .json(&json!({ "task_ids": task_ids })),
        )
        .await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task, ClientError> {
        self.send(self.request(Method::GET, &format!("/tasks/{task_id}")))
            .await
    }

    pub async fn update_task(&self, task_id: &str, data: &UpdateTask) -> Result<Task, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("/tasks/{task_id}"))
                .json(data),
        )
        .await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<Deleted, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/tasks/{task_id}")))
            .await
    }
}

/// `message`, else `error`, else the generic fallback.
fn error_message(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return FALLBACK_ERROR_MESSAGE.to_string();
    };

    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or(FALLBACK_ERROR_MESSAGE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_message_then_error() {
        assert_eq!(
            error_message(br#"{"error":"Task not found","message":"No task found with ID: x"}"#),
            "No task found with ID: x"
        );
        assert_eq!(
            error_message(br#"{"error":"Internal server error"}"#),
            "Internal server error"
        );
        assert_eq!(error_message(br#"{"error":"","message":""}"#), "Request failed");
        assert_eq!(error_message(b"<html>bad gateway</html>"), "Request failed");
        assert_eq!(error_message(b""), "Request failed");
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let api = BoardApi::new("http://localhost:3001/api/");
        assert_eq!(api.base_url(), "http://localhost:3001/api");
    }
}
