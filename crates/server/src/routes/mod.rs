use serde::{Deserialize, Serialize};

pub mod boards;
pub mod health;
pub mod tasks;

/// Body returned by successful DELETE requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

impl DeleteResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}
