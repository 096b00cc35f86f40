//! Shared data models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Chat request payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "userPrompt cannot be empty"))]
    pub user_prompt: String,
    #[serde(default)]
    pub conversation_history: String,
    pub persona: String,
}

/// Chat response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub inquiry: String,
}
