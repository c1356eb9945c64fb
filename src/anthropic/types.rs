use serde::{Deserialize, Serialize};

/// Message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Message role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request body for the streaming Messages endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl MessageRequest {
    /// Create a streaming request with a system prompt and one user message
    pub fn streaming(
        model: impl Into<String>,
        max_tokens: u32,
        system: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            system: Some(system.into()),
            messages: vec![ChatMessage::user(user_message)],
            stream: true,
        }
    }
}

/// Server-sent event payloads from the streaming Messages endpoint.
///
/// Only `content_block_delta` text deltas feed the accumulator; everything
/// else is control traffic. Unknown event types are tolerated.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamApiEvent {
    MessageStart,
    ContentBlockStart,
    ContentBlockDelta { delta: Delta },
    ContentBlockStop,
    MessageDelta,
    MessageStop,
    Ping,
    Error { error: ApiErrorBody },
    #[serde(other)]
    Unknown,
}

/// Delta payload within a content block event
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Error body carried by an `error` stream event
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}
