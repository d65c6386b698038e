//! Chat message types for conversation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role of a participant in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        };
        write!(f, "{name}")
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Who produced the message.
    pub role: MessageRole,

    /// The message text.
    pub content: String,

    /// When the message was recorded.
    pub timestamp: DateTime<Utc>,

    /// Optional per-message metadata.
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    /// Create a user message.
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    /// Create an assistant message.
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    fn with_role<S: Into<String>>(role: MessageRole, content: S) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    /// Add metadata to the message.
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}
