//! Conversation memory trait.
//!
//! Memory stores hold per-conversation message history keyed by a
//! conversation id. The in-process implementation lives in the query crate;
//! persistence-backed stores would implement the same trait.

use async_trait::async_trait;

use crate::{ChatMessage, Result};

/// Per-conversation message store.
///
/// Implementations are shared across request handlers, so all methods take
/// `&self` and interior mutability is the implementation's concern.
#[async_trait]
pub trait ChatMemory: Send + Sync + std::fmt::Debug {
    /// Get up to `last_n` most recent messages of a conversation, in
    /// chronological order. An unknown conversation id yields an empty list.
    async fn get(&self, conversation_id: &str, last_n: usize) -> Result<Vec<ChatMessage>>;

    /// Append messages to a conversation, creating it if needed.
    async fn add(&self, conversation_id: &str, messages: Vec<ChatMessage>) -> Result<()>;

    /// Remove all messages of a conversation.
    async fn clear(&self, conversation_id: &str) -> Result<()>;

    /// Number of messages currently stored for a conversation.
    async fn len(&self, conversation_id: &str) -> Result<usize> {
        Ok(self.get(conversation_id, usize::MAX).await?.len())
    }

    /// Check whether a conversation has no stored messages.
    async fn is_empty(&self, conversation_id: &str) -> Result<bool> {
        Ok(self.len(conversation_id).await? == 0)
    }
}
