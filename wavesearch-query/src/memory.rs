//! In-process conversation memory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use wavesearch_core::{ChatMemory, ChatMessage, MemoryConfig, Result, WavesearchError};

/// Conversation store backed by a process-local map.
///
/// Each conversation keeps at most `max_messages` messages; older ones are
/// dropped as new turns arrive. State does not survive a restart.
#[derive(Debug)]
pub struct InMemoryChatMemory {
    conversations: RwLock<HashMap<String, Vec<ChatMessage>>>,
    config: MemoryConfig,
}

impl Default for InMemoryChatMemory {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl InMemoryChatMemory {
    /// Create a memory store with the given limits.
    #[must_use]
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// The store's configuration.
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Ids of all conversations currently holding messages.
    pub fn conversation_ids(&self) -> Result<Vec<String>> {
        let conversations = self
            .conversations
            .read()
            .map_err(|_| WavesearchError::memory("memory lock poisoned"))?;
        Ok(conversations.keys().cloned().collect())
    }
}

#[async_trait]
impl ChatMemory for InMemoryChatMemory {
    async fn get(&self, conversation_id: &str, last_n: usize) -> Result<Vec<ChatMessage>> {
        let conversations = self
            .conversations
            .read()
            .map_err(|_| WavesearchError::memory("memory lock poisoned"))?;

        let Some(messages) = conversations.get(conversation_id) else {
            return Ok(Vec::new());
        };
        let start = messages.len().saturating_sub(last_n);
        Ok(messages[start..].to_vec())
    }

    async fn add(&self, conversation_id: &str, messages: Vec<ChatMessage>) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut conversations = self
            .conversations
            .write()
            .map_err(|_| WavesearchError::memory("memory lock poisoned"))?;

        let stored = conversations
            .entry(conversation_id.to_string())
            .or_default();
        stored.extend(messages);

        if stored.len() > self.config.max_messages {
            let excess = stored.len() - self.config.max_messages;
            stored.drain(..excess);
        }

        debug!(
            "Conversation {} now holds {} messages",
            conversation_id,
            stored.len()
        );
        Ok(())
    }

    async fn clear(&self, conversation_id: &str) -> Result<()> {
        let mut conversations = self
            .conversations
            .write()
            .map_err(|_| WavesearchError::memory("memory lock poisoned"))?;
        conversations.remove(conversation_id);
        debug!("Cleared conversation {conversation_id}");
        Ok(())
    }

    async fn len(&self, conversation_id: &str) -> Result<usize> {
        let conversations = self
            .conversations
            .read()
            .map_err(|_| WavesearchError::memory("memory lock poisoned"))?;
        Ok(conversations
            .get(conversation_id)
            .map_or(0, Vec::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_conversation_is_empty() {
        let memory = InMemoryChatMemory::default();
        let messages = memory.get("nope", 10).await.unwrap();
        assert!(messages.is_empty());
        assert!(memory.is_empty("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_add_and_get_in_order() {
        let memory = InMemoryChatMemory::default();
        memory
            .add(
                "c1",
                vec![ChatMessage::user("first"), ChatMessage::assistant("second")],
            )
            .await
            .unwrap();
        memory
            .add("c1", vec![ChatMessage::user("third")])
            .await
            .unwrap();

        let messages = memory.get("c1", 10).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[2].content, "third");
    }

    #[tokio::test]
    async fn test_get_returns_most_recent_last_n() {
        let memory = InMemoryChatMemory::default();
        for i in 0..5 {
            memory
                .add("c1", vec![ChatMessage::user(format!("msg {i}"))])
                .await
                .unwrap();
        }

        let messages = memory.get("c1", 2).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "msg 3");
        assert_eq!(messages[1].content, "msg 4");
    }

    #[tokio::test]
    async fn test_max_messages_drops_oldest() {
        let memory = InMemoryChatMemory::new(MemoryConfig {
            max_messages: 3,
            ..MemoryConfig::default()
        });
        for i in 0..5 {
            memory
                .add("c1", vec![ChatMessage::user(format!("msg {i}"))])
                .await
                .unwrap();
        }

        let messages = memory.get("c1", 10).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "msg 2");
    }

    #[tokio::test]
    async fn test_clear_removes_conversation() {
        let memory = InMemoryChatMemory::default();
        memory
            .add("c1", vec![ChatMessage::user("hello")])
            .await
            .unwrap();
        memory.clear("c1").await.unwrap();

        assert_eq!(memory.len("c1").await.unwrap(), 0);
        assert!(memory.conversation_ids().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_conversations_are_isolated() {
        let memory = InMemoryChatMemory::default();
        memory
            .add("c1", vec![ChatMessage::user("one")])
            .await
            .unwrap();
        memory
            .add("c2", vec![ChatMessage::user("two")])
            .await
            .unwrap();

        assert_eq!(memory.get("c1", 10).await.unwrap()[0].content, "one");
        assert_eq!(memory.get("c2", 10).await.unwrap()[0].content, "two");
    }
}
