//! Query types for the retrieval pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::ChatMessage;

/// Recency window applied to a web search.
///
/// The search provider treats these as filters over result publish dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeRange {
    /// Results from the last 24 hours.
    OneDay,
    /// Results from the last 7 days. The default window.
    #[default]
    OneWeek,
    /// Results from the last 30 days.
    OneMonth,
    /// Results from the last year.
    OneYear,
    /// No recency filtering.
    NoLimit,
}

impl TimeRange {
    /// Wire representation expected by the search provider.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "OneDay",
            Self::OneWeek => "OneWeek",
            Self::OneMonth => "OneMonth",
            Self::OneYear => "OneYear",
            Self::NoLimit => "NoLimit",
        }
    }
}

/// A retrieval query with optional conversation history.
///
/// # Examples
///
/// ```rust
/// use wavesearch_core::types::{Query, TimeRange};
///
/// let query = Query::builder()
///     .text("what is a large language model?")
///     .top_k(5)
///     .time_range(TimeRange::OneMonth)
///     .build();
/// assert_eq!(query.top_k, 5);
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    /// The query text.
    pub text: String,

    /// Prior conversation turns, oldest first.
    ///
    /// Used by history-aware transformers to resolve pronouns and ellipsis
    /// into a standalone query.
    pub history: Vec<ChatMessage>,

    /// Number of documents the retrieval should return.
    pub top_k: usize,

    /// Recency window for the web search.
    pub time_range: TimeRange,

    /// Metadata filters forwarded to the retrieval step.
    pub filters: HashMap<String, serde_json::Value>,
}

impl Query {
    /// Create a new query with the given text and defaults.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            history: Vec::new(),
            top_k: 10,
            time_range: TimeRange::default(),
            filters: HashMap::new(),
        }
    }

    /// Create a builder for constructing queries with a fluent API.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Replace the query text, keeping history and parameters.
    ///
    /// Transformers use this to produce rewritten variants of a query.
    #[must_use]
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut query = self.clone();
        query.text = text.into();
        query
    }

    /// Set the number of documents to return.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Check if the query carries conversation history.
    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }
}

/// Builder for creating queries with a fluent API.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    text: Option<String>,
    history: Vec<ChatMessage>,
    top_k: Option<usize>,
    time_range: Option<TimeRange>,
    filters: HashMap<String, serde_json::Value>,
}

impl QueryBuilder {
    /// Create a new query builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query text.
    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a conversation turn to the history.
    pub fn history(mut self, message: ChatMessage) -> Self {
        self.history.push(message);
        self
    }

    /// Replace the whole history.
    pub fn history_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.history = messages;
        self
    }

    /// Set the number of documents to return.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set the recency window.
    pub fn time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = Some(time_range);
        self
    }

    /// Add a metadata filter.
    pub fn filter<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Build the query.
    ///
    /// # Panics
    ///
    /// Panics if text is not set.
    pub fn build(self) -> Query {
        Query {
            text: self.text.expect("Query text is required"),
            history: self.history,
            top_k: self.top_k.unwrap_or(10),
            time_range: self.time_range.unwrap_or_default(),
            filters: self.filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let query = Query::new("test query");
        assert_eq!(query.text, "test query");
        assert_eq!(query.top_k, 10);
        assert_eq!(query.time_range, TimeRange::OneWeek);
        assert!(!query.has_history());
    }

    #[test]
    fn test_query_builder() {
        let query = Query::builder()
            .text("where is the nearest station?")
            .history(ChatMessage::user("I'm in Shenzhen"))
            .history(ChatMessage::assistant("Noted, you are in Shenzhen."))
            .top_k(3)
            .time_range(TimeRange::NoLimit)
            .build();

        assert_eq!(query.history.len(), 2);
        assert_eq!(query.top_k, 3);
        assert_eq!(query.time_range.as_str(), "NoLimit");
    }

    #[test]
    fn test_with_text_preserves_history() {
        let query = Query::builder()
            .text("original")
            .history(ChatMessage::user("context"))
            .build();

        let rewritten = query.with_text("rewritten");
        assert_eq!(rewritten.text, "rewritten");
        assert_eq!(rewritten.history.len(), 1);
    }
}
