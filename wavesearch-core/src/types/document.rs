//! Document type and related structures.
//!
//! Documents are what the cleaning step produces from raw search results and
//! what the retrieval pipeline hands to the augmenter. They are constructed
//! once per search call and discarded after the chat response.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A cleaned search result ready for retrieval-augmented generation.
///
/// A document carries the normalized text of one search hit, the metadata
/// merged from the query context and the page item (title, link, hostname,
/// ...), and the relevance score the provider or a reranker assigned to it.
///
/// # Examples
///
/// ```rust
/// use wavesearch_core::types::Document;
///
/// let doc = Document::builder()
///     .content("Rust 1.80 was released this week.")
///     .metadata("title", "Rust release notes")
///     .metadata("link", "https://blog.rust-lang.org/")
///     .score(0.92)
///     .build();
/// assert_eq!(doc.get_metadata_string("title").as_deref(), Some("Rust release notes"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: Uuid,

    /// Normalized text content. Empty when the page item only carried media.
    pub content: String,

    /// Document metadata.
    ///
    /// Common keys produced by the cleaner:
    /// - `query`: the original search query
    /// - `timeRange`: the recency window the search used
    /// - `title`, `link`, `hostname`, `htmlSnippet`, `markdownText`
    pub metadata: HashMap<String, serde_json::Value>,

    /// Relevance score assigned by the search provider or a reranker.
    pub score: Option<f32>,

    /// Media attachment for page items that carried no main text.
    pub media: Option<MediaRef>,
}

/// Reference to a non-text search hit (image, PDF, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaRef {
    /// MIME type reported by the search provider.
    pub mime: String,
    /// Validated URL of the media resource.
    pub url: String,
}

impl Document {
    /// Create a new document with the given content.
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            metadata: HashMap::new(),
            score: None,
            media: None,
        }
    }

    /// Create a builder for constructing documents with a fluent API.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Add or update metadata for this document.
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the relevance score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Get metadata value by key.
    pub fn get_metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    /// Get metadata value as a string.
    pub fn get_metadata_string(&self, key: &str) -> Option<String> {
        self.metadata.get(key)?.as_str().map(String::from)
    }

    /// Whether this document is a media-only result.
    pub fn is_media(&self) -> bool {
        self.media.is_some()
    }

    /// Check if the document has no text content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Builder for creating documents with a fluent API.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    id: Option<Uuid>,
    content: Option<String>,
    metadata: HashMap<String, serde_json::Value>,
    score: Option<f32>,
    media: Option<MediaRef>,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document ID.
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the document content.
    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Add a single metadata entry.
    pub fn metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merge a whole metadata map into the document.
    pub fn metadata_map(mut self, map: HashMap<String, serde_json::Value>) -> Self {
        self.metadata.extend(map);
        self
    }

    /// Set the relevance score.
    pub fn score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Attach a media reference instead of text content.
    pub fn media(mut self, media: MediaRef) -> Self {
        self.media = Some(media);
        self
    }

    /// Build the document.
    ///
    /// Documents without text are valid as long as they carry media;
    /// content defaults to the empty string.
    pub fn build(self) -> Document {
        Document {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            content: self.content.unwrap_or_default(),
            metadata: self.metadata,
            score: self.score,
            media: self.media,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let doc = Document::new("Test content");
        assert_eq!(doc.content, "Test content");
        assert!(doc.metadata.is_empty());
        assert!(doc.score.is_none());
        assert!(!doc.is_media());
    }

    #[test]
    fn test_document_builder() {
        let doc = Document::builder()
            .content("Test content")
            .metadata("link", "https://example.com")
            .metadata("title", "Example")
            .score(0.5)
            .build();

        assert_eq!(doc.content, "Test content");
        assert_eq!(
            doc.get_metadata_string("link"),
            Some("https://example.com".to_string())
        );
        assert_eq!(doc.score, Some(0.5));
    }

    #[test]
    fn test_media_only_document() {
        let doc = Document::builder()
            .media(MediaRef {
                mime: "image/png".to_string(),
                url: "https://example.com/a.png".to_string(),
            })
            .build();

        assert!(doc.is_media());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_metadata_map_merge() {
        let mut base = HashMap::new();
        base.insert("query".to_string(), serde_json::Value::String("q".into()));

        let doc = Document::builder()
            .content("text")
            .metadata_map(base)
            .metadata("title", "t")
            .build();

        assert_eq!(doc.get_metadata_string("query"), Some("q".to_string()));
        assert_eq!(doc.get_metadata_string("title"), Some("t".to_string()));
    }
}
