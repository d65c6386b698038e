//! Cleaning of raw search results into documents.
//!
//! The search provider returns page items whose main text still contains
//! HTML markup, control whitespace, and zero-width characters. The cleaner
//! normalizes each item into a [`Document`], merging query-level and
//! item-level metadata, and carries the provider score through.

use regex::Regex;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

use wavesearch_core::{
    Document, GenericSearchResult, MediaRef, Result, ScorePageItem, WavesearchError,
};

/// Fallback MIME type for media items the provider did not label.
const DEFAULT_MIME: &str = "application/octet-stream";

/// Normalizes raw search results into documents.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    tag_re: Regex,
    control_ws_re: Regex,
    zero_width_re: Regex,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl DataCleaner {
    /// Create a cleaner with its normalization patterns compiled.
    pub fn new() -> Self {
        // The patterns are literals, so compilation cannot fail.
        Self {
            tag_re: Regex::new(r"<[^>]+>").unwrap(),
            control_ws_re: Regex::new(r"[\n\t\r]+").unwrap(),
            zero_width_re: Regex::new("[\u{200B}-\u{200D}\u{FEFF}]").unwrap(),
        }
    }

    /// Convert a search result into cleaned documents.
    ///
    /// Page items with main text become text documents. An item without
    /// main text becomes a media document built from its link and MIME
    /// type, and cleaning stops there: media results mark the tail of the
    /// provider's ranked text results.
    ///
    /// # Errors
    ///
    /// Returns [`WavesearchError::InvalidUrl`] when a media item's link is
    /// missing or unparsable.
    pub fn clean(&self, result: &GenericSearchResult) -> Result<Vec<Document>> {
        let query_metadata = Self::query_metadata(result);
        let mut documents = Vec::with_capacity(result.page_items.len());

        for item in &result.page_items {
            let text = self.normalize_text(item);

            if text.is_empty() {
                let mut builder = Document::builder()
                    .metadata_map(query_metadata.clone())
                    .metadata_map(Self::item_metadata(item))
                    .media(Self::media_ref(item)?);
                if let Some(score) = item.score {
                    builder = builder.score(score);
                }
                documents.push(builder.build());
                break;
            }

            let mut builder = Document::builder()
                .metadata_map(query_metadata.clone())
                .metadata_map(Self::item_metadata(item))
                .content(text);
            if let Some(score) = item.score {
                builder = builder.score(score);
            }
            documents.push(builder.build());
        }

        debug!("Cleaned {} page items into documents", documents.len());
        Ok(documents)
    }

    /// Truncate a document list to at most `max` items.
    pub fn limit(&self, mut documents: Vec<Document>, max: usize) -> Vec<Document> {
        documents.truncate(max);
        documents
    }

    /// Strip markup and stray whitespace from an item's main text.
    fn normalize_text(&self, item: &ScorePageItem) -> String {
        let Some(main_text) = item.main_text.as_deref() else {
            return String::new();
        };

        let text = self.tag_re.replace_all(main_text, "");
        let text = self.control_ws_re.replace_all(&text, " ");
        let text = self.zero_width_re.replace_all(&text, "");
        text.trim().to_string()
    }

    /// Metadata shared by every document of one search call.
    fn query_metadata(result: &GenericSearchResult) -> HashMap<String, serde_json::Value> {
        let mut metadata = HashMap::new();

        let original = result
            .query_context
            .as_ref()
            .and_then(|context| context.original_query.as_ref());
        if let Some(original) = original {
            if let Some(query) = &original.query {
                metadata.insert("query".to_string(), query.clone().into());
            }
            if let Some(time_range) = &original.time_range {
                metadata.insert("timeRange".to_string(), time_range.clone().into());
                metadata.insert("filters".to_string(), time_range.clone().into());
            }
        }

        metadata
    }

    /// Metadata specific to one page item.
    fn item_metadata(item: &ScorePageItem) -> HashMap<String, serde_json::Value> {
        let mut metadata = HashMap::new();

        if let Some(hostname) = &item.hostname {
            metadata.insert("hostname".to_string(), hostname.clone().into());
        }
        if let Some(html_snippet) = &item.html_snippet {
            metadata.insert("htmlSnippet".to_string(), html_snippet.clone().into());
        }
        if let Some(title) = &item.title {
            metadata.insert("title".to_string(), title.clone().into());
        }
        if let Some(markdown_text) = &item.markdown_text {
            metadata.insert("markdownText".to_string(), markdown_text.clone().into());
        }
        if let Some(link) = &item.link {
            metadata.insert("link".to_string(), link.clone().into());
        }

        metadata
    }

    /// Build a media reference from a text-less page item.
    fn media_ref(item: &ScorePageItem) -> Result<MediaRef> {
        let link = item.link.as_deref().unwrap_or_default();
        let url = Url::parse(link).map_err(|_| WavesearchError::invalid_url(link))?;

        Ok(MediaRef {
            mime: item
                .mime
                .clone()
                .unwrap_or_else(|| DEFAULT_MIME.to_string()),
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wavesearch_core::{OriginalQuery, QueryContext};

    fn text_item(main_text: &str, link: &str) -> ScorePageItem {
        ScorePageItem {
            title: Some("title".to_string()),
            link: Some(link.to_string()),
            main_text: Some(main_text.to_string()),
            hostname: Some("example.com".to_string()),
            score: Some(0.8),
            ..ScorePageItem::default()
        }
    }

    fn search_result(items: Vec<ScorePageItem>) -> GenericSearchResult {
        GenericSearchResult {
            query_context: Some(QueryContext {
                original_query: Some(OriginalQuery {
                    query: Some("rust".to_string()),
                    time_range: Some("OneWeek".to_string()),
                }),
            }),
            page_items: items,
        }
    }

    #[test]
    fn test_strips_html_tags_and_whitespace() {
        let cleaner = DataCleaner::new();
        let result = search_result(vec![text_item(
            "<p>Rust\u{200B} 1.80</p>\n\t<div>released</div>\r",
            "https://example.com/a",
        )]);

        let documents = cleaner.clean(&result).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].content, "Rust 1.80 released");
        assert!(!documents[0].content.contains('<'));
    }

    #[test]
    fn test_merges_query_and_item_metadata() {
        let cleaner = DataCleaner::new();
        let result = search_result(vec![text_item("body text", "https://example.com/a")]);

        let documents = cleaner.clean(&result).unwrap();
        let doc = &documents[0];
        assert_eq!(doc.get_metadata_string("query"), Some("rust".to_string()));
        assert_eq!(doc.get_metadata_string("timeRange"), Some("OneWeek".to_string()));
        assert_eq!(
            doc.get_metadata_string("link"),
            Some("https://example.com/a".to_string())
        );
        assert_eq!(doc.score, Some(0.8));
    }

    #[test]
    fn test_media_item_stops_cleaning() {
        let cleaner = DataCleaner::new();
        let mut media_item = text_item("", "https://example.com/a.png");
        media_item.main_text = None;
        media_item.mime = Some("image/png".to_string());

        let result = search_result(vec![
            text_item("first", "https://example.com/1"),
            media_item,
            text_item("never reached", "https://example.com/3"),
        ]);

        let documents = cleaner.clean(&result).unwrap();
        assert_eq!(documents.len(), 2);
        assert!(documents[1].is_media());
        assert_eq!(
            documents[1].media.as_ref().unwrap().mime,
            "image/png".to_string()
        );
    }

    #[test]
    fn test_media_item_without_score_keeps_none() {
        let cleaner = DataCleaner::new();
        let media_item = ScorePageItem {
            link: Some("https://example.com/report.pdf".to_string()),
            mime: Some("application/pdf".to_string()),
            ..ScorePageItem::default()
        };

        let documents = cleaner.clean(&search_result(vec![media_item])).unwrap();
        assert_eq!(documents[0].score, None);
    }

    #[test]
    fn test_media_item_with_bad_link_fails() {
        let cleaner = DataCleaner::new();
        let mut media_item = ScorePageItem::default();
        media_item.link = Some("not a url".to_string());

        let result = search_result(vec![media_item]);
        let err = cleaner.clean(&result).unwrap_err();
        assert!(matches!(err, WavesearchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_limit_truncates() {
        let cleaner = DataCleaner::new();
        let documents: Vec<Document> = (0..5)
            .map(|i| Document::new(format!("doc {i}")))
            .collect();

        assert_eq!(cleaner.limit(documents.clone(), 2).len(), 2);
        assert_eq!(cleaner.limit(documents, 10).len(), 5);
    }
}
