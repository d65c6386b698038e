//! Wire types for the generic web-search provider.
//!
//! These mirror the provider's response schema and are deserialized as-is.
//! Every field is optional: the provider omits fields freely and a missing
//! field must never fail a search.

use serde::{Deserialize, Serialize};

/// Top-level response of the `genericSearch` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenericSearchResult {
    /// Echo of the query the provider actually executed.
    #[serde(default)]
    pub query_context: Option<QueryContext>,

    /// Scored result pages.
    #[serde(default)]
    pub page_items: Vec<ScorePageItem>,
}

/// Provider-side query context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryContext {
    /// The query as originally submitted.
    #[serde(default)]
    pub original_query: Option<OriginalQuery>,
}

/// The query string and filters the provider received.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OriginalQuery {
    /// Query text.
    #[serde(default)]
    pub query: Option<String>,

    /// Recency window applied to the search.
    #[serde(default)]
    pub time_range: Option<String>,
}

/// One search hit with its relevance score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScorePageItem {
    /// Page title.
    #[serde(default)]
    pub title: Option<String>,

    /// Canonical page URL.
    #[serde(default)]
    pub link: Option<String>,

    /// Short plain-text snippet.
    #[serde(default)]
    pub snippet: Option<String>,

    /// Hostname of the source site.
    #[serde(default)]
    pub hostname: Option<String>,

    /// Snippet with HTML markup preserved.
    #[serde(default)]
    pub html_snippet: Option<String>,

    /// Markdown rendering of the page body, when available.
    #[serde(default)]
    pub markdown_text: Option<String>,

    /// Raw main text of the page; may still contain HTML tags.
    #[serde(default)]
    pub main_text: Option<String>,

    /// MIME type for non-text results.
    #[serde(default)]
    pub mime: Option<String>,

    /// Provider relevance score.
    #[serde(default)]
    pub score: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_payload() {
        let result: GenericSearchResult = serde_json::from_str("{}").unwrap();
        assert!(result.query_context.is_none());
        assert!(result.page_items.is_empty());
    }

    #[test]
    fn test_deserialize_camel_case_fields() {
        let payload = r#"{
            "queryContext": {"originalQuery": {"query": "rust", "timeRange": "OneWeek"}},
            "pageItems": [
                {"title": "t", "link": "https://example.com", "mainText": "<p>body</p>", "score": 0.7}
            ]
        }"#;

        let result: GenericSearchResult = serde_json::from_str(payload).unwrap();
        let original = result
            .query_context
            .as_ref()
            .and_then(|c| c.original_query.as_ref())
            .unwrap();
        assert_eq!(original.query.as_deref(), Some("rust"));
        assert_eq!(result.page_items.len(), 1);
        assert_eq!(result.page_items[0].score, Some(0.7));
    }
}
