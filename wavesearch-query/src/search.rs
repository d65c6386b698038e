//! HTTP client for the generic web-search provider.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use wavesearch_core::{GenericSearchResult, Query, Result, SearchConfig, WavesearchError};

/// The provider rejects queries at or above this length; longer text is
/// truncated before sending.
const MAX_QUERY_CHARS: usize = 100;

/// Client for the provider's `genericSearch` endpoint.
///
/// Performs one GET per search and deserializes the scored page items. The
/// provider searches live web data, so results change between calls.
///
/// # Examples
///
/// ```rust,no_run
/// use wavesearch_core::{Query, SearchConfig};
/// use wavesearch_query::search::GenericSearchClient;
///
/// # async fn example() -> wavesearch_core::Result<()> {
/// let config = SearchConfig {
///     api_key: "secret".to_string(),
///     ..SearchConfig::default()
/// };
/// let client = GenericSearchClient::new(config)?;
/// let result = client.search(&Query::new("rust release notes")).await?;
/// println!("{} page items", result.page_items.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GenericSearchClient {
    client: Client,
    config: SearchConfig,
}

impl GenericSearchClient {
    /// Create a new search client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the config is invalid or the
    /// underlying HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let api_key = HeaderValue::from_str(&config.api_key).map_err(|_| {
            WavesearchError::configuration("api_key contains non-header characters")
        })?;
        headers.insert("X-API-Key", api_key);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                WavesearchError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Execute a web search for the query.
    ///
    /// Query text is truncated to the provider's limit at a character
    /// boundary. A non-success status or an undecodable body is a
    /// [`WavesearchError::Search`].
    #[instrument(skip(self, query), fields(time_range = query.time_range.as_str()))]
    pub async fn search(&self, query: &Query) -> Result<GenericSearchResult> {
        let text = truncate_query(&query.text);
        debug!("Searching web for: {}", text);

        let url = format!("{}/search/genericSearch", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("query", text), ("timeRange", query.time_range.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WavesearchError::search(format!(
                "search provider returned {status}"
            )));
        }

        let result: GenericSearchResult = response
            .json()
            .await
            .map_err(|e| WavesearchError::search(format!("undecodable search response: {e}")))?;

        debug!("Search returned {} page items", result.page_items.len());
        Ok(result)
    }
}

/// Truncate query text below the provider limit, at a char boundary.
fn truncate_query(text: &str) -> &str {
    if text.chars().count() < MAX_QUERY_CHARS {
        return text;
    }
    match text.char_indices().nth(MAX_QUERY_CHARS - 1) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_query_untouched() {
        assert_eq!(truncate_query("rust news"), "rust news");
    }

    #[test]
    fn test_long_query_truncated_to_99_chars() {
        let long: String = "a".repeat(250);
        assert_eq!(truncate_query(&long).chars().count(), 99);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let long: String = "语".repeat(150);
        let truncated = truncate_query(&long);
        assert_eq!(truncated.chars().count(), 99);
        assert!(long.starts_with(truncated));
    }

    #[test]
    fn test_client_rejects_empty_api_key() {
        let config = SearchConfig::default();
        assert!(GenericSearchClient::new(config).is_err());
    }
}
