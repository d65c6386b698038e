//! Web-search document retrieval.
//!
//! `WebSearchRetriever` turns a query into cleaned documents: it calls the
//! search provider, normalizes the response into documents, caps the list,
//! and optionally reranks it. There is no index behind it; every retrieval
//! hits the live search API.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

use wavesearch_core::{
    Document, DocumentRanker, DocumentRetriever, GenericSearchResult, Query, Result,
    RetrieverConfig,
};

use crate::clean::DataCleaner;
use crate::search::GenericSearchClient;

/// Source of raw search results.
///
/// `GenericSearchClient` is the production implementation; tests substitute
/// their own.
#[async_trait]
pub trait SearchSource: Send + Sync + std::fmt::Debug {
    /// Run a search and return the provider's raw response.
    async fn search(&self, query: &Query) -> Result<GenericSearchResult>;
}

#[async_trait]
impl SearchSource for GenericSearchClient {
    async fn search(&self, query: &Query) -> Result<GenericSearchResult> {
        GenericSearchClient::search(self, query).await
    }
}

/// Retriever backed by a live web-search provider.
///
/// # Examples
///
/// ```rust,no_run
/// use wavesearch_core::{DocumentRetriever, Query, SearchConfig};
/// use wavesearch_query::retriever::WebSearchRetriever;
/// use wavesearch_query::search::GenericSearchClient;
///
/// # async fn example() -> wavesearch_core::Result<()> {
/// let client = GenericSearchClient::new(SearchConfig {
///     api_key: "key".to_string(),
///     ..SearchConfig::default()
/// })?;
/// let retriever = WebSearchRetriever::builder()
///     .search_source(client)
///     .max_results(2)
///     .build();
/// let documents = retriever.retrieve(&Query::new("rust async runtimes")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WebSearchRetriever {
    source: Arc<dyn SearchSource>,
    cleaner: DataCleaner,
    ranker: Option<Arc<dyn DocumentRanker>>,
    config: RetrieverConfig,
}

impl WebSearchRetriever {
    /// Create a builder for configuring the retriever.
    #[must_use]
    pub fn builder() -> WebSearchRetrieverBuilder {
        WebSearchRetrieverBuilder::new()
    }

    /// The retriever's configuration.
    pub fn retriever_config(&self) -> &RetrieverConfig {
        &self.config
    }
}

#[async_trait]
impl DocumentRetriever for WebSearchRetriever {
    async fn retrieve(&self, query: &Query) -> Result<Vec<Document>> {
        let response = self.source.search(query).await?;
        let documents = self.cleaner.clean(&response)?;
        let documents = self.cleaner.limit(documents, self.config.max_results);
        debug!(
            "Retrieved {} documents for query: {}",
            documents.len(),
            query.text
        );

        // A single document has nothing to be reordered against.
        if !self.config.enable_ranker || documents.len() <= 1 {
            return Ok(documents);
        }
        let Some(ranker) = &self.ranker else {
            return Ok(documents);
        };

        // Ranking is best-effort; a failure falls back to search order.
        match ranker.rank(query, documents.clone()).await {
            Ok(ranked) => Ok(ranked),
            Err(e) => {
                error!("ranker {} failed, keeping search order: {e}", ranker.name());
                Ok(documents)
            }
        }
    }

    fn name(&self) -> &'static str {
        "WebSearchRetriever"
    }

    fn config(&self) -> HashMap<String, serde_json::Value> {
        let mut config = HashMap::new();
        config.insert(
            "max_results".to_string(),
            serde_json::json!(self.config.max_results),
        );
        config.insert(
            "enable_ranker".to_string(),
            serde_json::json!(self.config.enable_ranker),
        );
        config.insert(
            "has_ranker".to_string(),
            serde_json::json!(self.ranker.is_some()),
        );
        config
    }
}

/// Builder for [`WebSearchRetriever`].
#[derive(Debug, Default)]
pub struct WebSearchRetrieverBuilder {
    source: Option<Arc<dyn SearchSource>>,
    ranker: Option<Arc<dyn DocumentRanker>>,
    config: RetrieverConfig,
}

impl WebSearchRetrieverBuilder {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search source.
    #[must_use]
    pub fn search_source<S: SearchSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Set a shared search source.
    #[must_use]
    pub fn search_source_arc(mut self, source: Arc<dyn SearchSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the ranker used to reorder documents.
    #[must_use]
    pub fn ranker(mut self, ranker: Arc<dyn DocumentRanker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Cap the number of documents returned per retrieval.
    #[must_use]
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.config.max_results = max_results;
        self
    }

    /// Enable or disable reranking.
    #[must_use]
    pub fn enable_ranker(mut self, enable: bool) -> Self {
        self.config.enable_ranker = enable;
        self
    }

    /// Replace the whole retriever configuration.
    #[must_use]
    pub fn config(mut self, config: RetrieverConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the retriever.
    ///
    /// # Panics
    ///
    /// Panics if no search source was set.
    #[must_use]
    pub fn build(self) -> WebSearchRetriever {
        WebSearchRetriever {
            source: self.source.expect("search source is required"),
            cleaner: DataCleaner::new(),
            ranker: self.ranker,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavesearch_core::types::{OriginalQuery, QueryContext, ScorePageItem};
    use wavesearch_core::WavesearchError;

    /// Search backend stub returning canned page items, or failing.
    #[derive(Debug)]
    struct StubSource {
        texts: Option<&'static [&'static str]>,
    }

    #[async_trait]
    impl SearchSource for StubSource {
        async fn search(&self, _query: &Query) -> Result<GenericSearchResult> {
            let Some(texts) = self.texts else {
                return Err(WavesearchError::search("upstream 500"));
            };
            Ok(GenericSearchResult {
                query_context: Some(QueryContext {
                    original_query: Some(OriginalQuery {
                        query: Some("q".to_string()),
                        time_range: Some("OneWeek".to_string()),
                    }),
                }),
                page_items: texts
                    .iter()
                    .map(|text| ScorePageItem {
                        title: Some(format!("{text} title")),
                        link: Some(format!("https://example.com/{text}")),
                        main_text: Some((*text).to_string()),
                        ..ScorePageItem::default()
                    })
                    .collect(),
            })
        }
    }

    /// Ranker stub: reverse the list, fail, or panic on use.
    #[derive(Debug)]
    enum StubRanker {
        Reverse,
        Fail,
        Never,
    }

    #[async_trait]
    impl DocumentRanker for StubRanker {
        async fn rank(&self, _query: &Query, mut documents: Vec<Document>) -> Result<Vec<Document>> {
            match self {
                Self::Reverse => {
                    documents.reverse();
                    Ok(documents)
                }
                Self::Fail => Err(WavesearchError::rank("model unavailable")),
                Self::Never => panic!("unexpected rank call"),
            }
        }
    }

    fn source_with(texts: &'static [&'static str]) -> StubSource {
        StubSource { texts: Some(texts) }
    }

    #[tokio::test]
    async fn test_retrieve_limits_results() {
        let retriever = WebSearchRetriever::builder()
            .search_source(source_with(&["one", "two", "three"]))
            .max_results(2)
            .enable_ranker(false)
            .build();

        let documents = retriever.retrieve(&Query::new("q")).await.unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].content, "one");
    }

    #[tokio::test]
    async fn test_retrieve_applies_ranker() {
        let retriever = WebSearchRetriever::builder()
            .search_source(source_with(&["one", "two"]))
            .ranker(Arc::new(StubRanker::Reverse))
            .build();

        let documents = retriever.retrieve(&Query::new("q")).await.unwrap();
        assert_eq!(documents[0].content, "two");
        assert_eq!(documents[1].content, "one");
    }

    #[tokio::test]
    async fn test_single_document_skips_ranker() {
        let retriever = WebSearchRetriever::builder()
            .search_source(source_with(&["only"]))
            .ranker(Arc::new(StubRanker::Never))
            .build();

        let documents = retriever.retrieve(&Query::new("q")).await.unwrap();
        assert_eq!(documents.len(), 1);
    }

    #[tokio::test]
    async fn test_ranker_failure_degrades_to_search_order() {
        let retriever = WebSearchRetriever::builder()
            .search_source(source_with(&["one", "two"]))
            .ranker(Arc::new(StubRanker::Fail))
            .build();

        let documents = retriever.retrieve(&Query::new("q")).await.unwrap();
        assert_eq!(documents[0].content, "one");
        assert_eq!(documents[1].content, "two");
    }

    #[tokio::test]
    async fn test_disabled_ranker_is_not_called() {
        let retriever = WebSearchRetriever::builder()
            .search_source(source_with(&["one", "two"]))
            .ranker(Arc::new(StubRanker::Never))
            .enable_ranker(false)
            .build();

        let documents = retriever.retrieve(&Query::new("q")).await.unwrap();
        assert_eq!(documents.len(), 2);
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let retriever = WebSearchRetriever::builder()
            .search_source(StubSource { texts: None })
            .build();

        let result = retriever.retrieve(&Query::new("q")).await;
        assert!(result.is_err());
    }
}
