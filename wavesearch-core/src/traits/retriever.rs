//! Retrieval traits: finding, ranking, and joining documents.
//!
//! Retrievers turn a query into scored documents; rankers reorder them by
//! relevance; joiners merge the per-query result lists a multi-query
//! expansion produces.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::{Document, Query, Result};

/// Retrieves relevant documents for a query.
///
/// # Examples
///
/// ```rust,no_run
/// use wavesearch_core::traits::DocumentRetriever;
/// use wavesearch_core::{Document, Query, Result};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct EmptyRetriever;
///
/// #[async_trait]
/// impl DocumentRetriever for EmptyRetriever {
///     async fn retrieve(&self, _query: &Query) -> Result<Vec<Document>> {
///         Ok(vec![])
///     }
/// }
/// ```
#[async_trait]
pub trait DocumentRetriever: Send + Sync + std::fmt::Debug {
    /// Retrieve documents for a query.
    ///
    /// Returns documents in relevance order (most relevant first). The
    /// number of results must respect the query's `top_k`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying search fails or its response
    /// cannot be cleaned into documents.
    async fn retrieve(&self, query: &Query) -> Result<Vec<Document>>;

    /// Get a human-readable name for this retriever.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Get configuration information about this retriever.
    fn config(&self) -> HashMap<String, serde_json::Value> {
        HashMap::new()
    }
}

/// Reorders documents by relevance to a query.
///
/// Rankers must be total: every input document appears exactly once in the
/// output. A ranker that cannot produce an ordering returns its input
/// unchanged rather than failing the request.
#[async_trait]
pub trait DocumentRanker: Send + Sync + std::fmt::Debug {
    /// Rank documents against the query, most relevant first.
    async fn rank(&self, query: &Query, documents: Vec<Document>) -> Result<Vec<Document>>;

    /// Get a human-readable name for this ranker.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Merges per-query result lists into a single deduplicated list.
#[async_trait]
pub trait DocumentJoiner: Send + Sync + std::fmt::Debug {
    /// Join result lists, preserving the relative order of first occurrence.
    async fn join(&self, results: Vec<Vec<Document>>) -> Result<Vec<Document>>;

    /// Get a human-readable name for this joiner.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
