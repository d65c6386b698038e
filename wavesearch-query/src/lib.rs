//! Query processing and retrieval for the Wavesearch RAG service.
//!
//! This crate turns a user question into a grounded, streamed answer. It
//! includes:
//!
//! - **Search**: the web-search provider client and result cleaning
//! - **Retrieval**: live web-search retrieval with optional LLM reranking
//! - **Transformation**: query rewriting, compression, translation, and
//!   multi-query expansion
//! - **Memory**: per-conversation chat history
//! - **Generation**: streamed LLM responses with thinking-span filtering
//! - **Engine**: the high-level pipeline combining all of the above
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use std::sync::Arc;
//! use wavesearch_core::prelude::*;
//! use wavesearch_query::prelude::*;
//!
//! # async fn example(generator: Arc<dyn ResponseGenerator>) -> Result<()> {
//! let client = GenericSearchClient::new(SearchConfig {
//!     api_key: "key".to_string(),
//!     ..SearchConfig::default()
//! })?;
//! let retriever = WebSearchRetriever::builder()
//!     .search_source(client)
//!     .ranker(Arc::new(LlmDocumentRanker::new(generator.clone())))
//!     .build();
//!
//! let engine = WebSearchEngine::builder()
//!     .retriever(Arc::new(retriever))
//!     .generator(generator)
//!     .build()?;
//!
//! let mut stream = engine.chat_stream("latest rust release", None).await?;
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk?);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clean;
pub mod engine;
pub mod generator;
pub mod join;
pub mod memory;
pub mod postprocess;
pub mod rerank;
pub mod retriever;
pub mod search;
pub mod transform;

/// Re-export commonly used types and traits.
pub mod prelude {
    pub use crate::clean::DataCleaner;
    pub use crate::engine::{EngineConfig, WebSearchEngine, WebSearchEngineBuilder};
    pub use crate::generator::SiumaiGenerator;
    pub use crate::join::ConcatenationJoiner;
    pub use crate::memory::InMemoryChatMemory;
    pub use crate::postprocess::ThinkingContentFilter;
    pub use crate::rerank::LlmDocumentRanker;
    pub use crate::retriever::{SearchSource, WebSearchRetriever, WebSearchRetrieverBuilder};
    pub use crate::search::GenericSearchClient;
    pub use crate::transform::{
        CompressionTransformer, ContextualAugmenter, MultiQueryExpander, RewriteTransformer,
        TranslationTransformer,
    };
}
