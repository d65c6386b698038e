//! Prelude module for convenient imports.
//!
//! Re-exports the most commonly used types and traits from the core crate.
//!
//! # Examples
//!
//! ```rust
//! use wavesearch_core::prelude::*;
//!
//! let doc = Document::new("Hello, world!");
//! let query = Query::new("What is this about?");
//! ```

// Re-export core error types
pub use crate::error::{Result, WavesearchError};

// Re-export all data types
pub use crate::types::{
    ChatMessage, Document, DocumentBuilder, GenericSearchResult, MediaRef, MessageRole,
    OriginalQuery, Query, QueryBuilder, QueryContext, ScorePageItem, TimeRange,
};

// Re-export core traits
pub use crate::traits::{
    ChatMemory, DocumentJoiner, DocumentRanker, DocumentRetriever, GeneratedResponse,
    GenerationOptions, QueryAugmenter, QueryExpander, QueryTransformer, ResponseGenerator,
    TextStream,
};

// Re-export configuration types
pub use crate::config::{MemoryConfig, RetrieverConfig, SearchConfig};
