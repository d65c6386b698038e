//! # Wavesearch Core
//!
//! Core traits, types, and interfaces for the Wavesearch web-search RAG
//! (Retrieval-Augmented Generation) service.
//!
//! This crate provides the foundational building blocks:
//!
//! - **Data structures**: `Document`, `Query`, `ChatMessage`, and the search
//!   provider's wire types
//! - **Core traits**: `DocumentRetriever`, `DocumentRanker`,
//!   `QueryTransformer`, `QueryExpander`, `QueryAugmenter`, `ChatMemory`,
//!   `ResponseGenerator`
//! - **Configuration**: serde-deserializable config structures
//! - **Error handling**: one error type with context and classification
//!
//! ## Quick Start
//!
//! ```rust
//! use wavesearch_core::prelude::*;
//!
//! let query = Query::builder()
//!     .text("what happened in rust this week?")
//!     .top_k(2)
//!     .build();
//! assert_eq!(query.time_range, TimeRange::OneWeek);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod prelude;

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key types at crate root for convenience
pub use error::{Result, WavesearchError};
pub use types::{
    ChatMessage, Document, DocumentBuilder, GenericSearchResult, MediaRef, MessageRole,
    OriginalQuery, Query, QueryBuilder, QueryContext, ScorePageItem, TimeRange,
};

// Re-export traits for convenience
pub use traits::*;

// Re-export configuration types
pub use config::{MemoryConfig, RetrieverConfig, SearchConfig};

/// Version information for the Wavesearch core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
