//! Core data types for the Wavesearch service.
//!
//! This module contains the fundamental data structures used throughout
//! the pipeline: search wire types, documents, queries, and chat messages.

pub mod chat;
pub mod document;
pub mod query;
pub mod search;

// Re-export all types for convenience
pub use chat::*;
pub use document::*;
pub use query::*;
pub use search::*;
