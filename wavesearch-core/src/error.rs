//! Error types for the Wavesearch service.
//!
//! This module provides context-aware error types covering search, cleaning,
//! ranking, generation, and memory operations.

use thiserror::Error;

/// Core error type for the Wavesearch service.
///
/// Covers everything that can go wrong between receiving a user query and
/// streaming back a generated answer.
#[derive(Error, Debug)]
pub enum WavesearchError {
    /// I/O related errors (file reading, socket operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport errors from the search provider
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Search provider returned a non-success status or an unusable body
    #[error("Search error: {message}")]
    Search {
        /// Detailed error message
        message: String,
    },

    /// A page item carried a link that could not be parsed as a URL
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// The offending link text
        url: String,
    },

    /// LLM/response generation errors
    #[error("LLM error: {message}")]
    Llm {
        /// Detailed error message
        message: String,
    },

    /// Document ranking errors
    #[error("Ranking error: {message}")]
    Rank {
        /// Detailed error message
        message: String,
    },

    /// Conversation memory errors
    #[error("Memory error: {message}")]
    Memory {
        /// Detailed error message
        message: String,
    },

    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Configuration {
        /// Detailed error message
        message: String,
    },

    /// Input validation errors
    #[error("Validation error: {message}")]
    Validation {
        /// Detailed error message
        message: String,
    },

    /// Generic errors from external dependencies
    #[error("External error: {source}")]
    External {
        /// The underlying error
        #[source]
        source: anyhow::Error,
    },
}

impl WavesearchError {
    /// Create a new search error with a message.
    pub fn search<S: Into<String>>(message: S) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    /// Create a new invalid-URL error for a link.
    pub fn invalid_url<S: Into<String>>(url: S) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Create a new LLM error with a message.
    pub fn llm<S: Into<String>>(message: S) -> Self {
        Self::Llm {
            message: message.into(),
        }
    }

    /// Create a new ranking error with a message.
    pub fn rank<S: Into<String>>(message: S) -> Self {
        Self::Rank {
            message: message.into(),
        }
    }

    /// Create a new memory error with a message.
    pub fn memory<S: Into<String>>(message: S) -> Self {
        Self::Memory {
            message: message.into(),
        }
    }

    /// Create a new configuration error with a message.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new validation error with a message.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new external error from any error that implements `Into<anyhow::Error>`.
    pub fn external<E: Into<anyhow::Error>>(error: E) -> Self {
        Self::External {
            source: error.into(),
        }
    }

    /// Check if this error is retryable.
    ///
    /// Returns `true` for transient errors that might succeed on retry,
    /// such as transport failures toward the search provider.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Io(_) | Self::Search { .. })
    }

    /// Check if this error is a client error (4xx-style).
    ///
    /// Returns `true` for errors caused by invalid input or configuration
    /// that won't be fixed by retrying.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Configuration { .. } | Self::InvalidUrl { .. }
        )
    }
}

/// Convert from `anyhow::Error` to `WavesearchError`.
impl From<anyhow::Error> for WavesearchError {
    fn from(error: anyhow::Error) -> Self {
        Self::External { source: error }
    }
}

/// Result type alias used throughout the Wavesearch crates.
pub type Result<T> = std::result::Result<T, WavesearchError>;
