//! Configuration structures for the Wavesearch service.
//!
//! All config types are serde-deserializable so the server can layer them
//! from files and environment variables.

use serde::{Deserialize, Serialize};

use crate::TimeRange;
use crate::{Result, WavesearchError};

/// Connection settings for the generic web-search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the search API.
    pub base_url: String,

    /// API key sent in the `X-API-Key` header.
    pub api_key: String,

    /// Recency window applied to searches.
    pub time_range: TimeRange,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cloud-iqs.aliyuncs.com".to_string(),
            api_key: String::new(),
            time_range: TimeRange::OneWeek,
            user_agent: format!("wavesearch/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 30,
        }
    }
}

impl SearchConfig {
    /// Validate the configuration before building a client from it.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(WavesearchError::configuration("base_url must not be empty"));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(WavesearchError::configuration(format!(
                "base_url is not a valid URL: {}",
                self.base_url
            )));
        }
        if self.api_key.is_empty() {
            return Err(WavesearchError::configuration("api_key must not be empty"));
        }
        Ok(())
    }
}

/// Settings for the web-search retriever.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Maximum number of documents returned by one retrieval.
    pub max_results: usize,

    /// Whether to rerank cleaned documents before returning them.
    pub enable_ranker: bool,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            max_results: 2,
            enable_ranker: true,
        }
    }
}

/// Settings for conversation memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Maximum messages kept per conversation; older ones are dropped.
    pub max_messages: usize,

    /// How many recent messages a chat request loads as context.
    pub retrieve_size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_messages: 500,
            retrieve_size: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_search_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.time_range, TimeRange::OneWeek);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_search_config_validation() {
        let mut config = SearchConfig::default();
        assert!(config.validate().is_err()); // missing api key

        config.api_key = "key".to_string();
        assert!(config.validate().is_ok());

        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retriever_config_defaults() {
        let config = RetrieverConfig::default();
        assert_eq!(config.max_results, 2);
        assert!(config.enable_ranker);
    }
}
