//! Server configuration.
//!
//! Settings are layered: compiled-in defaults, then an optional TOML file,
//! then `WAVESEARCH_`-prefixed environment variables (`__` separates
//! nesting, e.g. `WAVESEARCH_SEARCH__API_KEY`).

use serde::{Deserialize, Serialize};
use std::path::Path;

use wavesearch_core::{MemoryConfig, Result, RetrieverConfig, SearchConfig, WavesearchError};

/// Default config file path, relative to the working directory.
const DEFAULT_CONFIG_FILE: &str = "config/wavesearch.toml";

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: HttpConfig,

    /// Web-search provider settings.
    pub search: SearchConfig,

    /// Retrieval settings.
    pub retriever: RetrieverConfig,

    /// Conversation memory settings.
    pub memory: MemoryConfig,

    /// LLM provider settings.
    pub llm: LlmConfig,

    /// Pipeline toggles.
    pub engine: EngineSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Address to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: `openai`, `anthropic`, or `ollama`.
    pub provider: String,

    /// API key; not required for ollama.
    pub api_key: Option<String>,

    /// Model identifier.
    pub model: String,

    /// Provider base URL override (OpenAI-compatible endpoints).
    pub base_url: Option<String>,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum tokens per response.
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: None,
            model: "qwen-plus".to_string(),
            base_url: None,
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

/// Pipeline toggles for the chat engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Repeat the question in the generation prompt.
    pub re_reading: bool,

    /// Rewrite the query for web search before retrieving.
    pub rewrite: bool,

    /// Fold conversation history into a standalone query.
    pub compression: bool,

    /// Expand the query into multiple variants.
    pub multi_query: bool,

    /// Number of variants when multi-query expansion is on.
    pub query_variants: usize,

    /// Answer from model knowledge when retrieval found nothing.
    pub allow_empty_context: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            re_reading: false,
            rewrite: true,
            compression: true,
            multi_query: false,
            query_variants: 2,
            allow_empty_context: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// The file path comes from `WAVESEARCH_CONFIG` when set, otherwise
    /// `config/wavesearch.toml`; a missing file is not an error.
    pub fn load() -> Result<Self> {
        let path = std::env::var("WAVESEARCH_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load configuration from a specific file path plus the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("WAVESEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| WavesearchError::configuration(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| WavesearchError::configuration(e.to_string()))
    }

    /// The `host:port` string to bind the listener to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
