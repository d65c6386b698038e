//! Shared application state and component wiring.

use std::sync::Arc;
use tracing::info;

use siumai::prelude::Siumai;

use wavesearch_core::{ChatMemory, ResponseGenerator, Result, WavesearchError};
use wavesearch_query::engine::WebSearchEngine;
use wavesearch_query::memory::InMemoryChatMemory;
use wavesearch_query::rerank::LlmDocumentRanker;
use wavesearch_query::retriever::WebSearchRetriever;
use wavesearch_query::search::GenericSearchClient;
use wavesearch_query::transform::{
    CompressionTransformer, ContextualAugmenter, MultiQueryExpander, RewriteTransformer,
};
use wavesearch_query::generator::SiumaiGenerator;

use crate::config::{AppConfig, LlmConfig};

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The chat engine behind every endpoint.
    pub engine: Arc<WebSearchEngine>,

    /// Conversation store, exposed for memory management endpoints.
    pub memory: Arc<dyn ChatMemory>,
}

impl AppState {
    /// Wire up the full pipeline from configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let generator: Arc<dyn ResponseGenerator> =
            Arc::new(SiumaiGenerator::new(build_llm_client(&config.llm).await?));

        let search_client = GenericSearchClient::new(config.search.clone())?;
        let mut retriever_builder = WebSearchRetriever::builder()
            .search_source(search_client)
            .config(config.retriever.clone());
        if config.retriever.enable_ranker {
            retriever_builder =
                retriever_builder.ranker(Arc::new(LlmDocumentRanker::new(generator.clone())));
        }
        let retriever = retriever_builder.build();

        let memory: Arc<dyn ChatMemory> =
            Arc::new(InMemoryChatMemory::new(config.memory.clone()));

        let mut engine_builder = WebSearchEngine::builder()
            .retriever(Arc::new(retriever))
            .generator(generator.clone())
            .augmenter(Arc::new(
                ContextualAugmenter::new()
                    .with_allow_empty_context(config.engine.allow_empty_context),
            ))
            .memory(memory.clone())
            .memory_retrieve_size(config.memory.retrieve_size)
            .re_reading(config.engine.re_reading);

        if config.engine.compression {
            engine_builder =
                engine_builder.transformer(Arc::new(CompressionTransformer::new(generator.clone())));
        }
        if config.engine.rewrite {
            engine_builder =
                engine_builder.transformer(Arc::new(RewriteTransformer::new(generator.clone())));
        }
        if config.engine.multi_query {
            engine_builder = engine_builder.expander(Arc::new(
                MultiQueryExpander::new(generator).with_num_queries(config.engine.query_variants),
            ));
        }

        let engine = engine_builder.build()?;
        info!("Pipeline wired: provider={}, model={}", config.llm.provider, config.llm.model);

        Ok(Self {
            engine: Arc::new(engine),
            memory,
        })
    }

    /// Build a state around an already-constructed engine and memory.
    pub fn new(engine: Arc<WebSearchEngine>, memory: Arc<dyn ChatMemory>) -> Self {
        Self { engine, memory }
    }
}

/// Build the Siumai client for the configured provider.
async fn build_llm_client(config: &LlmConfig) -> Result<Siumai> {
    match config.provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = config
                .api_key
                .as_deref()
                .ok_or_else(|| WavesearchError::configuration("llm.api_key is required"))?;
            let mut builder = Siumai::builder()
                .openai()
                .api_key(api_key)
                .model(&config.model)
                .temperature(config.temperature);
            if let Some(base_url) = &config.base_url {
                builder = builder.base_url(base_url);
            }
            if let Some(max_tokens) = config.max_tokens {
                builder = builder.max_tokens(max_tokens);
            }
            builder
                .build()
                .await
                .map_err(|e| WavesearchError::llm(format!("failed to build LLM client: {e}")))
        }
        "anthropic" => {
            let api_key = config
                .api_key
                .as_deref()
                .ok_or_else(|| WavesearchError::configuration("llm.api_key is required"))?;
            let mut builder = Siumai::builder()
                .anthropic()
                .api_key(api_key)
                .model(&config.model)
                .temperature(config.temperature);
            if let Some(max_tokens) = config.max_tokens {
                builder = builder.max_tokens(max_tokens);
            }
            builder
                .build()
                .await
                .map_err(|e| WavesearchError::llm(format!("failed to build LLM client: {e}")))
        }
        "ollama" => {
            let base_url = config.base_url.as_deref().unwrap_or("http://localhost:11434");
            Siumai::builder()
                .ollama()
                .base_url(base_url)
                .model(&config.model)
                .temperature(config.temperature)
                .build()
                .await
                .map_err(|e| WavesearchError::llm(format!("failed to build LLM client: {e}")))
        }
        provider => Err(WavesearchError::configuration(format!(
            "unsupported llm provider: {provider}"
        ))),
    }
}
