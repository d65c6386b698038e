//! High-level web-search chat engine.
//!
//! `WebSearchEngine` orchestrates the complete pipeline: conversation
//! history, query transformation and expansion, retrieval, joining, prompt
//! augmentation, and streamed generation with thinking-span filtering.

use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, info, instrument};

use wavesearch_core::{
    ChatMemory, ChatMessage, Document, DocumentJoiner, DocumentRetriever, GenerationOptions,
    MemoryConfig, Query, QueryAugmenter, QueryExpander, QueryTransformer, ResponseGenerator,
    Result, TextStream, WavesearchError,
};

use crate::join::ConcatenationJoiner;
use crate::postprocess::ThinkingContentFilter;
use crate::transform::ContextualAugmenter;

/// Engine tunables independent of the wired components.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ask the question twice in the generation prompt. Repeating the
    /// question measurably improves reasoning on some models.
    pub re_reading: bool,

    /// How many recent messages to load as conversation context.
    pub memory_retrieve_size: usize,

    /// Options passed to every generation call.
    pub generation_options: GenerationOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            re_reading: false,
            memory_retrieve_size: MemoryConfig::default().retrieve_size,
            generation_options: GenerationOptions::default(),
        }
    }
}

/// Retrieval-augmented chat over live web search.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use futures::StreamExt;
/// use wavesearch_core::{DocumentRetriever, ResponseGenerator};
/// use wavesearch_query::engine::WebSearchEngine;
///
/// # async fn example(
/// #     retriever: Arc<dyn DocumentRetriever>,
/// #     generator: Arc<dyn ResponseGenerator>,
/// # ) -> wavesearch_core::Result<()> {
/// let engine = WebSearchEngine::builder()
///     .retriever(retriever)
///     .generator(generator)
///     .build()?;
///
/// let mut stream = engine.chat_stream("latest rust release", None).await?;
/// while let Some(chunk) = stream.next().await {
///     print!("{}", chunk?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WebSearchEngine {
    retriever: Arc<dyn DocumentRetriever>,
    generator: Arc<dyn ResponseGenerator>,
    transformers: Vec<Arc<dyn QueryTransformer>>,
    expander: Option<Arc<dyn QueryExpander>>,
    joiner: Arc<dyn DocumentJoiner>,
    augmenter: Arc<dyn QueryAugmenter>,
    memory: Option<Arc<dyn ChatMemory>>,
    config: EngineConfig,
}

impl WebSearchEngine {
    /// Create a builder for wiring up an engine.
    #[must_use]
    pub fn builder() -> WebSearchEngineBuilder {
        WebSearchEngineBuilder::new()
    }

    /// Run the full pipeline and stream the generated answer.
    ///
    /// With a conversation id and a memory store, recent history is loaded
    /// as context and the user and assistant turns are recorded once the
    /// stream completes.
    #[instrument(skip(self), fields(engine = "WebSearchEngine"))]
    pub async fn chat_stream(
        &self,
        prompt: &str,
        conversation_id: Option<&str>,
    ) -> Result<TextStream> {
        if prompt.trim().is_empty() {
            return Err(WavesearchError::validation("prompt must not be empty"));
        }
        info!("Processing chat request: {prompt}");

        let history = match (conversation_id, &self.memory) {
            (Some(id), Some(memory)) => memory.get(id, self.config.memory_retrieve_size).await?,
            _ => Vec::new(),
        };

        let mut query = Query::builder()
            .text(prompt)
            .history_messages(history.clone())
            .build();
        if self.config.re_reading {
            query = query.with_text(format!("{prompt}\nRead the question again: {prompt}"));
        }

        for transformer in &self.transformers {
            query = transformer.transform(query).await?;
            debug!("After {}: {}", transformer.name(), query.text);
        }

        let queries = match &self.expander {
            Some(expander) => expander.expand(&query).await?,
            None => vec![query.clone()],
        };

        let mut results = Vec::with_capacity(queries.len());
        for variant in &queries {
            results.push(self.retriever.retrieve(variant).await?);
        }
        let documents = self.joiner.join(results).await?;
        debug!(
            "Joined {} retrievals into {} context documents",
            queries.len(),
            documents.len()
        );

        let user_prompt = self.augmenter.augment(&query, &documents).await?;

        let mut messages = history;
        messages.push(ChatMessage::user(user_prompt));
        let stream = self
            .generator
            .generate_stream(&messages, &self.config.generation_options)
            .await?;
        let stream = ThinkingContentFilter::filter_stream(stream);

        if let (Some(id), Some(memory)) = (conversation_id, &self.memory) {
            memory.add(id, vec![ChatMessage::user(prompt)]).await?;
            return Ok(Box::pin(RecordingStream {
                inner: stream,
                memory: Arc::clone(memory),
                conversation_id: id.to_string(),
                buffer: String::new(),
                recorded: false,
            }));
        }

        Ok(stream)
    }

    /// Retrieve context documents for a query without generating an answer.
    #[instrument(skip(self), fields(engine = "WebSearchEngine"))]
    pub async fn search(&self, query_text: &str) -> Result<Vec<Document>> {
        if query_text.trim().is_empty() {
            return Err(WavesearchError::validation("query must not be empty"));
        }
        self.retriever.retrieve(&Query::new(query_text)).await
    }

    /// The memory store this engine records conversations in, if any.
    pub fn memory(&self) -> Option<&Arc<dyn ChatMemory>> {
        self.memory.as_ref()
    }
}

/// Tee stream that records the assembled assistant turn when it finishes.
struct RecordingStream {
    inner: TextStream,
    memory: Arc<dyn ChatMemory>,
    conversation_id: String,
    buffer: String,
    recorded: bool,
}

impl Stream for RecordingStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                self.buffer.push_str(&chunk);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => {
                if !self.recorded {
                    self.recorded = true;
                    if !self.buffer.is_empty() {
                        let memory = Arc::clone(&self.memory);
                        let conversation_id = std::mem::take(&mut self.conversation_id);
                        let content = std::mem::take(&mut self.buffer);
                        tokio::spawn(async move {
                            if let Err(e) = memory
                                .add(&conversation_id, vec![ChatMessage::assistant(content)])
                                .await
                            {
                                tracing::warn!("Failed to record assistant turn: {e}");
                            }
                        });
                    }
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Builder for [`WebSearchEngine`].
#[derive(Default)]
pub struct WebSearchEngineBuilder {
    retriever: Option<Arc<dyn DocumentRetriever>>,
    generator: Option<Arc<dyn ResponseGenerator>>,
    transformers: Vec<Arc<dyn QueryTransformer>>,
    expander: Option<Arc<dyn QueryExpander>>,
    joiner: Option<Arc<dyn DocumentJoiner>>,
    augmenter: Option<Arc<dyn QueryAugmenter>>,
    memory: Option<Arc<dyn ChatMemory>>,
    config: EngineConfig,
}

impl std::fmt::Debug for WebSearchEngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearchEngineBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WebSearchEngineBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document retriever (required).
    #[must_use]
    pub fn retriever(mut self, retriever: Arc<dyn DocumentRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Set the response generator (required).
    #[must_use]
    pub fn generator(mut self, generator: Arc<dyn ResponseGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Append a query transformer; transformers run in insertion order.
    #[must_use]
    pub fn transformer(mut self, transformer: Arc<dyn QueryTransformer>) -> Self {
        self.transformers.push(transformer);
        self
    }

    /// Set the query expander.
    #[must_use]
    pub fn expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Set the result joiner.
    #[must_use]
    pub fn joiner(mut self, joiner: Arc<dyn DocumentJoiner>) -> Self {
        self.joiner = Some(joiner);
        self
    }

    /// Set the prompt augmenter.
    #[must_use]
    pub fn augmenter(mut self, augmenter: Arc<dyn QueryAugmenter>) -> Self {
        self.augmenter = Some(augmenter);
        self
    }

    /// Set the conversation memory store.
    #[must_use]
    pub fn memory(mut self, memory: Arc<dyn ChatMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Enable or disable question re-reading in the generation prompt.
    #[must_use]
    pub fn re_reading(mut self, enable: bool) -> Self {
        self.config.re_reading = enable;
        self
    }

    /// Set how many recent messages are loaded as conversation context.
    #[must_use]
    pub fn memory_retrieve_size(mut self, size: usize) -> Self {
        self.config.memory_retrieve_size = size;
        self
    }

    /// Set the default generation options.
    #[must_use]
    pub fn generation_options(mut self, options: GenerationOptions) -> Self {
        self.config.generation_options = options;
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the retriever or generator is
    /// missing.
    pub fn build(self) -> Result<WebSearchEngine> {
        let retriever = self
            .retriever
            .ok_or_else(|| WavesearchError::configuration("retriever is required"))?;
        let generator = self
            .generator
            .ok_or_else(|| WavesearchError::configuration("generator is required"))?;

        Ok(WebSearchEngine {
            retriever,
            generator,
            transformers: self.transformers,
            expander: self.expander,
            joiner: self
                .joiner
                .unwrap_or_else(|| Arc::new(ConcatenationJoiner::new())),
            augmenter: self
                .augmenter
                .unwrap_or_else(|| Arc::new(ContextualAugmenter::new())),
            memory: self.memory,
            config: self.config,
        })
    }
}
