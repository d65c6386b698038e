//! Query transformation before retrieval, and prompt augmentation after.
//!
//! Every LLM-backed transformer degrades gracefully: a failed or empty
//! completion keeps the original query instead of failing the request, on
//! the theory that a worse search beats no answer.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use wavesearch_core::{
    Document, Query, QueryAugmenter, QueryExpander, QueryTransformer, ResponseGenerator, Result,
    WavesearchError,
};

const DEFAULT_REWRITE_PROMPT: &str = r"Given a user query, rewrite it to provide better results when querying a {target}.
Remove any irrelevant information, and ensure the query is concise and specific.

Original query:
{query}

Rewritten query:
";

const DEFAULT_COMPRESSION_PROMPT: &str = r"Given the following conversation history and a follow-up query, your task is to synthesize a concise, standalone query that incorporates the context from the history.
The resulting query should be self-contained and fully understandable without the conversation.

Conversation history:
{history}

Follow-up query: {query}

Standalone query:
";

const DEFAULT_TRANSLATION_PROMPT: &str = r"Given a user query, translate it to {target_language}.
If the query is already in {target_language} or you do not recognize its language, return it unchanged.
Do not add explanations nor any other text.

Original query: {query}

Translated query:
";

const DEFAULT_EXPANSION_PROMPT: &str = r"You are an expert at information retrieval and search optimization.
Generate {num_queries} different versions of the given query.

Each variant must cover a different perspective or aspect of the topic while
keeping the core intent of the original query.
Do not explain your choices or add any other text.
Provide the query variants separated by newlines.

Original query: {query}

Query variants:
";

const DEFAULT_AUGMENT_PROMPT: &str = r"Context information is below.

---------------------
{context}
---------------------

Given the context information and no prior knowledge, answer the query.

Follow these rules:

1. If the answer is not in the context, just say that you don't know.
2. Avoid statements like 'Based on the context...' or 'The provided information...'.

Query: {query}

Answer:
";

const DEFAULT_EMPTY_CONTEXT_PROMPT: &str = r"The user query is outside your knowledge base.
Politely inform the user that you can't answer it.";

/// Rewrites a noisy query into a form the target search system handles well.
#[derive(Debug)]
pub struct RewriteTransformer {
    generator: Arc<dyn ResponseGenerator>,
    target: String,
    prompt_template: String,
}

impl RewriteTransformer {
    /// Create a rewriter targeting a generic web search system.
    pub fn new(generator: Arc<dyn ResponseGenerator>) -> Self {
        Self {
            generator,
            target: "web search engine".to_string(),
            prompt_template: DEFAULT_REWRITE_PROMPT.to_string(),
        }
    }

    /// Name the search system the rewrite optimizes for.
    #[must_use]
    pub fn with_target<S: Into<String>>(mut self, target: S) -> Self {
        self.target = target.into();
        self
    }

    /// Override the rewrite prompt template.
    #[must_use]
    pub fn with_prompt_template<S: Into<String>>(mut self, template: S) -> Self {
        self.prompt_template = template.into();
        self
    }
}

#[async_trait]
impl QueryTransformer for RewriteTransformer {
    async fn transform(&self, query: Query) -> Result<Query> {
        if query.text.trim().is_empty() {
            return Err(WavesearchError::validation("query text must not be empty"));
        }

        let prompt = self
            .prompt_template
            .replace("{target}", &self.target)
            .replace("{query}", &query.text);

        match self.generator.complete(&prompt).await {
            Ok(rewritten) => {
                let rewritten = rewritten.trim();
                if rewritten.is_empty() {
                    warn!("Query rewrite produced empty text, keeping original");
                    Ok(query)
                } else {
                    debug!("Rewrote query '{}' to '{}'", query.text, rewritten);
                    Ok(query.with_text(rewritten))
                }
            }
            Err(e) => {
                warn!("Query rewrite failed, keeping original: {e}");
                Ok(query)
            }
        }
    }

    fn name(&self) -> &'static str {
        "RewriteTransformer"
    }
}

/// Folds conversation history into a standalone query.
///
/// Follow-up questions like "and how much does it cost?" only make sense
/// with the preceding turns; compression resolves those references so the
/// search query is self-contained. Queries without history pass through
/// untouched.
#[derive(Debug)]
pub struct CompressionTransformer {
    generator: Arc<dyn ResponseGenerator>,
    prompt_template: String,
}

impl CompressionTransformer {
    /// Create a compression transformer.
    pub fn new(generator: Arc<dyn ResponseGenerator>) -> Self {
        Self {
            generator,
            prompt_template: DEFAULT_COMPRESSION_PROMPT.to_string(),
        }
    }

    fn render_history(query: &Query) -> String {
        query
            .history
            .iter()
            .map(|message| format!("{}: {}", message.role, message.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl QueryTransformer for CompressionTransformer {
    async fn transform(&self, query: Query) -> Result<Query> {
        if !query.has_history() {
            return Ok(query);
        }

        let prompt = self
            .prompt_template
            .replace("{history}", &Self::render_history(&query))
            .replace("{query}", &query.text);

        match self.generator.complete(&prompt).await {
            Ok(compressed) => {
                let compressed = compressed.trim();
                if compressed.is_empty() {
                    warn!("Query compression produced empty text, keeping original");
                    Ok(query)
                } else {
                    debug!("Compressed query '{}' to '{}'", query.text, compressed);
                    Ok(query.with_text(compressed))
                }
            }
            Err(e) => {
                warn!("Query compression failed, keeping original: {e}");
                Ok(query)
            }
        }
    }

    fn name(&self) -> &'static str {
        "CompressionTransformer"
    }
}

/// Translates the query into the target language.
#[derive(Debug)]
pub struct TranslationTransformer {
    generator: Arc<dyn ResponseGenerator>,
    target_language: String,
    prompt_template: String,
}

impl TranslationTransformer {
    /// Create a translator for the given target language.
    pub fn new<S: Into<String>>(generator: Arc<dyn ResponseGenerator>, target_language: S) -> Self {
        Self {
            generator,
            target_language: target_language.into(),
            prompt_template: DEFAULT_TRANSLATION_PROMPT.to_string(),
        }
    }
}

#[async_trait]
impl QueryTransformer for TranslationTransformer {
    async fn transform(&self, query: Query) -> Result<Query> {
        let prompt = self
            .prompt_template
            .replace("{target_language}", &self.target_language)
            .replace("{query}", &query.text);

        match self.generator.complete(&prompt).await {
            Ok(translated) => {
                let translated = translated.trim();
                if translated.is_empty() {
                    Ok(query)
                } else {
                    Ok(query.with_text(translated))
                }
            }
            Err(e) => {
                warn!("Query translation failed, keeping original: {e}");
                Ok(query)
            }
        }
    }

    fn name(&self) -> &'static str {
        "TranslationTransformer"
    }
}

/// Expands one query into several variants covering different perspectives.
#[derive(Debug)]
pub struct MultiQueryExpander {
    generator: Arc<dyn ResponseGenerator>,
    num_queries: usize,
    include_original: bool,
    prompt_template: String,
}

impl MultiQueryExpander {
    /// Create an expander producing two variants plus the original.
    pub fn new(generator: Arc<dyn ResponseGenerator>) -> Self {
        Self {
            generator,
            num_queries: 2,
            include_original: true,
            prompt_template: DEFAULT_EXPANSION_PROMPT.to_string(),
        }
    }

    /// Set how many variants to generate.
    #[must_use]
    pub fn with_num_queries(mut self, num_queries: usize) -> Self {
        self.num_queries = num_queries;
        self
    }

    /// Control whether the original query is included in the output.
    #[must_use]
    pub fn with_include_original(mut self, include: bool) -> Self {
        self.include_original = include;
        self
    }

    /// Parse variant lines, stripping list numbering and bullets.
    fn parse_variants(&self, text: &str) -> Vec<String> {
        let mut variants = Vec::new();

        for line in text.lines() {
            let cleaned = line
                .trim()
                .trim_start_matches(|c: char| {
                    c.is_ascii_digit() || c == '.' || c == '-' || c == ')' || c.is_whitespace()
                })
                .trim();

            if !cleaned.is_empty() {
                variants.push(cleaned.to_string());
            }
            if variants.len() >= self.num_queries {
                break;
            }
        }

        variants
    }
}

#[async_trait]
impl QueryExpander for MultiQueryExpander {
    async fn expand(&self, query: &Query) -> Result<Vec<Query>> {
        if self.num_queries == 0 {
            return Ok(vec![query.clone()]);
        }

        let prompt = self
            .prompt_template
            .replace("{num_queries}", &self.num_queries.to_string())
            .replace("{query}", &query.text);

        let variants = match self.generator.complete(&prompt).await {
            Ok(response) => self.parse_variants(&response),
            Err(e) => {
                warn!("Query expansion failed, using original only: {e}");
                return Ok(vec![query.clone()]);
            }
        };

        if variants.is_empty() {
            warn!("No query variants parsed from expansion response");
            return Ok(vec![query.clone()]);
        }

        let mut queries = Vec::with_capacity(variants.len() + 1);
        if self.include_original {
            queries.push(query.clone());
        }
        for variant in variants {
            if variant != query.text {
                queries.push(query.with_text(variant));
            }
        }
        if queries.is_empty() {
            queries.push(query.clone());
        }

        debug!("Expanded query into {} variants", queries.len());
        Ok(queries)
    }

    fn name(&self) -> &'static str {
        "MultiQueryExpander"
    }
}

/// Renders the final generation prompt from the query and retrieved context.
#[derive(Debug)]
pub struct ContextualAugmenter {
    prompt_template: String,
    empty_context_template: String,
    allow_empty_context: bool,
}

impl Default for ContextualAugmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextualAugmenter {
    /// Create an augmenter with the default grounding prompt.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prompt_template: DEFAULT_AUGMENT_PROMPT.to_string(),
            empty_context_template: DEFAULT_EMPTY_CONTEXT_PROMPT.to_string(),
            allow_empty_context: false,
        }
    }

    /// Allow answering from model knowledge when retrieval found nothing.
    #[must_use]
    pub fn with_allow_empty_context(mut self, allow: bool) -> Self {
        self.allow_empty_context = allow;
        self
    }

    /// Override the grounding prompt template.
    #[must_use]
    pub fn with_prompt_template<S: Into<String>>(mut self, template: S) -> Self {
        self.prompt_template = template.into();
        self
    }
}

#[async_trait]
impl QueryAugmenter for ContextualAugmenter {
    async fn augment(&self, query: &Query, context: &[Document]) -> Result<String> {
        let text_docs: Vec<&Document> = context.iter().filter(|doc| !doc.is_media()).collect();

        if text_docs.is_empty() {
            if self.allow_empty_context {
                return Ok(query.text.clone());
            }
            // Steer the model toward an honest refusal instead of a
            // hallucinated answer.
            return Ok(format!("{}\n\n{}", self.empty_context_template, query.text));
        }

        let context_text = text_docs
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(self
            .prompt_template
            .replace("{context}", &context_text)
            .replace("{query}", &query.text))
    }

    fn name(&self) -> &'static str {
        "ContextualAugmenter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavesearch_core::{ChatMessage, GeneratedResponse, GenerationOptions, TextStream};

    /// Generator stub: canned completion, failure, or panic on use.
    #[derive(Debug)]
    enum StubGenerator {
        Reply(&'static str),
        Fail,
        Never,
    }

    #[async_trait]
    impl ResponseGenerator for StubGenerator {
        async fn generate(
            &self,
            _messages: &[ChatMessage],
            _options: &GenerationOptions,
        ) -> Result<GeneratedResponse> {
            match self {
                Self::Reply(text) => Ok(GeneratedResponse::new(*text)),
                Self::Fail => Err(WavesearchError::llm("provider down")),
                Self::Never => panic!("unexpected generation call"),
            }
        }

        async fn generate_stream(
            &self,
            _messages: &[ChatMessage],
            _options: &GenerationOptions,
        ) -> Result<TextStream> {
            Ok(Box::pin(futures::stream::empty()))
        }
    }

    fn completing(response: &'static str) -> Arc<dyn ResponseGenerator> {
        Arc::new(StubGenerator::Reply(response))
    }

    fn failing() -> Arc<dyn ResponseGenerator> {
        Arc::new(StubGenerator::Fail)
    }

    #[tokio::test]
    async fn test_rewrite_replaces_query_text() {
        let transformer = RewriteTransformer::new(completing("rust web frameworks 2025"));
        let query = Query::new("so umm what are like the best rust web things??");

        let transformed = transformer.transform(query).await.unwrap();
        assert_eq!(transformed.text, "rust web frameworks 2025");
    }

    #[tokio::test]
    async fn test_rewrite_failure_keeps_original() {
        let transformer = RewriteTransformer::new(failing());
        let transformed = transformer.transform(Query::new("original")).await.unwrap();
        assert_eq!(transformed.text, "original");
    }

    #[tokio::test]
    async fn test_rewrite_rejects_blank_query() {
        let transformer = RewriteTransformer::new(completing("anything"));
        let result = transformer.transform(Query::new("   ")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_compression_skips_queries_without_history() {
        let transformer = CompressionTransformer::new(Arc::new(StubGenerator::Never));
        let transformed = transformer
            .transform(Query::new("standalone question"))
            .await
            .unwrap();
        assert_eq!(transformed.text, "standalone question");
    }

    #[tokio::test]
    async fn test_compression_resolves_history_references() {
        let transformer =
            CompressionTransformer::new(completing("how much does the Tokio course cost"));
        let query = Query::builder()
            .text("and how much does it cost?")
            .history_messages(vec![
                ChatMessage::user("tell me about the Tokio course"),
                ChatMessage::assistant("It covers async Rust in depth."),
            ])
            .build();

        let transformed = transformer.transform(query).await.unwrap();
        assert_eq!(transformed.text, "how much does the Tokio course cost");
        assert!(transformed.has_history());
    }

    #[tokio::test]
    async fn test_translation_replaces_text() {
        let transformer = TranslationTransformer::new(completing("hello world"), "English");
        let transformed = transformer.transform(Query::new("你好，世界")).await.unwrap();
        assert_eq!(transformed.text, "hello world");
    }

    #[tokio::test]
    async fn test_expansion_includes_original_and_variants() {
        let expander = MultiQueryExpander::new(completing(
            "1. rust async runtime comparison\n2. tokio vs async-std performance",
        ));
        let queries = expander.expand(&Query::new("rust async")).await.unwrap();

        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].text, "rust async");
        assert_eq!(queries[1].text, "rust async runtime comparison");
        assert_eq!(queries[2].text, "tokio vs async-std performance");
    }

    #[tokio::test]
    async fn test_expansion_failure_falls_back_to_original() {
        let expander = MultiQueryExpander::new(failing());
        let queries = expander.expand(&Query::new("rust async")).await.unwrap();

        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].text, "rust async");
    }

    #[tokio::test]
    async fn test_augmenter_renders_context_and_query() {
        let augmenter = ContextualAugmenter::new();
        let context = vec![Document::new("Tokio is an async runtime.")];

        let prompt = augmenter
            .augment(&Query::new("what is tokio"), &context)
            .await
            .unwrap();
        assert!(prompt.contains("Tokio is an async runtime."));
        assert!(prompt.contains("what is tokio"));
    }

    #[tokio::test]
    async fn test_augmenter_empty_context_steers_refusal() {
        let augmenter = ContextualAugmenter::new();
        let prompt = augmenter
            .augment(&Query::new("what is tokio"), &[])
            .await
            .unwrap();
        assert!(prompt.contains("outside your knowledge base"));
    }

    #[tokio::test]
    async fn test_augmenter_allows_empty_context_when_configured() {
        let augmenter = ContextualAugmenter::new().with_allow_empty_context(true);
        let prompt = augmenter
            .augment(&Query::new("what is tokio"), &[])
            .await
            .unwrap();
        assert_eq!(prompt, "what is tokio");
    }

    #[tokio::test]
    async fn test_augmenter_skips_media_documents() {
        let augmenter = ContextualAugmenter::new();
        let media = Document::builder()
            .media(wavesearch_core::MediaRef {
                mime: "image/png".to_string(),
                url: "https://example.com/chart.png".to_string(),
            })
            .build();
        let context = vec![Document::new("text context"), media];

        let prompt = augmenter
            .augment(&Query::new("q"), &context)
            .await
            .unwrap();
        assert!(prompt.contains("text context"));
        assert!(!prompt.contains("chart.png"));
    }
}
