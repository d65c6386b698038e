//! Response generation trait: the seam toward the LLM provider.

use async_trait::async_trait;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

use crate::{ChatMessage, Result};

/// Stream of generated text chunks.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Options controlling a single generation call.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// System prompt override.
    pub system_prompt: Option<String>,

    /// Sampling temperature override.
    pub temperature: Option<f32>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<usize>,
}

impl GenerationOptions {
    /// Set the system prompt.
    #[must_use]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A complete (non-streamed) generation result.
#[derive(Debug, Clone)]
pub struct GeneratedResponse {
    /// The generated text.
    pub content: String,

    /// Provider metadata (model name, token counts, ...).
    pub metadata: HashMap<String, serde_json::Value>,
}

impl GeneratedResponse {
    /// Create a response from plain text.
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }
}

/// Generates responses from an LLM.
///
/// This is the only place the service touches a model provider; everything
/// that needs an LLM (generation, rewriting, reranking) goes through it.
#[async_trait]
pub trait ResponseGenerator: Send + Sync + std::fmt::Debug {
    /// Generate a complete response for a conversation.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<GeneratedResponse>;

    /// Generate a streaming response for a conversation.
    async fn generate_stream(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<TextStream>;

    /// Convenience: run a single-prompt completion and return its text.
    ///
    /// Used by transformers and rankers that need one-shot LLM calls.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages = vec![ChatMessage::user(prompt)];
        let response = self.generate(&messages, &GenerationOptions::default()).await?;
        Ok(response.content)
    }

    /// Get a human-readable name for this generator.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
