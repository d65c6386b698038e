//! LLM response generation through the Siumai client.

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use siumai::prelude::Siumai;
use siumai::traits::ChatCapability;
use siumai::types::ChatStreamEvent;

use wavesearch_core::{
    ChatMessage, GeneratedResponse, GenerationOptions, MessageRole, ResponseGenerator, Result,
    TextStream, WavesearchError,
};

/// Generator backed by the unified Siumai LLM interface.
///
/// Model, provider, and sampling defaults are fixed when the client is
/// built; per-call [`GenerationOptions`] can add a system prompt on top.
///
/// # Examples
///
/// ```rust,no_run
/// use siumai::prelude::Siumai;
/// use wavesearch_query::generator::SiumaiGenerator;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = Siumai::builder()
///     .openai()
///     .api_key("sk-...")
///     .model("qwen-plus")
///     .temperature(0.7)
///     .build()
///     .await?;
/// let generator = SiumaiGenerator::new(client);
/// # Ok(())
/// # }
/// ```
pub struct SiumaiGenerator {
    client: Siumai,
}

impl std::fmt::Debug for SiumaiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiumaiGenerator").finish_non_exhaustive()
    }
}

impl SiumaiGenerator {
    /// Create a generator over an already-built Siumai client.
    pub fn new(client: Siumai) -> Self {
        Self { client }
    }

    /// Convert conversation messages into the provider's message format.
    fn build_messages(
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Vec<siumai::types::ChatMessage> {
        let mut converted = Vec::with_capacity(messages.len() + 1);

        if let Some(system_prompt) = &options.system_prompt {
            converted.push(siumai::types::ChatMessage::system(system_prompt).build());
        }
        for message in messages {
            let builder = match message.role {
                MessageRole::System => siumai::types::ChatMessage::system(&message.content),
                MessageRole::User => siumai::types::ChatMessage::user(&message.content),
                MessageRole::Assistant => siumai::types::ChatMessage::assistant(&message.content),
            };
            converted.push(builder.build());
        }

        converted
    }
}

#[async_trait]
impl ResponseGenerator for SiumaiGenerator {
    #[instrument(skip(self, messages), fields(generator = "SiumaiGenerator"))]
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<GeneratedResponse> {
        debug!("Generating response for {} messages", messages.len());

        let chat_messages = Self::build_messages(messages, options);
        let response = self
            .client
            .chat(chat_messages)
            .await
            .map_err(|e| WavesearchError::llm(format!("generation failed: {e}")))?;

        let content = response.content.all_text();

        let mut metadata = HashMap::new();
        if let Some(model) = &response.model {
            metadata.insert("model".to_string(), serde_json::json!(model));
        }
        if let Some(usage) = &response.usage {
            metadata.insert(
                "total_tokens".to_string(),
                serde_json::json!(usage.total_tokens),
            );
        }

        info!("Generated response with {} characters", content.len());
        Ok(GeneratedResponse { content, metadata })
    }

    #[instrument(skip(self, messages), fields(generator = "SiumaiGenerator"))]
    async fn generate_stream(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<TextStream> {
        debug!("Starting streaming response for {} messages", messages.len());

        let chat_messages = Self::build_messages(messages, options);
        let stream = self
            .client
            .chat_stream(chat_messages, None)
            .await
            .map_err(|e| WavesearchError::llm(format!("streaming failed: {e}")))?;

        // Reasoning deltas are dropped here; inline <think> spans in the
        // content itself are the postprocess filter's concern.
        let content_stream = stream.filter_map(|event| async move {
            match event {
                Ok(ChatStreamEvent::ContentDelta { delta, .. }) => Some(Ok(delta)),
                Ok(_) => None,
                Err(e) => Some(Err(WavesearchError::llm(format!("stream error: {e}")))),
            }
        });

        Ok(Box::pin(content_stream))
    }

    fn name(&self) -> &'static str {
        "SiumaiGenerator"
    }
}
