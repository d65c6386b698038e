//! End-to-end tests of the web-search chat pipeline with stubbed search
//! and LLM backends.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wavesearch_core::{
    ChatMemory, ChatMessage, GeneratedResponse, GenerationOptions, GenericSearchResult, Query,
    ResponseGenerator, Result, TextStream,
};
use wavesearch_core::types::{OriginalQuery, QueryContext, ScorePageItem};
use wavesearch_query::engine::WebSearchEngine;
use wavesearch_query::memory::InMemoryChatMemory;
use wavesearch_query::rerank::LlmDocumentRanker;
use wavesearch_query::retriever::{SearchSource, WebSearchRetriever};

/// Search backend returning canned page items.
#[derive(Debug)]
struct StubSearch {
    items: Vec<(&'static str, &'static str)>,
    calls: AtomicUsize,
}

impl StubSearch {
    fn new(items: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            items,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SearchSource for StubSearch {
    async fn search(&self, query: &Query) -> Result<GenericSearchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GenericSearchResult {
            query_context: Some(QueryContext {
                original_query: Some(OriginalQuery {
                    query: Some(query.text.clone()),
                    time_range: Some("OneWeek".to_string()),
                }),
            }),
            page_items: self
                .items
                .iter()
                .map(|(link, text)| ScorePageItem {
                    title: Some((*link).to_string()),
                    link: Some(format!("https://example.com/{link}")),
                    main_text: Some((*text).to_string()),
                    ..ScorePageItem::default()
                })
                .collect(),
        })
    }
}

/// Generator that streams a fixed reply and answers completions with a
/// fixed ranking.
#[derive(Debug)]
struct StubGenerator {
    reply: &'static str,
    completion: &'static str,
}

#[async_trait]
impl ResponseGenerator for StubGenerator {
    async fn generate(
        &self,
        _messages: &[ChatMessage],
        _options: &GenerationOptions,
    ) -> Result<GeneratedResponse> {
        Ok(GeneratedResponse::new(self.completion))
    }

    async fn generate_stream(
        &self,
        _messages: &[ChatMessage],
        _options: &GenerationOptions,
    ) -> Result<TextStream> {
        let chunks: Vec<Result<String>> = self
            .reply
            .split_inclusive(' ')
            .map(|chunk| Ok(chunk.to_string()))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

fn engine_with(
    search: StubSearch,
    generator: Arc<dyn ResponseGenerator>,
    memory: Option<Arc<InMemoryChatMemory>>,
) -> WebSearchEngine {
    let retriever = WebSearchRetriever::builder()
        .search_source(search)
        .ranker(Arc::new(LlmDocumentRanker::new(generator.clone())))
        .max_results(2)
        .build();

    let mut builder = WebSearchEngine::builder()
        .retriever(Arc::new(retriever))
        .generator(generator);
    if let Some(memory) = memory {
        builder = builder.memory(memory);
    }
    builder.build().unwrap()
}

async fn collect(mut stream: TextStream) -> String {
    let mut output = String::new();
    while let Some(chunk) = stream.next().await {
        output.push_str(&chunk.unwrap());
    }
    output
}

#[tokio::test]
async fn test_chat_stream_end_to_end() {
    let generator = Arc::new(StubGenerator {
        reply: "<think>checking sources</think>Rust 1.89 released this week.",
        completion: "1. Document 2\n2. Document 1",
    });
    let search = StubSearch::new(vec![
        ("release-notes", "Rust 1.89 brings const generics improvements."),
        ("blog", "The release landed on schedule."),
    ]);
    let engine = engine_with(search, generator, None);

    let stream = engine.chat_stream("latest rust release", None).await.unwrap();
    assert_eq!(collect(stream).await, "Rust 1.89 released this week.");
}

#[tokio::test]
async fn test_search_returns_cleaned_capped_documents() {
    let generator = Arc::new(StubGenerator {
        reply: "unused",
        completion: "1. Document 1\n2. Document 2",
    });
    let search = StubSearch::new(vec![
        ("a", "<p>First   result</p>"),
        ("b", "Second result"),
        ("c", "Third result never survives the cap"),
    ]);
    let engine = engine_with(search, generator, None);

    let documents = engine.search("anything").await.unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].content, "First   result");
    assert!(documents[0].get_metadata_string("link").is_some());
}

#[tokio::test]
async fn test_conversation_history_accumulates_across_turns() {
    let generator = Arc::new(StubGenerator {
        reply: "an answer",
        completion: "1. Document 1",
    });
    let search = StubSearch::new(vec![("page", "some context")]);
    let memory = Arc::new(InMemoryChatMemory::default());
    let engine = engine_with(search, generator, Some(memory.clone()));

    let stream = engine.chat_stream("first question", Some("conv")).await.unwrap();
    collect(stream).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let stream = engine.chat_stream("second question", Some("conv")).await.unwrap();
    collect(stream).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let messages = memory.get("conv", 10).await.unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].content, "first question");
    assert_eq!(messages[1].content, "an answer");
    assert_eq!(messages[2].content, "second question");
}

#[tokio::test]
async fn test_conversations_do_not_leak_across_ids() {
    let generator = Arc::new(StubGenerator {
        reply: "reply",
        completion: "1. Document 1",
    });
    let search = StubSearch::new(vec![("page", "context")]);
    let memory = Arc::new(InMemoryChatMemory::default());
    let engine = engine_with(search, generator, Some(memory.clone()));

    let stream = engine.chat_stream("hello", Some("alpha")).await.unwrap();
    collect(stream).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert!(memory.get("beta", 10).await.unwrap().is_empty());
    assert_eq!(memory.get("alpha", 10).await.unwrap().len(), 2);
}
