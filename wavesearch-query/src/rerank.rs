//! LLM-based document reranking.
//!
//! Reorders cleaned documents by asking the LLM to rank them against the
//! query. Ranking is best-effort: any failure, from the LLM call to the
//! response parsing, degrades to the original ordering instead of failing
//! the request.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

use wavesearch_core::{Document, DocumentRanker, Query, ResponseGenerator, Result};

const DEFAULT_RANK_PROMPT: &str = r"Given a query and a list of documents, rank the documents by their relevance to the query, from most relevant to least relevant.

Query: {query}

Documents:
{documents}

Rank all {num_docs} documents. Answer with one line per document in the format:
1. Document X
2. Document Y

Ranking:
";

/// Per-document text budget in the ranking prompt.
const SNIPPET_CHARS: usize = 500;

/// Reranks documents through the `ResponseGenerator` seam.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use wavesearch_core::{DocumentRanker, Query, ResponseGenerator};
/// use wavesearch_query::rerank::LlmDocumentRanker;
///
/// # async fn example(generator: Arc<dyn ResponseGenerator>) -> wavesearch_core::Result<()> {
/// let ranker = LlmDocumentRanker::new(generator);
/// let ranked = ranker.rank(&Query::new("rust news"), vec![]).await?;
/// assert!(ranked.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LlmDocumentRanker {
    generator: Arc<dyn ResponseGenerator>,
    prompt_template: String,
}

impl LlmDocumentRanker {
    /// Create a ranker over the given generator.
    pub fn new(generator: Arc<dyn ResponseGenerator>) -> Self {
        Self {
            generator,
            prompt_template: DEFAULT_RANK_PROMPT.to_string(),
        }
    }

    /// Override the ranking prompt template.
    ///
    /// The template must keep the `{query}`, `{documents}`, and
    /// `{num_docs}` placeholders.
    #[must_use]
    pub fn with_prompt_template<S: Into<String>>(mut self, template: S) -> Self {
        self.prompt_template = template.into();
        self
    }

    fn build_prompt(&self, query: &str, documents: &[Document]) -> String {
        let documents_text = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let snippet: String = doc.content.chars().take(SNIPPET_CHARS).collect();
                format!("Document {}: {}", i + 1, snippet)
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        self.prompt_template
            .replace("{query}", query)
            .replace("{documents}", &documents_text)
            .replace("{num_docs}", &documents.len().to_string())
    }

    /// Parse the LLM's ordering into a permutation of document indices.
    ///
    /// Accepts both "Document X: score" lines and ranked-list lines
    /// ("1. Document X"). Indices the model skipped are appended in their
    /// original order so no document is lost.
    fn parse_ranking(response: &str, num_docs: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();

        for line in response.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parsed = Self::parse_scored_line(line).or_else(|| Self::parse_list_line(line));
            if let Some(idx) = parsed {
                if idx < num_docs && seen.insert(idx) {
                    order.push(idx);
                }
            }
        }

        if order.len() < num_docs {
            warn!(
                "Ranking response covered {} of {} documents, appending the rest in original order",
                order.len(),
                num_docs
            );
        }
        for idx in 0..num_docs {
            if seen.insert(idx) {
                order.push(idx);
            }
        }

        order
    }

    /// Parse a "Document X: score" line into a 0-based index.
    fn parse_scored_line(line: &str) -> Option<usize> {
        let colon = line.find(':')?;
        let doc_part = &line[..colon];
        let score_part = line[colon + 1..].trim();
        score_part.parse::<f32>().ok()?;

        let doc_num: usize = doc_part.split_whitespace().last()?.parse().ok()?;
        (doc_num > 0).then(|| doc_num - 1)
    }

    /// Parse a ranked-list line ("2. Document 3") into a 0-based index.
    ///
    /// The rank prefix is skipped; the document number is the last integer
    /// on the line.
    fn parse_list_line(line: &str) -> Option<usize> {
        let doc_num: usize = line
            .split_whitespace()
            .filter_map(|word| {
                word.trim_end_matches(['.', ',', ':', ';'])
                    .parse::<usize>()
                    .ok()
            })
            .last()?;
        (doc_num > 0).then(|| doc_num - 1)
    }
}

#[async_trait]
impl DocumentRanker for LlmDocumentRanker {
    async fn rank(&self, query: &Query, documents: Vec<Document>) -> Result<Vec<Document>> {
        if documents.is_empty() {
            return Ok(documents);
        }
        if query.text.trim().is_empty() {
            // Nothing to rank against.
            return Ok(documents);
        }

        debug!("Ranking {} documents for query: {}", documents.len(), query.text);

        let prompt = self.build_prompt(&query.text, &documents);
        let response = match self.generator.complete(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                error!("ranking error: {e}");
                return Ok(documents);
            }
        };

        let order = Self::parse_ranking(&response, documents.len());
        let mut slots: Vec<Option<Document>> = documents.into_iter().map(Some).collect();
        let ranked = order
            .into_iter()
            .filter_map(|idx| slots.get_mut(idx).and_then(Option::take))
            .collect();
        Ok(ranked)
    }

    fn name(&self) -> &'static str {
        "LlmDocumentRanker"
    }
}
