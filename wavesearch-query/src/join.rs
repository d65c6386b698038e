//! Joining per-query retrieval results.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use wavesearch_core::{Document, DocumentJoiner, Result};

/// Concatenates per-query result lists into one deduplicated list.
///
/// Multi-query expansion retrieves the same page more than once; duplicates
/// are detected by their `link` metadata (falling back to the document id)
/// and collapsed into the first occurrence, keeping the highest score seen.
#[derive(Debug, Default)]
pub struct ConcatenationJoiner;

impl ConcatenationJoiner {
    /// Create a joiner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn dedup_key(document: &Document) -> String {
        document
            .get_metadata_string("link")
            .unwrap_or_else(|| document.id.to_string())
    }
}

#[async_trait]
impl DocumentJoiner for ConcatenationJoiner {
    async fn join(&self, results: Vec<Vec<Document>>) -> Result<Vec<Document>> {
        let mut joined: Vec<Document> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for documents in results {
            for document in documents {
                let key = Self::dedup_key(&document);
                match positions.get(&key) {
                    Some(&pos) => {
                        // Keep the best score a duplicate was retrieved with.
                        if document.score > joined[pos].score {
                            joined[pos].score = document.score;
                        }
                    }
                    None => {
                        positions.insert(key, joined.len());
                        joined.push(document);
                    }
                }
            }
        }

        debug!("Joined result lists into {} documents", joined.len());
        Ok(joined)
    }

    fn name(&self) -> &'static str {
        "ConcatenationJoiner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(link: &str, score: f32) -> Document {
        Document::builder()
            .content(format!("content of {link}"))
            .metadata("link", link)
            .score(score)
            .build()
    }

    #[tokio::test]
    async fn test_join_preserves_first_occurrence_order() {
        let joiner = ConcatenationJoiner::new();
        let joined = joiner
            .join(vec![
                vec![doc("https://a", 0.9), doc("https://b", 0.8)],
                vec![doc("https://c", 0.7)],
            ])
            .await
            .unwrap();

        let links: Vec<String> = joined
            .iter()
            .map(|d| d.get_metadata_string("link").unwrap())
            .collect();
        assert_eq!(links, vec!["https://a", "https://b", "https://c"]);
    }

    #[tokio::test]
    async fn test_join_dedupes_by_link_keeping_best_score() {
        let joiner = ConcatenationJoiner::new();
        let joined = joiner
            .join(vec![
                vec![doc("https://a", 0.5)],
                vec![doc("https://a", 0.9), doc("https://b", 0.4)],
            ])
            .await
            .unwrap();

        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].score, Some(0.9));
    }

    #[tokio::test]
    async fn test_join_falls_back_to_document_id() {
        let joiner = ConcatenationJoiner::new();
        let a = Document::new("no link metadata");
        let b = Document::new("no link metadata");

        let joined = joiner.join(vec![vec![a.clone()], vec![a, b]]).await.unwrap();
        assert_eq!(joined.len(), 2);
    }

    #[tokio::test]
    async fn test_join_empty_input() {
        let joiner = ConcatenationJoiner::new();
        let joined = joiner.join(vec![]).await.unwrap();
        assert!(joined.is_empty());
    }
}
