//! Query transformation traits.
//!
//! Transformers run before retrieval and reshape the user's raw input into
//! something a search system handles well: rewriting noise away, resolving
//! history references, translating, or expanding into several variants.
//! Augmenters run after retrieval and fold the retrieved context into the
//! final generation prompt.

use async_trait::async_trait;

use crate::{Document, Query, Result};

/// Transforms a query into a better-suited form for retrieval.
///
/// Transformers consume and return a [`Query`] so they can be chained; a
/// transformer that has nothing to change returns its input untouched.
#[async_trait]
pub trait QueryTransformer: Send + Sync + std::fmt::Debug {
    /// Transform the query.
    ///
    /// Implementations degrade gracefully: if the transformation cannot be
    /// computed (for example the LLM call fails), the original query is
    /// returned rather than an error, unless the input itself is invalid.
    async fn transform(&self, query: Query) -> Result<Query>;

    /// Get a human-readable name for this transformer.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Expands a query into multiple semantically distinct variants.
///
/// Useful for capturing different perspectives of a question and increasing
/// the chance of retrieving relevant context.
#[async_trait]
pub trait QueryExpander: Send + Sync + std::fmt::Debug {
    /// Expand the query. The returned list always contains at least the
    /// original query.
    async fn expand(&self, query: &Query) -> Result<Vec<Query>>;

    /// Get a human-readable name for this expander.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Builds the generation prompt from a query and its retrieved context.
#[async_trait]
pub trait QueryAugmenter: Send + Sync + std::fmt::Debug {
    /// Render the augmented user prompt.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the context is empty and the
    /// augmenter is configured to reject empty context.
    async fn augment(&self, query: &Query, context: &[Document]) -> Result<String>;

    /// Get a human-readable name for this augmenter.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
