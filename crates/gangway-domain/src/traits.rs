//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction pipeline and
//! infrastructure. Implementations live in other crates (`gangway-index`,
//! `gangway-llm`); the pipeline is generic over both so tests can substitute
//! deterministic mocks.

use crate::chunk::ContextChunk;
use crate::params::GenerationParams;
use async_trait::async_trait;

/// A single query against the document index
///
/// The metadata filter is an exact-match equality constraint. It is the only
/// mechanism scoping an otherwise global semantic index down to one logical
/// document's chunks, so implementations must honor it server-side and
/// callers must never weaken it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    /// Metadata key to filter on (e.g. "loanBookingId")
    pub metadata_key: String,

    /// Exact value the key must equal
    pub metadata_value: String,

    /// Semantic query text ranking the results
    pub query_text: String,

    /// Maximum number of chunks to return
    pub top_k: usize,
}

/// Semantic retrieval service scoping chunks to a document by metadata filter
///
/// Implemented by the infrastructure layer (`gangway-index`).
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Error type for index operations
    type Error: std::fmt::Display + Send;

    /// Run one filtered query, returning chunks ranked relevance-descending
    async fn retrieve(&self, query: &IndexQuery) -> Result<Vec<ContextChunk>, Self::Error>;
}

/// Text-generation model boundary: prompt in, raw text out
///
/// Implemented by the infrastructure layer (`gangway-llm`). Sampling
/// overrides arrive per call in [`GenerationParams`]; implementations must
/// not fold them into shared mutable state.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Error type for generation operations
    type Error: std::fmt::Display + Send;

    /// Generate a completion for a single-turn user prompt
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, Self::Error>;
}
