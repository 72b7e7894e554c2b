//! Gangway Document Index Layer
//!
//! Implementations of the `DocumentIndex` trait from `gangway-domain`, plus
//! the context retriever that turns raw index queries into the two-step
//! probe-then-retrieve flow the extraction pipeline relies on.
//!
//! # Components
//!
//! - `MockIndex`: deterministic mock for testing
//! - `KnowledgeBaseClient`: HTTP client for a managed knowledge-base
//!   retrieve API
//! - `ContextRetriever`: existence probe + metadata-scoped retrieval
//!
//! # Examples
//!
//! ```
//! use gangway_index::{ContextRetriever, MockIndex};
//! use gangway_domain::ContextChunk;
//!
//! # async fn example() {
//! let mut index = MockIndex::new();
//! index.add_document("doc_abc", vec![ContextChunk::new("Borrower: Acme Corp.", 0.9)]);
//!
//! let retriever = ContextRetriever::new(index);
//! let chunks = retriever
//!     .retrieve_document_chunks("doc_abc", "loanBookingId", None, 15)
//!     .await
//!     .unwrap();
//! assert_eq!(chunks.len(), 1);
//! # }
//! ```

#![warn(missing_docs)]

pub mod kb;
pub mod retriever;

use async_trait::async_trait;
use gangway_domain::{ContextChunk, DocumentIndex, IndexQuery};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use kb::KnowledgeBaseClient;
pub use retriever::{ContextRetriever, RetrieveError};

/// Errors that can occur talking to a document index
#[derive(Error, Debug)]
pub enum IndexError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The configured knowledge base does not exist
    #[error("Knowledge base not found: {0}")]
    KnowledgeBaseNotFound(String),

    /// Generic error
    #[error("Index error: {0}")]
    Other(String),
}

/// Mock document index for deterministic testing
///
/// Returns pre-configured chunk sets keyed by the query's metadata value,
/// without any network calls. Queries are recorded so tests can assert the
/// filter and `top_k` that reached the index.
#[derive(Debug, Clone, Default)]
pub struct MockIndex {
    documents: Arc<Mutex<HashMap<String, Vec<ContextChunk>>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    queries: Arc<Mutex<Vec<IndexQuery>>>,
}

impl MockIndex {
    /// Create an empty mock index
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the chunk set for a document identifier
    pub fn add_document(&mut self, identifier: impl Into<String>, chunks: Vec<ContextChunk>) {
        self.documents
            .lock()
            .unwrap()
            .insert(identifier.into(), chunks);
    }

    /// Make every query for the given identifier fail
    pub fn add_error(&mut self, identifier: impl Into<String>) {
        self.failing.lock().unwrap().insert(identifier.into());
    }

    /// Number of queries issued so far
    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// All queries issued so far, in order
    pub fn recorded_queries(&self) -> Vec<IndexQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentIndex for MockIndex {
    type Error = IndexError;

    async fn retrieve(&self, query: &IndexQuery) -> Result<Vec<ContextChunk>, Self::Error> {
        self.queries.lock().unwrap().push(query.clone());

        if self.failing.lock().unwrap().contains(&query.metadata_value) {
            return Err(IndexError::Communication("mock index error".to_string()));
        }

        let documents = self.documents.lock().unwrap();
        let mut chunks = documents
            .get(&query.metadata_value)
            .cloned()
            .unwrap_or_default();
        chunks.truncate(query.top_k);
        Ok(chunks)
    }
}
