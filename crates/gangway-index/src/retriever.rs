//! Document-scoped context retrieval
//!
//! The retriever turns "give me this document's chunks" into two index
//! queries: a cheap top-1 existence probe, then the full-width retrieval.
//! The probe distinguishes "never ingested" from "ingested but nothing
//! relevant" in logs and avoids paying for a wide query against a document
//! that is not in the index at all.

use gangway_domain::{ContextChunk, DocumentIndex, IndexQuery};
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors from the retrieval step
///
/// Transport and API errors from the underlying index are captured as
/// [`RetrieveError::Index`] rather than propagated raw, so the pipeline can
/// report a clean extraction failure instead of crashing.
#[derive(Error, Debug)]
pub enum RetrieveError {
    /// The request was missing a document identifier or metadata key
    #[error("Invalid retrieval request: {0}")]
    InvalidQuery(&'static str),

    /// The existence probe found nothing - the document was never indexed
    #[error("Document '{0}' is not indexed")]
    NotIndexed(String),

    /// The document exists but the scoped query returned no chunks
    #[error("No chunks retrieved for document '{0}'")]
    NoChunks(String),

    /// The index failed (transport, auth, malformed response)
    #[error("Index error: {0}")]
    Index(String),
}

/// Retrieves the chunk set for one logical document
pub struct ContextRetriever<I> {
    index: I,
}

impl<I> ContextRetriever<I>
where
    I: DocumentIndex,
{
    /// Create a retriever over an index client
    pub fn new(index: I) -> Self {
        Self { index }
    }

    /// Access the underlying index
    pub fn index(&self) -> &I {
        &self.index
    }

    /// Fetch the ranked chunks belonging to `document_identifier`
    ///
    /// Both queries carry the same `metadata_key == document_identifier`
    /// equality filter; it is the only thing scoping the index to one
    /// document and must never be weakened. When `query_text` is `None` a
    /// default query is synthesized from the identifier.
    pub async fn retrieve_document_chunks(
        &self,
        document_identifier: &str,
        metadata_key: &str,
        query_text: Option<&str>,
        num_results: usize,
    ) -> Result<Vec<ContextChunk>, RetrieveError> {
        if document_identifier.is_empty() {
            return Err(RetrieveError::InvalidQuery("document identifier is missing"));
        }
        if metadata_key.is_empty() {
            return Err(RetrieveError::InvalidQuery("metadata key is missing"));
        }

        // Existence probe: top-1, synthetic query. Fails fast for documents
        // the knowledge base has not finished ingesting.
        let probe = IndexQuery {
            metadata_key: metadata_key.to_string(),
            metadata_value: document_identifier.to_string(),
            query_text: format!("Validate document with ID {document_identifier}"),
            top_k: 1,
        };

        match self.index.retrieve(&probe).await {
            Ok(results) if results.is_empty() => {
                warn!(
                    document = document_identifier,
                    metadata_key, "document not found in index"
                );
                return Err(RetrieveError::NotIndexed(document_identifier.to_string()));
            }
            Ok(_) => {}
            Err(e) => {
                error!(
                    document = document_identifier,
                    "error during document validation probe: {e}"
                );
                return Err(RetrieveError::Index(e.to_string()));
            }
        }

        let effective_query = match query_text {
            Some(text) => text.to_string(),
            None => format!("Information related to document ID {document_identifier}"),
        };
        info!(
            document = document_identifier,
            metadata_key,
            query = %effective_query,
            "retrieving chunks"
        );

        let main = IndexQuery {
            metadata_key: metadata_key.to_string(),
            metadata_value: document_identifier.to_string(),
            query_text: effective_query,
            top_k: num_results,
        };

        match self.index.retrieve(&main).await {
            Ok(chunks) if chunks.is_empty() => {
                warn!(
                    document = document_identifier,
                    metadata_key,
                    "no chunks retrieved; check that the document is indexed and the metadata mapping is accurate"
                );
                Err(RetrieveError::NoChunks(document_identifier.to_string()))
            }
            Ok(chunks) => {
                info!(
                    document = document_identifier,
                    count = chunks.len(),
                    "retrieved chunks"
                );
                Ok(chunks)
            }
            Err(e) => {
                error!(document = document_identifier, "error during retrieval: {e}");
                Err(RetrieveError::Index(e.to_string()))
            }
        }
    }
}
