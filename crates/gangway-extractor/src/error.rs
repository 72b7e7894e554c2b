//! Error taxonomy for the extraction pipeline

use thiserror::Error;

/// Errors that can occur during an extraction
///
/// Every variant is terminal for the call it arose in: the pipeline never
/// retries internally, and partial success is disallowed. Callers are
/// responsible for mapping these onto user-facing status codes; the helper
/// [`ExtractError::is_not_found`] marks the client-error class.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The requested schema name is not registered
    #[error("Schema '{0}' is not defined")]
    SchemaNotFound(String),

    /// The document has no indexed chunks (never ingested, or nothing matched)
    #[error("Document '{0}' has no indexed chunks")]
    DocumentNotFound(String),

    /// The document index was unreachable or errored
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Chunks were retrieved but none carried usable text
    #[error("Context chunks contained no usable text")]
    EmptyContext,

    /// The model was unreachable, errored, or produced no output
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Model output is not valid JSON
    #[error("Model output is not valid JSON: {0}")]
    Parse(String),

    /// Model output is valid JSON but violates the schema
    #[error("Model output violates schema '{schema}': {violation}")]
    Validation {
        /// Name of the schema the output was checked against
        schema: String,
        /// The first violation encountered
        violation: String,
    },
}

impl ExtractError {
    /// Whether this failure is a client-side "not found" rather than a fault
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ExtractError::SchemaNotFound(_) | ExtractError::DocumentNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(ExtractError::SchemaNotFound("x".into()).is_not_found());
        assert!(ExtractError::DocumentNotFound("x".into()).is_not_found());
        assert!(!ExtractError::Retrieval("down".into()).is_not_found());
        assert!(!ExtractError::Parse("bad".into()).is_not_found());
    }
}
