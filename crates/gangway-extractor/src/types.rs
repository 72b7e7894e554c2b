//! Request and result types for extraction

use gangway_domain::{ContextChunk, GenerationParams};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Caller-supplied description of one extraction
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Value identifying the document in index metadata
    pub document_identifier: String,

    /// Name of the target schema in the registry
    pub schema_name: String,

    /// Optional query text for the retrieval step; a default is synthesized
    /// from the identifier when absent
    pub retrieval_query: Option<String>,

    /// Temperature override for this call only
    pub temperature: Option<f32>,

    /// Max-tokens override for this call only
    pub max_tokens: Option<u32>,
}

impl ExtractionRequest {
    /// A request with no retrieval or sampling overrides
    pub fn new(document_identifier: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            document_identifier: document_identifier.into(),
            schema_name: schema_name.into(),
            retrieval_query: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the retrieval query
    pub fn with_retrieval_query(mut self, query: impl Into<String>) -> Self {
        self.retrieval_query = Some(query.into());
        self
    }

    /// Set the temperature override
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max-tokens override
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Call-scoped sampling parameters for the generation step
    pub(crate) fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Terminal state of an extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// The pipeline produced a schema-conformant object
    Success,
    /// The pipeline failed; used by callers persisting failure records
    Failure,
}

/// A completed structured extraction
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Identifier of the source document
    pub document_identifier: String,

    /// Name of the schema the output conforms to
    pub schema_used: String,

    /// Extracted fields; exactly the schema's property keys, `null` where
    /// the context held no answer
    pub extracted_data: Map<String, Value>,

    /// Terminal state
    #[serde(rename = "extraction_status")]
    pub status: ExtractionStatus,
}

/// A structured extraction with per-field source attribution
#[derive(Debug, Clone, Serialize)]
pub struct FieldCitationResult {
    /// Identifier of the source document
    pub document_identifier: String,

    /// Name of the schema the output conforms to
    pub schema_used: String,

    /// Extracted fields
    pub extracted_data: Map<String, Value>,

    /// Terminal state
    #[serde(rename = "extraction_status")]
    pub status: ExtractionStatus,

    /// Every chunk that was in front of the model
    pub citations: Vec<ContextChunk>,

    /// Per-field supporting chunks, as claimed by the model
    pub field_citations: BTreeMap<String, Vec<ContextChunk>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = ExtractionRequest::new("doc_abc", "loan_booking_sheet")
            .with_retrieval_query("maturity and fees")
            .with_temperature(0.2)
            .with_max_tokens(2048);

        assert_eq!(request.document_identifier, "doc_abc");
        assert_eq!(request.retrieval_query.as_deref(), Some("maturity and fees"));

        let params = request.generation_params();
        assert_eq!(params.temperature, Some(0.2));
        assert_eq!(params.max_tokens, Some(2048));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let result = ExtractionResult {
            document_identifier: "doc_abc".to_string(),
            schema_used: "loan_booking_sheet".to_string(),
            extracted_data: Map::new(),
            status: ExtractionStatus::Success,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["extraction_status"], "success");
    }
}
