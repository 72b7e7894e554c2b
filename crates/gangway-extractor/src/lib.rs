//! Gangway Extractor
//!
//! Turns a document identifier and a named schema into schema-conformant
//! structured data, using retrieved document chunks and a generative model.
//!
//! # Architecture
//!
//! ```text
//! SchemaRegistry → ContextRetriever → PromptBuilder → TextGenerator → Parser/Validator
//! ```
//!
//! Any stage's failure ends the extraction; there are no internal retries
//! and no partial results. The optional field-citation flow additionally
//! asks the model which numbered chunk evidenced each field and resolves
//! those labels back to the retrieved chunks.
//!
//! # Example Usage
//!
//! ```
//! use gangway_domain::{ContextChunk, SchemaRegistry};
//! use gangway_extractor::{Extractor, ExtractorConfig, ExtractionRequest};
//! use gangway_index::MockIndex;
//! use gangway_llm::MockGenerator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut index = MockIndex::new();
//! index.add_document(
//!     "doc_abc",
//!     vec![ContextChunk::new("Governing law: New York.", 0.9)],
//! );
//! let generator = MockGenerator::new("{\"governing_law\": \"New York\"}");
//!
//! let extractor = Extractor::new(
//!     SchemaRegistry::builtin(),
//!     index,
//!     generator,
//!     ExtractorConfig::default(),
//! );
//!
//! let result = extractor
//!     .extract(ExtractionRequest::new("doc_abc", "loan_booking_sheet"))
//!     .await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod types;


pub use config::ExtractorConfig;
pub use error::ExtractError;
pub use extractor::Extractor;
pub use parser::{parse_structured, parse_with_citations, resolve_citation_token, CitationEnvelope};
pub use prompt::PromptBuilder;
pub use types::{
    ExtractionRequest, ExtractionResult, ExtractionStatus, FieldCitationResult,
};
