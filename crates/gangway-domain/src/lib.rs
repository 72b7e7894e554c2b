//! Gangway Domain Layer
//!
//! Core types and trait boundaries for structured loan-document extraction.
//! This crate defines what the rest of the workspace talks about:
//!
//! - **ContextChunk**: a retrieved span of source-document text with
//!   relevance score and source attribution
//! - **SchemaDefinition / SchemaRegistry**: the named JSON schemas an
//!   extraction must populate, with instance validation
//! - **GenerationParams**: call-scoped sampling overrides (never shared
//!   mutable state)
//! - **DocumentIndex / TextGenerator**: async trait boundaries implemented
//!   by the infrastructure crates
//!
//! Infrastructure implementations (HTTP clients, mocks) live in
//! `gangway-index` and `gangway-llm`; the pipeline lives in
//! `gangway-extractor`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod params;
pub mod registry;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use chunk::{ContextChunk, SourceMetadata};
pub use params::GenerationParams;
pub use registry::SchemaRegistry;
pub use schema::{SchemaDefinition, SchemaError, SchemaViolation};
pub use traits::{DocumentIndex, IndexQuery, TextGenerator};
