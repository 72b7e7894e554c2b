//! End-to-end extraction pipeline
//!
//! One extraction is a straight line: schema lookup, scoped retrieval,
//! prompt construction, generation, parse/validate. Any stage's failure is
//! terminal for the call - there are no internal retries, and the caller
//! imposes its own deadline. The pipeline holds no per-call mutable state,
//! so one shared `Extractor` serves concurrent extractions with full
//! isolation.

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::parser;
use crate::prompt::PromptBuilder;
use crate::types::{
    ExtractionRequest, ExtractionResult, ExtractionStatus, FieldCitationResult,
};
use gangway_domain::{
    ContextChunk, DocumentIndex, SchemaDefinition, SchemaRegistry, TextGenerator,
};
use gangway_index::{ContextRetriever, RetrieveError};
use tracing::{debug, error, info, warn};

/// The extraction pipeline, generic over both service boundaries
///
/// Clients are injected at construction; the host application owns their
/// lifecycle. Tests substitute deterministic mocks for either boundary.
pub struct Extractor<I, G>
where
    I: DocumentIndex,
    G: TextGenerator,
{
    schemas: SchemaRegistry,
    retriever: ContextRetriever<I>,
    generator: G,
    config: ExtractorConfig,
}

impl<I, G> Extractor<I, G>
where
    I: DocumentIndex,
    G: TextGenerator,
{
    /// Create a pipeline over a schema set and both service clients
    pub fn new(schemas: SchemaRegistry, index: I, generator: G, config: ExtractorConfig) -> Self {
        Self {
            schemas,
            retriever: ContextRetriever::new(index),
            generator,
            config,
        }
    }

    /// The pipeline configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract structured data for one document against a named schema
    pub async fn extract(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractError> {
        info!(
            document = %request.document_identifier,
            schema = %request.schema_name,
            "starting structured extraction"
        );

        let schema = self.lookup_schema(&request)?;
        let chunks = self.retrieve_context(&request).await?;
        let raw = self.generate(&chunks, schema, &request, false).await?;

        let validating_schema = if self.config.validate_output {
            Some(schema)
        } else {
            warn!("output validation disabled by configuration; skipping schema validation");
            None
        };

        let extracted_data = parser::parse_structured(&raw, validating_schema).map_err(|e| {
            error!(
                document = %request.document_identifier,
                "could not parse or validate model output"
            );
            e
        })?;

        info!(
            document = %request.document_identifier,
            "successfully extracted structured data"
        );

        Ok(ExtractionResult {
            document_identifier: request.document_identifier,
            schema_used: request.schema_name,
            extracted_data,
            status: ExtractionStatus::Success,
        })
    }

    /// Extract structured data plus per-field source citations
    pub async fn extract_with_citations(
        &self,
        request: ExtractionRequest,
    ) -> Result<FieldCitationResult, ExtractError> {
        info!(
            document = %request.document_identifier,
            schema = %request.schema_name,
            "starting field-level extraction"
        );

        let schema = self.lookup_schema(&request)?;
        let chunks = self.retrieve_context(&request).await?;
        let raw = self.generate(&chunks, schema, &request, true).await?;

        let envelope = parser::parse_with_citations(&raw, &chunks).map_err(|e| {
            error!(
                document = %request.document_identifier,
                "could not parse field-citation response"
            );
            e
        })?;

        info!(
            document = %request.document_identifier,
            cited_fields = envelope.field_citations.len(),
            "successfully extracted with field citations"
        );

        Ok(FieldCitationResult {
            document_identifier: request.document_identifier,
            schema_used: request.schema_name,
            extracted_data: envelope.extracted_data,
            status: ExtractionStatus::Success,
            citations: chunks,
            field_citations: envelope.field_citations,
        })
    }

    /// Stage 1: schema lookup. A miss means retrieval is never attempted.
    fn lookup_schema(&self, request: &ExtractionRequest) -> Result<&SchemaDefinition, ExtractError> {
        self.schemas
            .get(&request.schema_name)
            .ok_or_else(|| ExtractError::SchemaNotFound(request.schema_name.clone()))
    }

    /// Stage 2: probe + scoped retrieval, with failures folded into the
    /// pipeline taxonomy
    async fn retrieve_context(
        &self,
        request: &ExtractionRequest,
    ) -> Result<Vec<ContextChunk>, ExtractError> {
        self.retriever
            .retrieve_document_chunks(
                &request.document_identifier,
                &self.config.metadata_key,
                request.retrieval_query.as_deref(),
                self.config.num_retrieval_results,
            )
            .await
            .map_err(|e| match e {
                RetrieveError::NotIndexed(id) | RetrieveError::NoChunks(id) => {
                    ExtractError::DocumentNotFound(id)
                }
                RetrieveError::InvalidQuery(message) => {
                    ExtractError::Retrieval(message.to_string())
                }
                RetrieveError::Index(message) => ExtractError::Retrieval(message),
            })
    }

    /// Stages 3 and 4: prompt construction and generation
    async fn generate(
        &self,
        chunks: &[ContextChunk],
        schema: &SchemaDefinition,
        request: &ExtractionRequest,
        citations: bool,
    ) -> Result<String, ExtractError> {
        let mut builder = PromptBuilder::new(chunks, schema);
        if citations {
            builder = builder.with_citations();
        }
        let prompt = builder.build().ok_or_else(|| {
            warn!(
                document = %request.document_identifier,
                "context chunks contained no usable text"
            );
            ExtractError::EmptyContext
        })?;

        debug!(prompt_chars = prompt.len(), "constructed prompt");

        // Sampling overrides are call-scoped; nothing shared is mutated.
        let params = request.generation_params();
        self.generator
            .generate(&prompt, &params)
            .await
            .map_err(|e| {
                error!(
                    document = %request.document_identifier,
                    "generation step failed: {e}"
                );
                ExtractError::Generation(e.to_string())
            })
    }
}
