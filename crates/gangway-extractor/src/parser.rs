//! Parsing and validation of model output
//!
//! Models are instructed to answer with bare JSON, but they still wrap
//! output in markdown fences often enough that stripping them is part of the
//! contract. After cleanup the text must structurally look like a JSON
//! object before the real parse runs; anything that fails to parse or fails
//! schema validation is a full failure - there is no best-effort repair and
//! no partial success.

use crate::error::ExtractError;
use gangway_domain::{ContextChunk, SchemaDefinition};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// Parsed two-key envelope of a field-citation response
#[derive(Debug, Clone)]
pub struct CitationEnvelope {
    /// The extracted fields
    pub extracted_data: Map<String, Value>,

    /// Per-field supporting chunks, resolved from `CHUNK_<n>` labels
    pub field_citations: BTreeMap<String, Vec<ContextChunk>>,
}

/// Strip surrounding whitespace and markdown code fences
fn clean_output(raw: &str) -> &str {
    let mut cleaned = raw.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Clean, structurally gate, and strictly parse one JSON object
fn parse_object(raw: &str) -> Result<Map<String, Value>, ExtractError> {
    let cleaned = clean_output(raw);

    if cleaned.is_empty() {
        error!("parsing failed: model output was empty");
        return Err(ExtractError::Parse("model output was empty".to_string()));
    }

    // Cheap structural check before the full parse.
    if !(cleaned.starts_with('{') && cleaned.ends_with('}')) {
        let head: String = cleaned.chars().take(50).collect();
        let tail: String = {
            let chars: Vec<char> = cleaned.chars().collect();
            chars[chars.len().saturating_sub(50)..].iter().collect()
        };
        error!(
            starts_with = %head,
            ends_with = %tail,
            "parsing failed: output does not appear to be a JSON object"
        );
        return Err(ExtractError::Parse(
            "output does not start with '{' and end with '}'".to_string(),
        ));
    }

    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ExtractError::Parse(
            "output is valid JSON but not an object".to_string(),
        )),
        Err(e) => {
            error!("JSON parsing failed: {e}");
            error!("cleaned output that failed parsing:\n{cleaned}");
            Err(ExtractError::Parse(e.to_string()))
        }
    }
}

/// Parse a plain extraction response, optionally validating against a schema
///
/// When `schema` is `None` validation is skipped and logged as skipped - a
/// degraded mode, not a failure. A syntactically valid but schema-violating
/// document is treated as a full failure.
pub fn parse_structured(
    raw: &str,
    schema: Option<&SchemaDefinition>,
) -> Result<Map<String, Value>, ExtractError> {
    let parsed = Value::Object(parse_object(raw)?);
    info!("successfully parsed JSON output from model");

    match schema {
        Some(schema) => {
            if let Err(violation) = schema.validate(&parsed) {
                error!(
                    schema = schema.name(),
                    path = %violation.path,
                    "schema validation failed: {}",
                    violation.message
                );
                error!(
                    "invalid data structure:\n{}",
                    serde_json::to_string_pretty(&parsed).unwrap_or_default()
                );
                return Err(ExtractError::Validation {
                    schema: schema.name().to_string(),
                    violation: violation.to_string(),
                });
            }
            info!(schema = schema.name(), "output validated against schema");
        }
        None => debug!("skipping schema validation (no schema provided)"),
    }

    match parsed {
        Value::Object(map) => Ok(map),
        _ => unreachable!("parse_object only returns objects"),
    }
}

/// Parse a field-citation response and resolve chunk labels
///
/// The envelope must carry `extracted_data` as an object; a malformed
/// envelope fails the whole call. Individual citation tokens are advisory:
/// malformed or out-of-range labels are dropped silently, and a field whose
/// citation value is not a list resolves to no citations.
pub fn parse_with_citations(
    raw: &str,
    chunks: &[ContextChunk],
) -> Result<CitationEnvelope, ExtractError> {
    let mut envelope = parse_object(raw)?;

    let extracted_data = match envelope.remove("extracted_data") {
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(ExtractError::Parse(
                "'extracted_data' is not a JSON object".to_string(),
            ))
        }
        None => {
            return Err(ExtractError::Parse(
                "response is missing 'extracted_data'".to_string(),
            ))
        }
    };

    let mut field_citations = BTreeMap::new();
    if let Some(Value::Object(references)) = envelope.remove("field_citations") {
        for (field, tokens) in references {
            let mut resolved = Vec::new();
            if let Value::Array(tokens) = tokens {
                for token in tokens.iter().filter_map(Value::as_str) {
                    match resolve_citation_token(token) {
                        Some(index) if index < chunks.len() => {
                            resolved.push(chunks[index].clone());
                        }
                        Some(_) => {
                            debug!(field = %field, token, "citation index out of range; dropped");
                        }
                        None => {
                            debug!(field = %field, token, "malformed citation token; dropped");
                        }
                    }
                }
            }
            field_citations.insert(field, resolved);
        }
    }

    Ok(CitationEnvelope {
        extracted_data,
        field_citations,
    })
}

/// Map a `CHUNK_<n>` label to a zero-based chunk index
///
/// Anything that is not `CHUNK_` followed by a positive integer is `None`.
pub fn resolve_citation_token(token: &str) -> Option<usize> {
    let number: usize = token.strip_prefix("CHUNK_")?.parse().ok()?;
    number.checked_sub(1)
}
