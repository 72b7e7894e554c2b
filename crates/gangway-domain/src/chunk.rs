//! Retrieved document chunks - the evidence an extraction works from

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source attribution carried by a retrieved chunk
///
/// The index returns whatever metadata was attached at ingestion time. The
/// URI and page number are pulled out because callers surface them in
/// citations; everything else rides along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// URI of the source object (e.g. an S3 location)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Page number within the source document, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Remaining metadata keys returned by the index
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A span of source-document text returned by the document index
///
/// Chunks are read-only evidence: they live for the duration of a single
/// extraction call and are never cached across calls. Ordering within a
/// retrieval result is relevance-descending as returned by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextChunk {
    /// Chunk text as indexed
    pub text: String,

    /// Source attribution
    #[serde(default)]
    pub source: SourceMetadata,

    /// Relevance score assigned by the index
    pub score: f64,
}

impl ContextChunk {
    /// Create a chunk with no source attribution
    pub fn new(text: impl Into<String>, score: f64) -> Self {
        Self {
            text: text.into(),
            source: SourceMetadata::default(),
            score,
        }
    }

    /// Whether the chunk carries any usable text
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_text() {
        assert!(ContextChunk::new("The borrower is Acme Corp.", 0.91).has_text());
        assert!(!ContextChunk::new("", 0.5).has_text());
        assert!(!ContextChunk::new("   \n\t ", 0.5).has_text());
    }

    #[test]
    fn test_metadata_extra_round_trip() {
        let json = serde_json::json!({
            "text": "Maturity date is 2027-06-30.",
            "source": {
                "uri": "s3://loan-docs/abc.pdf",
                "page": 12,
                "loanBookingId": "doc_abc"
            },
            "score": 0.87
        });

        let chunk: ContextChunk = serde_json::from_value(json).unwrap();
        assert_eq!(chunk.source.uri.as_deref(), Some("s3://loan-docs/abc.pdf"));
        assert_eq!(chunk.source.page, Some(12));
        assert_eq!(
            chunk.source.extra.get("loanBookingId"),
            Some(&serde_json::json!("doc_abc"))
        );
    }
}
