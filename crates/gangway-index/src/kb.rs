//! Knowledge-base retrieve API client
//!
//! HTTP implementation of `DocumentIndex` against a managed knowledge-base
//! service. One call maps to one `POST {endpoint}/knowledgebases/{id}/retrieve`
//! with a vector-search configuration carrying the metadata equality filter;
//! the service honors the filter server-side, which is what scopes a global
//! index to a single logical document.

use crate::IndexError;
use async_trait::async_trait;
use gangway_domain::{ContextChunk, DocumentIndex, IndexQuery, SourceMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for retrieve requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the knowledge-base retrieve API
pub struct KnowledgeBaseClient {
    endpoint: String,
    kb_id: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveRequest<'a> {
    retrieval_query: RetrievalQuery<'a>,
    retrieval_configuration: RetrievalConfiguration<'a>,
}

#[derive(Serialize)]
struct RetrievalQuery<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfiguration<'a> {
    vector_search_configuration: VectorSearchConfiguration<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorSearchConfiguration<'a> {
    number_of_results: usize,
    filter: MetadataFilter<'a>,
}

#[derive(Serialize)]
struct MetadataFilter<'a> {
    equals: EqualsFilter<'a>,
}

#[derive(Serialize)]
struct EqualsFilter<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveResponse {
    #[serde(default)]
    retrieval_results: Vec<RetrievalResult>,
}

#[derive(Deserialize)]
struct RetrievalResult {
    content: ChunkContent,
    #[serde(default)]
    location: Option<ChunkLocation>,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    score: f64,
}

#[derive(Deserialize)]
struct ChunkContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChunkLocation {
    #[serde(default)]
    s3_location: Option<S3Location>,
}

#[derive(Deserialize)]
struct S3Location {
    uri: String,
}

impl KnowledgeBaseClient {
    /// Create a client for one knowledge base
    ///
    /// # Parameters
    ///
    /// - `endpoint`: service base URL (e.g. "https://kb.internal.example.com")
    /// - `kb_id`: identifier of the knowledge base to query
    pub fn new(endpoint: impl Into<String>, kb_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("default reqwest client");

        let client = Self {
            endpoint: endpoint.into(),
            kb_id: kb_id.into(),
            api_token: None,
            client,
        };
        info!(kb_id = %client.kb_id, "knowledge base client initialized");
        client
    }

    /// Attach a bearer token sent with every request
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// The knowledge base this client is bound to
    pub fn kb_id(&self) -> &str {
        &self.kb_id
    }

    fn convert(result: RetrievalResult) -> ContextChunk {
        let mut metadata = result.metadata;
        let page = metadata
            .remove("page")
            .and_then(|v| v.as_u64())
            .and_then(|p| u32::try_from(p).ok());
        let uri = result
            .location
            .and_then(|l| l.s3_location)
            .map(|l| l.uri);

        ContextChunk {
            text: result.content.text,
            source: SourceMetadata {
                uri,
                page,
                extra: metadata,
            },
            score: result.score,
        }
    }
}

#[async_trait]
impl DocumentIndex for KnowledgeBaseClient {
    type Error = IndexError;

    async fn retrieve(&self, query: &IndexQuery) -> Result<Vec<ContextChunk>, Self::Error> {
        let url = format!(
            "{}/knowledgebases/{}/retrieve",
            self.endpoint.trim_end_matches('/'),
            self.kb_id
        );

        let body = RetrieveRequest {
            retrieval_query: RetrievalQuery {
                text: &query.query_text,
            },
            retrieval_configuration: RetrievalConfiguration {
                vector_search_configuration: VectorSearchConfiguration {
                    number_of_results: query.top_k,
                    filter: MetadataFilter {
                        equals: EqualsFilter {
                            key: &query.metadata_key,
                            value: &query.metadata_value,
                        },
                    },
                },
            },
        };

        debug!(
            kb_id = %self.kb_id,
            filter_key = %query.metadata_key,
            top_k = query.top_k,
            "issuing retrieve request"
        );

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IndexError::Communication(format!("Request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IndexError::KnowledgeBaseNotFound(self.kb_id.clone()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IndexError::Communication(format!(
                "HTTP {status}: {error_text}"
            )));
        }

        let parsed: RetrieveResponse = response
            .json()
            .await
            .map_err(|e| IndexError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        Ok(parsed
            .retrieval_results
            .into_iter()
            .map(Self::convert)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = KnowledgeBaseClient::new("https://kb.example.com", "BBAPAIKMU8");
        assert_eq!(client.kb_id(), "BBAPAIKMU8");
        assert!(client.api_token.is_none());
    }

    #[test]
    fn test_with_api_token() {
        let client =
            KnowledgeBaseClient::new("https://kb.example.com", "kb1").with_api_token("secret");
        assert_eq!(client.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_request_body_carries_equality_filter() {
        let body = RetrieveRequest {
            retrieval_query: RetrievalQuery { text: "query" },
            retrieval_configuration: RetrievalConfiguration {
                vector_search_configuration: VectorSearchConfiguration {
                    number_of_results: 15,
                    filter: MetadataFilter {
                        equals: EqualsFilter {
                            key: "loanBookingId",
                            value: "doc_abc",
                        },
                    },
                },
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["retrievalQuery"]["text"], "query");
        let vector = &json["retrievalConfiguration"]["vectorSearchConfiguration"];
        assert_eq!(vector["numberOfResults"], 15);
        assert_eq!(vector["filter"]["equals"]["key"], "loanBookingId");
        assert_eq!(vector["filter"]["equals"]["value"], "doc_abc");
    }

    #[test]
    fn test_response_conversion() {
        let raw = json!({
            "retrievalResults": [
                {
                    "content": {"text": "Maturity date is 2027-06-30."},
                    "location": {"s3Location": {"uri": "s3://loan-docs/abc.pdf"}},
                    "metadata": {"page": 3, "loanBookingId": "doc_abc"},
                    "score": 0.91
                },
                {
                    "content": {"text": "Second chunk."},
                    "score": 0.42
                }
            ]
        });

        let parsed: RetrieveResponse = serde_json::from_value(raw).unwrap();
        let chunks: Vec<ContextChunk> = parsed
            .retrieval_results
            .into_iter()
            .map(KnowledgeBaseClient::convert)
            .collect();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].source.uri.as_deref(), Some("s3://loan-docs/abc.pdf"));
        assert_eq!(chunks[0].source.page, Some(3));
        assert_eq!(
            chunks[0].source.extra.get("loanBookingId"),
            Some(&json!("doc_abc"))
        );
        assert!(chunks[1].source.uri.is_none());
        assert_eq!(chunks[1].score, 0.42);
    }
}
