//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};

/// Configuration for the [`crate::Extractor`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Metadata key that scopes index queries to one document
    pub metadata_key: String,

    /// Number of chunks requested from the index per extraction
    pub num_retrieval_results: usize,

    /// Whether parsed output is validated against the schema
    ///
    /// Disabling this is a degraded mode: output is still required to be a
    /// JSON object, but schema conformance is not checked. The pipeline logs
    /// whenever validation is skipped.
    pub validate_output: bool,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.metadata_key.is_empty() {
            return Err("metadata_key must not be empty".to_string());
        }
        if self.num_retrieval_results == 0 {
            return Err("num_retrieval_results must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            metadata_key: "loanBookingId".to_string(),
            num_retrieval_results: 15,
            validate_output: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.metadata_key, "loanBookingId");
        assert_eq!(config.num_retrieval_results, 15);
        assert!(config.validate_output);
    }

    #[test]
    fn test_empty_metadata_key_rejected() {
        let mut config = ExtractorConfig::default();
        config.metadata_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_results_rejected() {
        let mut config = ExtractorConfig::default();
        config.num_retrieval_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.metadata_key, parsed.metadata_key);
        assert_eq!(config.num_retrieval_results, parsed.num_retrieval_results);
        assert_eq!(config.validate_output, parsed.validate_output);
    }
}
