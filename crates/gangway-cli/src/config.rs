//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use gangway_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Knowledge-base connection
    #[serde(default)]
    pub index: IndexConfig,

    /// Model connection
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Pipeline settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Knowledge-base connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Retrieve API base URL
    #[serde(default)]
    pub endpoint: String,

    /// Knowledge base to query
    #[serde(default)]
    pub knowledge_base_id: String,

    /// Environment variable holding the bearer token, if the API needs one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token_env: Option<String>,
}

/// Model connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Alternate API endpoint (proxies, test servers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Operator default for generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "claude-3-5-sonnet-20240620".to_string()
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

impl Config {
    /// Default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".gangway").join("config.toml"))
    }

    /// Load configuration from an explicit path, or the default location.
    ///
    /// A missing file at the default location yields the default
    /// configuration; an explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "configuration file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => {
                let path = Self::default_path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Check that everything needed to build clients is present.
    pub fn validate(&self) -> Result<()> {
        if self.index.endpoint.is_empty() {
            return Err(CliError::Config("index.endpoint is not set".into()));
        }
        if self.index.knowledge_base_id.is_empty() {
            return Err(CliError::Config("index.knowledge_base_id is not set".into()));
        }
        if self.generator.model.is_empty() {
            return Err(CliError::Config("generator.model is not set".into()));
        }
        self.extractor.validate().map_err(CliError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.generator.model, "claude-3-5-sonnet-20240620");
        assert_eq!(config.generator.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.generator.max_tokens, 4000);
        assert_eq!(config.extractor.metadata_key, "loanBookingId");
    }

    #[test]
    fn test_default_config_fails_validation() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn test_load_minimal_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[index]
endpoint = "https://kb.internal.example.com"
knowledge_base_id = "BBAPAIKMU8"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.index.knowledge_base_id, "BBAPAIKMU8");
        // Sections not in the file fall back to defaults.
        assert_eq!(config.generator.max_tokens, 4000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/gangway.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_full_round_trip() {
        let mut config = Config::default();
        config.index.endpoint = "https://kb.example.com".into();
        config.index.knowledge_base_id = "kb1".into();
        config.index.api_token_env = Some("GANGWAY_INDEX_TOKEN".into());

        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.index.api_token_env.as_deref(), Some("GANGWAY_INDEX_TOKEN"));
        assert_eq!(parsed.extractor.num_retrieval_results, 15);
    }
}
