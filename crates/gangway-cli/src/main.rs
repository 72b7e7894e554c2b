//! gangway - structured loan-document extraction.
//!
//! The binary owns service-client lifecycle: configuration is loaded here,
//! tracing is initialized here, and both HTTP clients are constructed
//! explicitly before the pipeline runs. Library crates never touch process
//! globals.

mod cli;
mod config;
mod error;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use cli::{Cli, Command, ExtractArgs};
use config::Config;
use gangway_domain::SchemaRegistry;
use gangway_extractor::{ExtractionRequest, Extractor};
use gangway_index::KnowledgeBaseClient;
use gangway_llm::AnthropicGenerator;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Schemas => {
            for name in SchemaRegistry::builtin().names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Extract(args) => {
            let extractor = build_extractor(&config)?;
            match extractor.extract(request_from(&args)).await {
                Ok(result) => print_json(&result),
                Err(e) if e.is_not_found() => bail!("{e}"),
                Err(e) => Err(e).context("extraction failed"),
            }
        }
        Command::ExtractCitations(args) => {
            let extractor = build_extractor(&config)?;
            match extractor.extract_with_citations(request_from(&args)).await {
                Ok(result) => print_json(&result),
                Err(e) if e.is_not_found() => bail!("{e}"),
                Err(e) => Err(e).context("extraction failed"),
            }
        }
    }
}

fn request_from(args: &ExtractArgs) -> ExtractionRequest {
    let mut request = ExtractionRequest::new(&args.document_id, &args.schema);
    request.retrieval_query = args.query.clone();
    request.temperature = args.temperature;
    request.max_tokens = args.max_tokens;
    request
}

fn build_extractor(
    config: &Config,
) -> anyhow::Result<Extractor<KnowledgeBaseClient, AnthropicGenerator>> {
    config.validate()?;

    let mut index =
        KnowledgeBaseClient::new(&config.index.endpoint, &config.index.knowledge_base_id);
    if let Some(var) = &config.index.api_token_env {
        let token = std::env::var(var)
            .map_err(|_| anyhow!("index token environment variable '{var}' is not set"))?;
        index = index.with_api_token(token);
    }

    let api_key = std::env::var(&config.generator.api_key_env).map_err(|_| {
        anyhow!(
            "API key environment variable '{}' is not set",
            config.generator.api_key_env
        )
    })?;
    let mut generator = AnthropicGenerator::new(api_key, &config.generator.model)
        .with_default_max_tokens(config.generator.max_tokens);
    if let Some(endpoint) = &config.generator.endpoint {
        generator = generator.with_endpoint(endpoint);
    }

    Ok(Extractor::new(
        SchemaRegistry::builtin(),
        index,
        generator,
        config.extractor.clone(),
    ))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
