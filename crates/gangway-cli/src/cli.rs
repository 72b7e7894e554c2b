//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Structured loan-document extraction.
#[derive(Debug, Parser)]
#[command(name = "gangway", version, about)]
pub struct Cli {
    /// Path to the configuration file (default: ~/.gangway/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract structured data for a document
    Extract(ExtractArgs),

    /// Extract structured data with per-field source citations
    ExtractCitations(ExtractArgs),

    /// List the registered schema names
    Schemas,
}

/// Arguments shared by both extraction commands.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Document identifier in knowledge-base metadata
    pub document_id: String,

    /// Target schema name (see `gangway schemas`)
    pub schema: String,

    /// Query text for the retrieval step (default is synthesized from the
    /// document identifier)
    #[arg(long)]
    pub query: Option<String>,

    /// Temperature override for this call
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Max-tokens override for this call
    #[arg(long)]
    pub max_tokens: Option<u32>,
}
