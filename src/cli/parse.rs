//! CLI parse: clap types for playgen. No behavior; definitions only.

use crate::provider::ProviderKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// playgen - append interactive playgrounds to lesson documents
#[derive(Parser, Debug)]
#[command(name = "playgen", version)]
#[command(about = "Generate interactive code playgrounds for lesson documents")]
pub struct Cli {
    /// Content section to process (javascript, typescript, css, html, php, react)
    #[arg(long)]
    pub section: String,

    /// Corpus root containing the pages directory
    #[arg(long)]
    pub target: PathBuf,

    /// Maximum documents to process (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    /// Model id (defaults per provider)
    #[arg(long)]
    pub model: Option<String>,

    /// Model provider
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Configuration file path (replaces global and corpus config files)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// List documents that need a playground without calling the model
    #[arg(long)]
    pub dry_run: bool,

    /// Output format (text or json)
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging and progress lines
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
