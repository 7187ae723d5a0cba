use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docent")]
#[command(about = "Keep AI-generated explanations of every source file up to date", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute (defaults to generate)
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub overrides: Overrides,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Settings that replace values loaded from the config file.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Config file path (defaults to ./docent.toml, then ~/.config/docent/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output directory for generated documents
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Ignore the cache: process every file without a document and write no cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// LLM provider (openai, anthropic, ollama, openrouter)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model name passed to the provider
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Pause between LLM calls, in milliseconds
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate documents for new and changed files
    Generate {
        /// Source roots to walk (replaces the configured roots)
        roots: Vec<PathBuf>,
    },
    /// Show what generate would do without calling the LLM
    Status {
        /// Source roots to walk (replaces the configured roots)
        roots: Vec<PathBuf>,

        /// List every file, not only pending ones
        #[arg(short, long)]
        all: bool,
    },
    /// Record hashes for sources whose documents already exist
    SeedCache {
        /// Source roots to walk (replaces the configured roots)
        roots: Vec<PathBuf>,
    },
    /// Rebuild the index document only
    Index,
    /// Write a starter docent.toml in the current directory
    Init {
        /// Overwrite an existing docent.toml
        #[arg(short, long)]
        force: bool,
    },
}
