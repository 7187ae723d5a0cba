mod cli;
mod offline;

use clap::Parser;
use color_eyre::eyre::{bail, Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, Overrides};
use docent_core::config::{Config, PROJECT_CONFIG_FILE};
use docent_core::engine::{Decision, Engine};
use docent_core::llm::Provider;
use docent_core::producer::{LlmProducer, PromptTemplate};
use offline::Offline;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match cli.command.unwrap_or(Commands::Generate { roots: Vec::new() }) {
        Commands::Generate { roots } => {
            let config = load_config(&cli.overrides, roots)?;
            generate(&config).await
        }
        Commands::Status { roots, all } => {
            let config = load_config(&cli.overrides, roots)?;
            status(&config, all)
        }
        Commands::SeedCache { roots } => {
            let config = load_config(&cli.overrides, roots)?;
            let engine = Engine::from_config(&config, Offline)?;
            let report = engine.seed_cache()?;
            println!(
                "Seeded {} files ({} without documents) into {}",
                report.seeded,
                report.undocumented,
                config.cache.file.display()
            );
            Ok(())
        }
        Commands::Index => {
            let config = load_config(&cli.overrides, Vec::new())?;
            let engine = Engine::from_config(&config, Offline)?;
            let count = engine.rebuild_index()?;
            println!(
                "Indexed {} documents in {}",
                count,
                config.output.index_path().display()
            );
            Ok(())
        }
        Commands::Init { force } => init(Path::new(PROJECT_CONFIG_FILE), force),
    }
}

/// Loads configuration and applies command-line overrides on top.
fn load_config(overrides: &Overrides, roots: Vec<PathBuf>) -> Result<Config> {
    let mut config = match &overrides.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    if !roots.is_empty() {
        config.source.roots = roots;
    }
    if let Some(output) = &overrides.output {
        config.output.dir = output.clone();
    }
    if overrides.no_cache {
        config.cache.enabled = false;
    }
    if let Some(provider) = &overrides.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &overrides.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(delay_ms) = overrides.delay_ms {
        config.generation.delay_ms = delay_ms;
    }

    config.validate()?;
    Ok(config)
}

async fn generate(config: &Config) -> Result<()> {
    let provider = Provider::from_config(&config.llm)?;
    tracing::info!(
        "Using {} with model {}",
        provider.backend_id(),
        provider.model()
    );

    let llm = provider.build_with_max_tokens(config.llm.max_tokens)?;
    let producer = LlmProducer::new(llm).with_template(PromptTemplate::from_path(
        config.generation.prompt_template.as_deref(),
    ));

    let engine = Engine::from_config(config, producer)?;
    let summary = engine.generate().await?;

    println!();
    println!("Written:         {}", summary.written);
    println!("Failed:          {}", summary.errors);
    println!("Skipped:         {}", summary.skipped);
    println!("Orphans removed: {}", summary.orphans_removed);
    println!("Indexed:         {}", summary.indexed);
    for root in &summary.missing_roots {
        println!("Missing root:    {}", root.display());
    }

    Ok(())
}

fn status(config: &Config, all: bool) -> Result<()> {
    let engine = Engine::from_config(config, Offline)?;
    let report = engine.plan();

    if report.config_changed {
        println!("Configuration changed since the last run.");
    }
    for (file, decision) in &report.files {
        if all || !decision.is_skip() {
            let marker = match decision {
                Decision::Skip(_) => " ",
                Decision::Process(_) => "+",
            };
            println!("{} {} ({})", marker, file, decision);
        }
    }
    for orphan in &report.orphans {
        println!("- {} (source removed)", orphan.display());
    }
    for root in &report.missing_roots {
        println!("! {} (root not found)", root.display());
    }

    println!();
    println!(
        "{} to generate, {} up to date, {} orphans",
        report.pending(),
        report.skipped(),
        report.orphans.len()
    );
    Ok(())
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, Config::default_config_string())
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
