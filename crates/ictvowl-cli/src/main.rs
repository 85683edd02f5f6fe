//! ictvowl CLI
//!
//! Command-line interface for:
//! - Building one OWL ontology per ICTV taxonomy release plus the merged
//!   cross-release ontology (`run`)
//! - Regenerating the ontology browser's `ols_config.json` from an existing
//!   output directory (`registry`)

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use ictvowl_taxonomy::ReleaseId;

mod config;
mod pipeline;
mod registry;

use config::PipelineConfig;

#[derive(Parser)]
#[command(name = "ictvowl")]
#[command(
    author,
    version,
    about = "ICTV taxonomy tables to versioned OWL ontologies"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every release ontology, the merged ontology and `ols_config.json`.
    Run(RunArgs),

    /// Regenerate `ols_config.json` from the ontology files already in the
    /// output directory.
    Registry(RegistryArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Pipeline configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory holding the node/delta/isolate exports
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Output directory
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Only build these releases (repeatable, e.g. `--release MSL39`)
    #[arg(long = "release")]
    releases: Vec<ReleaseId>,
}

#[derive(Args)]
struct RegistryArgs {
    /// Pipeline configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output directory to scan
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ictvowl={level},ictvowl_taxonomy={level},ictvowl_rdf={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Registry(args) => cmd_registry(args),
    }
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let mut config = PipelineConfig::load(args.config.as_deref())?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(out) = args.out {
        config.out_dir = out;
    }
    if !args.releases.is_empty() {
        config.releases = args.releases;
    }

    let report = pipeline::run(&config)?;

    for (release, path) in &report.releases {
        eprintln!(
            "{} {} {}",
            "wrote".green().bold(),
            release.to_string().bold(),
            path.display()
        );
    }
    eprintln!(
        "{} {}",
        "wrote".green().bold(),
        report.merged.display().to_string().bold()
    );
    eprintln!(
        "{} {}",
        "wrote".green().bold(),
        report.registry.display().to_string().bold()
    );
    Ok(())
}

fn cmd_registry(args: RegistryArgs) -> Result<()> {
    let mut config = PipelineConfig::load(args.config.as_deref())?;
    if let Some(out) = args.out {
        config.out_dir = out;
    }
    let path = registry::write_registry(&config, &config.out_dir)?;
    eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    Ok(())
}
