//! CLI command definitions for select-forge.
//!
//! `select` runs the pipeline on a candidate file, `demo` runs it on a seeded
//! synthetic pool, and `preset` prints a preset configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use crate::candidate::Candidate;
use crate::diversity::{ReferenceBuffer, ReferenceStats};
use crate::export::{
    load_candidates, load_reference_buffer, save_reference_buffer, ReportFormat, SelectionReport,
};
use crate::metrics::{export_metrics, init_metrics};
use crate::selection::{Preset, SelectionConfig, SelectionOutcome, Selector};

use super::demo::generate_demo_pool;

/// Default number of embeddings kept in the reference history file.
const DEFAULT_REFERENCE_CAPACITY: usize = 256;

/// Diversity-aware candidate selection.
#[derive(Parser)]
#[command(name = "select-forge")]
#[command(about = "Select a diverse, high-scoring subset from a pool of scored candidates")]
#[command(version)]
#[command(
    long_about = "select-forge normalizes per-candidate metrics, boosts exception candidates, applies hard constraints, scores candidates and picks a diverse subset with Maximal Marginal Relevance.\n\nExample usage:\n  select-forge select --input candidates.json --preset balanced --k 5 --output report.json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run a selection on a JSON or YAML candidate file.
    Select(SelectArgs),

    /// Run a selection on a seeded synthetic pool.
    Demo(DemoArgs),

    /// Print a preset configuration as YAML.
    Preset(PresetArgs),
}

/// Configuration flags shared by `select` and `demo`.
#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    /// YAML configuration file. Takes precedence over --preset.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Preset used when no configuration file is given.
    #[arg(short = 'p', long, value_enum, default_value_t = Preset::CreativeMax)]
    pub preset: Preset,

    /// Override the target selection size.
    #[arg(short = 'k', long)]
    pub k: Option<usize>,

    /// Override the MMR balance coefficient.
    #[arg(long)]
    pub alpha: Option<f64>,
}

/// Arguments for `select-forge select`.
#[derive(Parser, Debug)]
pub struct SelectArgs {
    /// Candidate file (.json, .yaml or .yml).
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Reference history file used for novelty.
    #[arg(short = 'r', long)]
    pub reference: Option<PathBuf>,

    /// Append the selected embeddings to the reference history.
    #[arg(long, requires = "reference")]
    pub update_reference: bool,

    /// Maximum number of embeddings kept in a new reference history.
    #[arg(long, default_value_t = DEFAULT_REFERENCE_CAPACITY)]
    pub reference_capacity: usize,

    /// Report file. Prints to stdout when omitted.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Report format.
    #[arg(short = 'f', long, value_enum, default_value_t = ReportFormat::Json)]
    pub format: ReportFormat,

    /// Print Prometheus metrics after the run.
    #[arg(long)]
    pub print_metrics: bool,
}

/// Arguments for `select-forge demo`.
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Number of synthetic candidates.
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Random seed.
    #[arg(short = 's', long, default_value = "42")]
    pub seed: u64,

    /// Embedding dimension.
    #[arg(short = 'd', long, default_value = "64")]
    pub dimension: usize,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the full report as JSON instead of one line per pick.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `select-forge preset`.
#[derive(Parser, Debug)]
pub struct PresetArgs {
    /// Preset to print.
    #[arg(short = 'n', long, value_enum, default_value_t = Preset::CreativeMax)]
    pub name: Preset,
}

/// Parse CLI arguments and return the Cli struct.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with already-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Select(args) => run_select_command(args),
        Commands::Demo(args) => run_demo_command(args),
        Commands::Preset(args) => run_preset_command(args),
    }
}

/// Resolves the configuration: file or preset plus `SELECT_*` variables,
/// then command-line overrides.
pub fn resolve_config(args: &ConfigArgs) -> anyhow::Result<SelectionConfig> {
    let mut config = match &args.config {
        Some(path) => SelectionConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SelectionConfig::from_env(args.preset)
            .context("Failed to build config from environment")?,
    };

    if let Some(k) = args.k {
        config = config.with_k(k);
    }
    if let Some(alpha) = args.alpha {
        config = config.with_diversity_alpha(alpha);
    }

    config.validate().context("Invalid selection config")?;
    Ok(config)
}

fn run_selection<'a>(
    candidates: &'a [Candidate],
    config: &SelectionConfig,
    reference: &ReferenceStats,
) -> anyhow::Result<SelectionOutcome<'a>> {
    let selector = Selector::new(config.clone())?;
    let outcome = selector.select(candidates, reference)?;

    for warning in &outcome.warnings {
        warn!(warning = %warning, "Selection warning");
    }

    Ok(outcome)
}

fn run_select_command(args: SelectArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.config)?;

    if args.print_metrics {
        init_metrics().context("Failed to initialize metrics")?;
    }

    let candidates = load_candidates(&args.input)
        .with_context(|| format!("Failed to load candidates from {}", args.input.display()))?;

    let mut history: Option<ReferenceBuffer> = match &args.reference {
        Some(path) => Some(
            load_reference_buffer(path, args.reference_capacity)
                .with_context(|| format!("Failed to load reference from {}", path.display()))?,
        ),
        None => None,
    };
    let reference = history
        .as_ref()
        .map(|buffer| buffer.stats(config.time_decay))
        .unwrap_or_default();

    info!(
        candidates = candidates.len(),
        k = config.k,
        alpha = config.diversity_alpha,
        reference_observations = reference.observations,
        "Running selection"
    );

    let outcome = run_selection(&candidates, &config, &reference)?;
    let report = SelectionReport::from_outcome(&outcome, &config);

    match &args.output {
        Some(path) => report
            .write_to(path, args.format)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => println!("{}", report.render(args.format)?),
    }

    if args.update_reference {
        if let (Some(buffer), Some(path)) = (history.as_mut(), args.reference.as_ref()) {
            let recorded = buffer.record(outcome.selected.iter().map(|s| s.scored.embedding()));
            save_reference_buffer(buffer, path)
                .with_context(|| format!("Failed to save reference to {}", path.display()))?;
            info!(
                recorded = recorded,
                entries = buffer.len(),
                path = %path.display(),
                "Updated reference history"
            );
        }
    }

    if args.print_metrics {
        print!("{}", export_metrics());
    }

    Ok(())
}

fn run_demo_command(args: DemoArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.config)?;
    let candidates = generate_demo_pool(args.count, args.dimension, args.seed);

    info!(
        count = args.count,
        dimension = args.dimension,
        seed = args.seed,
        "Generated demo pool"
    );

    let outcome = run_selection(&candidates, &config, &ReferenceStats::empty())?;

    if args.json {
        let report = SelectionReport::from_outcome(&outcome, &config);
        println!("{}", report.render(ReportFormat::Json)?);
        return Ok(());
    }

    println!("--- Selecting {} of {} candidates ---", config.k, candidates.len());
    for record in &outcome.audit {
        println!(
            "Selected: {} | Score: {:.4} | {}",
            record.id, record.composite, record.rationale
        );
    }
    if outcome.fallback_triggered {
        println!("(no candidate passed the hard constraints; used the unfiltered pool)");
    }

    Ok(())
}

fn run_preset_command(args: PresetArgs) -> anyhow::Result<()> {
    let config = SelectionConfig::preset(args.name);
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
