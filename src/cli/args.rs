//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    batch::BatchCommands, classify::ClassifyArgs, completions::CompletionsArgs,
    energy::EnergyCommands, flexural::FlexuralArgs, init::InitArgs,
    material::MaterialCommands, report::ReportArgs, sample::SampleCommands,
    standards::StandardsCommands, tolerances::TolerancesArgs, waste::WasteCommands,
};

#[derive(Parser)]
#[command(name = "cqt")]
#[command(author, version, about = "Ceramic Quality Toolkit")]
#[command(long_about = "Record ceramic tile laboratory samples as plain-text YAML files and evaluate them against ISO 13006 / ISO 10545 tolerances.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .cqt/)
    #[arg(long, global = true, env = "CQT_PROJECT")]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new CQT project
    Init(InitArgs),

    /// Production batch (lot) management
    #[command(subcommand)]
    Batch(BatchCommands),

    /// Laboratory sample management and evaluation
    #[command(subcommand)]
    Sample(SampleCommands),

    /// Classify a tile from its water absorption (ISO 13006)
    Classify(ClassifyArgs),

    /// Compute flexural strength from a breaking test
    Flexural(FlexuralArgs),

    /// Show the effective tolerance table
    Tolerances(TolerancesArgs),

    /// Reference standards catalog
    #[command(subcommand)]
    Standards(StandardsCommands),

    /// Energy consumption log
    #[command(subcommand)]
    Energy(EnergyCommands),

    /// Waste and recycling log
    #[command(subcommand)]
    Waste(WasteCommands),

    /// Raw material receipts
    #[command(subcommand)]
    Material(MaterialCommands),

    /// Generate a compliance summary report
    Report(ReportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// Just IDs, one per line
    Id,
}
