//! `cqt batch` command - Production batch (lot) management

use chrono::{Local, NaiveDate};
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::cli::helpers::{open_project, print_structured, resolve_format, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::compliance::TileClassification;
use crate::core::identity::{RecordId, RecordPrefix};
use crate::core::loader::{load_all, load_record, save_record};
use crate::core::Config;
use crate::entities::batch::{BatchStatus, ProductFormat, ProductionBatch};
use crate::entities::sample::SampleMeasurement;

/// CLI-friendly batch status enum
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliBatchStatus {
    Planned,
    InProgress,
    Completed,
    Approved,
    Rejected,
}

impl From<CliBatchStatus> for BatchStatus {
    fn from(cli: CliBatchStatus) -> Self {
        match cli {
            CliBatchStatus::Planned => BatchStatus::Planned,
            CliBatchStatus::InProgress => BatchStatus::InProgress,
            CliBatchStatus::Completed => BatchStatus::Completed,
            CliBatchStatus::Approved => BatchStatus::Approved,
            CliBatchStatus::Rejected => BatchStatus::Rejected,
        }
    }
}

/// Batch status filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BatchStatusFilter {
    Planned,
    InProgress,
    Completed,
    Approved,
    Rejected,
    /// Planned or in progress
    Active,
    All,
}

impl BatchStatusFilter {
    fn matches(&self, status: BatchStatus) -> bool {
        match self {
            BatchStatusFilter::Planned => status == BatchStatus::Planned,
            BatchStatusFilter::InProgress => status == BatchStatus::InProgress,
            BatchStatusFilter::Completed => status == BatchStatus::Completed,
            BatchStatusFilter::Approved => status == BatchStatus::Approved,
            BatchStatusFilter::Rejected => status == BatchStatus::Rejected,
            BatchStatusFilter::Active => {
                matches!(status, BatchStatus::Planned | BatchStatus::InProgress)
            }
            BatchStatusFilter::All => true,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum BatchCommands {
    /// List batches with filtering
    List(ListArgs),

    /// Register a new production batch
    New(NewArgs),

    /// Show a batch's details
    Show(ShowArgs),

    /// Move a batch to a new status
    Status(StatusArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: BatchStatusFilter,

    /// Search in product type
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Product description, e.g. "Faïence 25x40 blanc"
    #[arg(long, short = 'p')]
    pub product_type: String,

    /// Production date (YYYY-MM-DD, default: today)
    #[arg(long, short = 'd')]
    pub date: Option<NaiveDate>,

    /// Planned quantity (tiles)
    #[arg(long)]
    pub planned: Option<u32>,

    /// Actual quantity produced (tiles)
    #[arg(long)]
    pub actual: Option<u32>,

    /// Kiln identifier
    #[arg(long)]
    pub kiln: Option<String>,

    /// Peak kiln temperature (°C)
    #[arg(long)]
    pub kiln_temperature: Option<f64>,

    /// Firing cycle duration (minutes)
    #[arg(long)]
    pub firing_duration: Option<f64>,

    /// Nominal tile length (mm)
    #[arg(long)]
    pub length: Option<f64>,

    /// Nominal tile width (mm)
    #[arg(long)]
    pub width: Option<f64>,

    /// Nominal tile thickness (mm)
    #[arg(long)]
    pub thickness: Option<f64>,

    /// Tile format, e.g. 25x40 (default: inferred from the product type)
    #[arg(long)]
    pub tile_format: Option<ProductFormat>,

    /// Declared product classification, e.g. BIII
    #[arg(long)]
    pub classification: Option<TileClassification>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Lot number (or a unique prefix of it)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Lot number (or a unique prefix of it)
    pub id: String,

    /// New status
    #[arg(value_enum)]
    pub status: CliBatchStatus,
}

/// Run a batch subcommand
pub fn run(cmd: BatchCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BatchCommands::List(args) => run_list(args, global),
        BatchCommands::New(args) => run_new(args, global),
        BatchCommands::Show(args) => run_show(args, global),
        BatchCommands::Status(args) => run_status(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));
    let format = resolve_format(global, &config, OutputFormat::Tsv);

    let batches: Vec<ProductionBatch> = load_all(&project.record_dir(RecordPrefix::Lot))?
        .into_iter()
        .filter(|b: &ProductionBatch| args.status.matches(b.status))
        .filter(|b| {
            args.search.as_ref().map_or(true, |s| {
                b.product_type.to_lowercase().contains(&s.to_lowercase())
            })
        })
        .collect();

    if args.count {
        println!("{}", batches.len());
        return Ok(());
    }

    if batches.is_empty() {
        if !global.quiet {
            println!("No batches found.");
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&batches, format)?,
        OutputFormat::Id => {
            for batch in &batches {
                println!("{}", batch.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<16} {:<30} {:<12} {:<8} {:<12}",
                style("LOT").bold(),
                style("PRODUCT").bold(),
                style("DATE").bold(),
                style("FORMAT").bold(),
                style("STATUS").bold()
            );
            println!("{}", "-".repeat(82));

            for batch in &batches {
                let format = batch
                    .nominal_dimensions()
                    .format
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let status = match batch.status {
                    BatchStatus::Approved => style(batch.status.to_string()).green(),
                    BatchStatus::Rejected => style(batch.status.to_string()).red(),
                    BatchStatus::InProgress => style(batch.status.to_string()).yellow(),
                    _ => style(batch.status.to_string()).dim(),
                };
                println!(
                    "{:<16} {:<30} {:<12} {:<8} {:<12}",
                    style(batch.id.to_string()).cyan(),
                    truncate_str(&batch.product_type, 28),
                    batch.production_date.format("%Y-%m-%d"),
                    format,
                    status
                );
            }

            if !global.quiet {
                println!();
                println!("{} batch(es) found.", style(batches.len()).cyan());
            }
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let existing = project.existing_ids(RecordPrefix::Lot);
    let id = RecordId::next(RecordPrefix::Lot, date, &existing);

    let mut batch = ProductionBatch::new(id, args.product_type.trim(), config.author());
    batch.planned_quantity = args.planned;
    batch.actual_quantity = args.actual;
    batch.kiln_number = args.kiln;
    batch.kiln_temperature = args.kiln_temperature;
    batch.firing_duration = args.firing_duration;
    batch.nominal.length = args.length;
    batch.nominal.width = args.width;
    batch.nominal.thickness = args.thickness;
    batch.nominal.format = args.tile_format;
    batch.nominal.classification = args.classification;
    batch.notes = args.notes;

    let path = save_record(&project, &batch)?;

    match global.format {
        OutputFormat::Id => println!("{}", batch.id),
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&batch, global.format)?,
        _ => {
            println!(
                "{} Created batch {}",
                style("✓").green(),
                style(batch.id.to_string()).cyan()
            );
            if !global.quiet {
                println!("   {}", style(path.display()).dim());
                match batch.nominal_dimensions().format {
                    Some(format) => println!("   Format: {}", format),
                    None => println!(
                        "   {} No tile format declared or found in the product type",
                        style("!").yellow()
                    ),
                }
            }
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));

    let (_, batch): (_, ProductionBatch) = load_record(&project.record_dir(RecordPrefix::Lot), &args.id)?
        .ok_or_else(|| miette::miette!("No batch found matching '{}'", args.id))?;

    match resolve_format(global, &config, OutputFormat::Yaml) {
        OutputFormat::Id => println!("{}", batch.id),
        OutputFormat::Json => print_structured(&batch, OutputFormat::Json)?,
        _ => {
            print_structured(&batch, OutputFormat::Yaml)?;
            if !global.quiet {
                let samples: Vec<SampleMeasurement> =
                    load_all(&project.record_dir(RecordPrefix::Samp))?;
                let samples: Vec<&SampleMeasurement> = samples
                    .iter()
                    .filter(|s| s.batch == batch.id.to_string())
                    .collect();
                println!();
                println!("{} sample(s) recorded for this batch", style(samples.len()).cyan());
            }
        }
    }

    Ok(())
}

fn run_status(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let (_, mut batch): (_, ProductionBatch) =
        load_record(&project.record_dir(RecordPrefix::Lot), &args.id)?
            .ok_or_else(|| miette::miette!("No batch found matching '{}'", args.id))?;

    let from = batch.status;
    batch
        .set_status(args.status.into())
        .map_err(|e| miette::miette!("{}", e))?;
    save_record(&project, &batch)?;

    if !global.quiet {
        println!(
            "{} Batch {} moved {} → {}",
            style("✓").green(),
            style(batch.id.to_string()).cyan(),
            from,
            style(batch.status.to_string()).yellow()
        );
    }

    Ok(())
}
