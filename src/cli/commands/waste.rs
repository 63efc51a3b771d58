//! `cqt waste` command - Waste and recycling log

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_project, print_structured, resolve_format, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{RecordId, RecordPrefix};
use crate::core::loader::{load_all, save_record};
use crate::core::Config;
use crate::entities::waste::{DisposalMethod, WasteRecord, WasteType};

#[derive(Subcommand, Debug)]
pub enum WasteCommands {
    /// List waste records, newest first
    List(ListArgs),

    /// Record a waste disposal
    New(NewArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by waste type (liquid, solid)
    #[arg(long = "type", short = 't')]
    pub waste_type: Option<WasteType>,

    /// Filter by disposal method
    #[arg(long)]
    pub disposal: Option<DisposalMethod>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Waste type (liquid, solid)
    #[arg(long = "type", short = 't')]
    pub waste_type: WasteType,

    /// Waste category, e.g. "glaze sludge"
    #[arg(long, short = 'c')]
    pub category: String,

    /// Quantity (kg)
    #[arg(long)]
    pub kg: f64,

    /// Disposal method (recycled, reused, disposed)
    #[arg(long)]
    pub disposal: DisposalMethod,

    /// Share of the quantity recycled (%)
    #[arg(long, default_value_t = 0.0)]
    pub recycled: f64,

    /// Record date (YYYY-MM-DD, default: today)
    #[arg(long, short = 'd')]
    pub date: Option<NaiveDate>,

    /// Environmental impact assessment
    #[arg(long)]
    pub impact: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

pub fn run(cmd: WasteCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        WasteCommands::List(args) => run_list(args, global),
        WasteCommands::New(args) => run_new(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));
    let format = resolve_format(global, &config, OutputFormat::Tsv);

    let mut records: Vec<WasteRecord> = load_all(&project.record_dir(RecordPrefix::Wst))?
        .into_iter()
        .filter(|r: &WasteRecord| args.waste_type.map_or(true, |t| r.waste_type == t))
        .filter(|r| args.disposal.map_or(true, |d| r.disposal_method == d))
        .collect();
    records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));

    if args.count {
        println!("{}", records.len());
        return Ok(());
    }

    if records.is_empty() {
        if !global.quiet {
            println!("No waste records found.");
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&records, format)?,
        OutputFormat::Id => {
            for record in &records {
                println!("{}", record.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<16} {:<12} {:<8} {:<24} {:>10} {:<10} {:>9}",
                style("ID").bold(),
                style("DATE").bold(),
                style("TYPE").bold(),
                style("CATEGORY").bold(),
                style("KG").bold(),
                style("DISPOSAL").bold(),
                style("RECYCLED").bold()
            );
            println!("{}", "-".repeat(95));

            for record in &records {
                let disposal = match record.disposal_method {
                    DisposalMethod::Disposed => style(record.disposal_method.to_string()).yellow(),
                    _ => style(record.disposal_method.to_string()).green(),
                };
                println!(
                    "{:<16} {:<12} {:<8} {:<24} {:>10.1} {:<10} {:>8.0}%",
                    style(record.id.to_string()).cyan(),
                    record.date.format("%Y-%m-%d"),
                    record.waste_type,
                    truncate_str(&record.category, 22),
                    record.quantity_kg,
                    disposal,
                    record.recycling_percentage
                );
            }

            if !global.quiet {
                let total: f64 = records.iter().map(|r| r.quantity_kg).sum();
                let recycled: f64 = records.iter().map(WasteRecord::recycled_kg).sum();
                println!();
                println!(
                    "{} record(s) found. Total {:.1} kg, recycled {:.1} kg.",
                    style(records.len()).cyan(),
                    total,
                    recycled
                );
            }
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let existing = project.existing_ids(RecordPrefix::Wst);
    let id = RecordId::next(RecordPrefix::Wst, date, &existing);

    let mut record = WasteRecord::new(
        id,
        args.waste_type,
        args.category.trim(),
        args.kg,
        args.disposal,
        config.author(),
    );
    record.recycling_percentage = args.recycled;
    record.environmental_impact = args.impact;
    record.notes = args.notes;
    record.validate().map_err(|e| miette::miette!("{}", e))?;

    let path = save_record(&project, &record)?;

    match global.format {
        OutputFormat::Id => println!("{}", record.id),
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&record, global.format)?,
        _ => {
            println!(
                "{} Recorded waste {}",
                style("✓").green(),
                style(record.id.to_string()).cyan()
            );
            if !global.quiet {
                println!("   {}", style(path.display()).dim());
            }
        }
    }

    Ok(())
}
