//! `cqt energy` command - Kiln and plant energy consumption log

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_project, print_structured, resolve_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{RecordId, RecordPrefix};
use crate::core::loader::{load_all, save_record};
use crate::core::Config;
use crate::entities::energy::{EnergyConsumption, EnergySource};

#[derive(Subcommand, Debug)]
pub enum EnergyCommands {
    /// List energy readings, newest first
    List(ListArgs),

    /// Record an energy reading
    New(NewArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by energy source
    #[arg(long, short = 's')]
    pub source: Option<EnergySource>,

    /// Filter by kiln identifier
    #[arg(long)]
    pub kiln: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Energy source (electricity, gas, solar)
    #[arg(long, short = 's')]
    pub source: EnergySource,

    /// Energy consumed (kWh)
    #[arg(long)]
    pub kwh: f64,

    /// Reading date (YYYY-MM-DD, default: today)
    #[arg(long, short = 'd')]
    pub date: Option<NaiveDate>,

    /// Cost of the energy consumed
    #[arg(long)]
    pub cost: Option<f64>,

    /// Kiln identifier
    #[arg(long)]
    pub kiln: Option<String>,

    /// Efficiency rating (%)
    #[arg(long)]
    pub efficiency: Option<f64>,

    /// Energy recovered from kiln exhaust (kWh)
    #[arg(long, default_value_t = 0.0)]
    pub heat_recovery: f64,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

pub fn run(cmd: EnergyCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EnergyCommands::List(args) => run_list(args, global),
        EnergyCommands::New(args) => run_new(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));
    let format = resolve_format(global, &config, OutputFormat::Tsv);

    let mut readings: Vec<EnergyConsumption> = load_all(&project.record_dir(RecordPrefix::Nrg))?
        .into_iter()
        .filter(|r: &EnergyConsumption| args.source.map_or(true, |s| r.energy_source == s))
        .filter(|r| {
            args.kiln
                .as_ref()
                .map_or(true, |k| r.kiln_number.as_deref() == Some(k.as_str()))
        })
        .collect();
    readings.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));

    if args.count {
        println!("{}", readings.len());
        return Ok(());
    }

    if readings.is_empty() {
        if !global.quiet {
            println!("No energy readings found.");
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&readings, format)?,
        OutputFormat::Id => {
            for reading in &readings {
                println!("{}", reading.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<16} {:<12} {:<12} {:<10} {:>12} {:>12} {:>10}",
                style("ID").bold(),
                style("DATE").bold(),
                style("SOURCE").bold(),
                style("KILN").bold(),
                style("KWH").bold(),
                style("RECOVERED").bold(),
                style("COST").bold()
            );
            println!("{}", "-".repeat(90));

            for reading in &readings {
                println!(
                    "{:<16} {:<12} {:<12} {:<10} {:>12.1} {:>12.1} {:>10}",
                    style(reading.id.to_string()).cyan(),
                    reading.date.format("%Y-%m-%d"),
                    reading.energy_source,
                    reading.kiln_number.as_deref().unwrap_or("-"),
                    reading.consumption_kwh,
                    reading.heat_recovery_kwh,
                    reading
                        .cost
                        .map(|c| format!("{:.2}", c))
                        .unwrap_or_else(|| "-".to_string())
                );
            }

            if !global.quiet {
                let total: f64 = readings.iter().map(|r| r.consumption_kwh).sum();
                let net: f64 = readings.iter().map(EnergyConsumption::net_kwh).sum();
                println!();
                println!(
                    "{} reading(s) found. Total {:.1} kWh, net of recovery {:.1} kWh.",
                    style(readings.len()).cyan(),
                    total,
                    net
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
    let existing = project.existing_ids(RecordPrefix::Nrg);
    let id = RecordId::next(RecordPrefix::Nrg, date, &existing);

    let mut reading = EnergyConsumption::new(id, args.source, args.kwh, config.author());
    reading.cost = args.cost;
    reading.kiln_number = args.kiln;
    reading.efficiency_rating = args.efficiency;
    reading.heat_recovery_kwh = args.heat_recovery;
    reading.notes = args.notes;
    reading.validate().map_err(|e| miette::miette!("{}", e))?;

    let path = save_record(&project, &reading)?;

    match global.format {
        OutputFormat::Id => println!("{}", reading.id),
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&reading, global.format)?,
        _ => {
            println!(
                "{} Recorded energy reading {}",
                style("✓").green(),
                style(reading.id.to_string()).cyan()
            );
            if !global.quiet {
                println!("   {}", style(path.display()).dim());
            }
        }
    }

    Ok(())
}
