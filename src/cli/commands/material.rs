//! `cqt material` command - Raw material receipts

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_project, print_structured, resolve_format, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::{RecordId, RecordPrefix};
use crate::core::loader::{load_all, save_record};
use crate::core::Config;
use crate::entities::material::RawMaterial;

#[derive(Subcommand, Debug)]
pub enum MaterialCommands {
    /// List raw material receipts, most recently recorded first
    List(ListArgs),

    /// Record a raw material receipt
    New(NewArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and supplier
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Material name, e.g. "Red clay"
    #[arg(long, short = 'n')]
    pub name: String,

    /// Supplier name
    #[arg(long, short = 's')]
    pub supplier: String,

    /// Material category, e.g. clay, frit, glaze
    #[arg(long, short = 'c')]
    pub category: String,

    /// Quantity received (kg)
    #[arg(long)]
    pub kg: f64,

    /// Cost per kg
    #[arg(long)]
    pub unit_cost: Option<f64>,

    /// Quality grade
    #[arg(long)]
    pub grade: Option<String>,

    /// Receipt date (YYYY-MM-DD, default: today)
    #[arg(long, short = 'd')]
    pub received: Option<NaiveDate>,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub expires: Option<NaiveDate>,

    /// Supplier lot number
    #[arg(long)]
    pub lot: Option<String>,

    /// Technical specifications
    #[arg(long)]
    pub specifications: Option<String>,

    /// Supplier quality certificate received
    #[arg(long)]
    pub certified: bool,
}

pub fn run(cmd: MaterialCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MaterialCommands::List(args) => run_list(args, global),
        MaterialCommands::New(args) => run_new(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));
    let format = resolve_format(global, &config, OutputFormat::Tsv);

    let mut materials: Vec<RawMaterial> = load_all(&project.record_dir(RecordPrefix::Mat))?
        .into_iter()
        .filter(|m: &RawMaterial| args.search.as_ref().map_or(true, |s| m.matches(s)))
        .filter(|m| {
            args.category
                .as_ref()
                .map_or(true, |c| m.category.eq_ignore_ascii_case(c.trim()))
        })
        .collect();
    materials.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));

    if args.count {
        println!("{}", materials.len());
        return Ok(());
    }

    if materials.is_empty() {
        if !global.quiet {
            println!("No materials found.");
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&materials, format)?,
        OutputFormat::Id => {
            for material in &materials {
                println!("{}", material.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            let today = Local::now().date_naive();
            println!(
                "{:<16} {:<22} {:<20} {:<10} {:>10} {:<12} {:<12}",
                style("ID").bold(),
                style("NAME").bold(),
                style("SUPPLIER").bold(),
                style("CATEGORY").bold(),
                style("KG").bold(),
                style("RECEIVED").bold(),
                style("STATUS").bold()
            );
            println!("{}", "-".repeat(108));

            for material in &materials {
                let status = if material.is_expired(today) {
                    style("expired".to_string()).red()
                } else if material.quality_certified {
                    style(material.status()).green()
                } else {
                    style(material.status()).dim()
                };
                println!(
                    "{:<16} {:<22} {:<20} {:<10} {:>10.1} {:<12} {:<12}",
                    style(material.id.to_string()).cyan(),
                    truncate_str(&material.name, 20),
                    truncate_str(&material.supplier, 18),
                    truncate_str(&material.category, 10),
                    material.quantity_kg,
                    material.date_received.format("%Y-%m-%d"),
                    status
                );
            }

            if !global.quiet {
                println!();
                println!("{} material(s) found.", style(materials.len()).cyan());
            }
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));

    let received = args.received.unwrap_or_else(|| Local::now().date_naive());
    let existing = project.existing_ids(RecordPrefix::Mat);
    let id = RecordId::next(RecordPrefix::Mat, received, &existing);

    let mut material = RawMaterial::new(
        id,
        args.name.trim(),
        args.supplier.trim(),
        args.category.trim(),
        args.kg,
        config.author(),
    );
    material.unit_cost = args.unit_cost;
    material.quality_grade = args.grade;
    material.expiry_date = args.expires;
    material.lot_number = args.lot;
    material.specifications = args.specifications;
    material.quality_certified = args.certified;
    material.validate().map_err(|e| miette::miette!("{}", e))?;

    let path = save_record(&project, &material)?;

    match global.format {
        OutputFormat::Id => println!("{}", material.id),
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&material, global.format)?,
        _ => {
            println!(
                "{} Recorded material {}",
                style("✓").green(),
                style(material.id.to_string()).cyan()
            );
            if !global.quiet {
                println!("   {}", style(path.display()).dim());
                if let Some(total) = material.total_cost() {
                    println!("   Total cost: {:.2}", total);
                }
            }
        }
    }

    Ok(())
}
