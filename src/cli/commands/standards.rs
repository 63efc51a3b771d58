//! `cqt standards` command - reference standards catalog

use clap::Subcommand;
use console::style;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{open_project, print_structured, resolve_format, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader::load_catalog;
use crate::core::Config;
use crate::entities::sample::TestStage;
use crate::entities::standard::IsoStandard;

#[derive(Subcommand, Debug)]
pub enum StandardsCommands {
    /// List catalog rows
    List(ListArgs),

    /// Show one standard by code
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by category, e.g. "Physical Properties"
    #[arg(long)]
    pub category: Option<String>,

    /// Only rows bound to a stage
    #[arg(long, short = 's')]
    pub stage: Option<TestStage>,

    /// Include inactive rows
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Standard code, e.g. "ISO 10545-3"
    pub code: String,
}

pub fn run(cmd: StandardsCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StandardsCommands::List(args) => run_list(args, global),
        StandardsCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));
    let catalog = load_catalog(&project)?;

    let rows: Vec<&IsoStandard> = if args.all {
        catalog
            .rows()
            .iter()
            .filter(|r| {
                args.category
                    .as_deref()
                    .map_or(true, |c| r.category.eq_ignore_ascii_case(c))
            })
            .filter(|r| args.stage.map_or(true, |s| r.stage == Some(s)))
            .collect()
    } else {
        catalog.active_rows(None, args.category.as_deref(), args.stage)
    };

    if rows.is_empty() {
        if !global.quiet {
            println!("No standards found.");
        }
        return Ok(());
    }

    match resolve_format(global, &config, OutputFormat::Tsv) {
        format @ (OutputFormat::Json | OutputFormat::Yaml) => print_structured(&rows, format)?,
        OutputFormat::Id => {
            for row in &rows {
                println!("{}", row.code);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            let mut table = Builder::default();
            table.push_record(["Code", "Title", "Category", "Applies to", "Threshold", "Active"]);
            for row in &rows {
                let applies_to = match (row.stage, row.parameter) {
                    (Some(stage), Some(parameter)) => format!("{} / {}", stage, parameter),
                    (Some(stage), None) => stage.to_string(),
                    _ => "-".to_string(),
                };
                table.push_record([
                    row.code.clone(),
                    truncate_str(&row.title, 40),
                    row.category.clone(),
                    applies_to,
                    row.threshold(),
                    if row.active { "yes" } else { "no" }.to_string(),
                ]);
            }
            println!("{}", table.build().with(Style::rounded()));
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));
    let catalog = load_catalog(&project)?;

    let row = catalog
        .rows()
        .iter()
        .find(|r| r.code.eq_ignore_ascii_case(args.code.trim()))
        .ok_or_else(|| miette::miette!("No standard with code '{}'", args.code))?;

    match resolve_format(global, &config, OutputFormat::Yaml) {
        OutputFormat::Id => println!("{}", row.code),
        OutputFormat::Json => print_structured(row, OutputFormat::Json)?,
        _ => {
            print_structured(row, OutputFormat::Yaml)?;
            if !row.active && !global.quiet {
                println!("{} This row is inactive and ignored during evaluation", style("!").yellow());
            }
        }
    }

    Ok(())
}
