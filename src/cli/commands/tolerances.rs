//! `cqt tolerances` command - print the effective tolerance table

use miette::Result;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};
use tracing::debug;

use crate::cli::helpers::{open_project, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::compliance::tolerance::defect_checklist;
use crate::compliance::{BuiltinTolerances, Parameter, Scope, TileClassification, ToleranceSource};
use crate::core::loader::load_catalog;
use crate::entities::batch::ProductFormat;
use crate::entities::sample::{PeiClass, TestStage};

#[derive(clap::Args, Debug)]
pub struct TolerancesArgs {
    /// Only show one stage
    #[arg(long, short = 's')]
    pub stage: Option<TestStage>,

    /// Tile format selecting the pressing bands, e.g. 25x40
    #[arg(long)]
    pub tile_format: Option<ProductFormat>,

    /// Tile classification selecting the dimensional and abrasion rows
    #[arg(long, short = 'c')]
    pub classification: Option<TileClassification>,

    /// Tile thickness (mm) selecting the breaking strength thresholds
    #[arg(long, short = 't')]
    pub thickness: Option<f64>,

    /// Declared PEI class selecting the abrasion cycle minimum
    #[arg(long)]
    pub pei: Option<PeiClass>,
}

#[derive(Debug, Serialize)]
struct ToleranceRow {
    stage: TestStage,
    parameter: String,
    tolerance: String,
}

pub fn run(args: TolerancesArgs, global: &GlobalOpts) -> Result<()> {
    // Outside a project only the built-in table applies
    let catalog = match open_project(global) {
        Ok(project) => Some(load_catalog(&project)?),
        Err(e) => {
            debug!(error = %e, "no project, showing built-in tolerances");
            None
        }
    };
    let source: &dyn ToleranceSource = match &catalog {
        Some(catalog) => catalog,
        None => &BuiltinTolerances,
    };

    let scope = Scope::default()
        .with_format(args.tile_format.as_ref())
        .with_classification(args.classification)
        .with_thickness(args.thickness)
        .with_pei_class(args.pei);

    let stages: Vec<TestStage> = match args.stage {
        Some(stage) => vec![stage],
        None => TestStage::all().to_vec(),
    };

    let mut rows = Vec::new();
    for stage in stages {
        for parameter in Parameter::all() {
            if let Some(tolerance) = source.tolerance(stage, *parameter, scope) {
                rows.push(ToleranceRow {
                    stage,
                    parameter: parameter.label().to_string(),
                    tolerance: tolerance.describe(),
                });
            }
        }
        for rule in defect_checklist(stage) {
            rows.push(ToleranceRow {
                stage,
                parameter: format!("{} '{}'", Parameter::VisualDefects.label(), rule.keyword),
                tolerance: format!("absent, max {:.1} %", rule.max_pct),
            });
        }
    }

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&rows, global.format)?,
        OutputFormat::Tsv | OutputFormat::Id => {
            for row in &rows {
                println!("{}\t{}\t{}", row.stage, row.parameter, row.tolerance);
            }
        }
        OutputFormat::Auto => {
            let mut table = Builder::default();
            table.push_record(["Stage", "Parameter", "Tolerance"]);
            for row in &rows {
                table.push_record([
                    row.stage.label().to_string(),
                    row.parameter.clone(),
                    row.tolerance.clone(),
                ]);
            }
            println!("{}", table.build().with(Style::rounded()));

            if args.tile_format.is_none() || args.thickness.is_none() || args.pei.is_none() {
                println!("Rows that depend on --tile-format, --thickness or --pei are shown only when given.");
            }
        }
    }

    Ok(())
}
