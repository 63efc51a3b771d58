//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tracing::warn;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::compliance::{evaluate, EngineDefaults, Evaluation, ReferenceData};
use crate::core::identity::RecordPrefix;
use crate::core::loader::load_record;
use crate::core::{Config, Project};
use crate::entities::batch::ProductionBatch;
use crate::entities::sample::{Outcome, SampleMeasurement};
use crate::entities::standard::StandardCatalog;

/// Open the project named by `--project`, or discover it from the current
/// directory
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Resolve `--format auto` using the configured default, then the command's
/// own default
pub fn resolve_format(global: &GlobalOpts, config: &Config, fallback: OutputFormat) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    match config.default_format.as_deref() {
        Some(name) => match OutputFormat::from_str(name, true) {
            Ok(OutputFormat::Auto) => fallback,
            Ok(format) => format,
            Err(_) => {
                warn!(format = name, "ignoring unknown default_format");
                fallback
            }
        },
        None => fallback,
    }
}

/// Print records as YAML or JSON
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a compliance score for tables, "-" when not evaluated
pub fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{:.1}%", s))
        .unwrap_or_else(|| "-".to_string())
}

/// Result text for tables, "pending" when not evaluated
pub fn result_label(result: Option<Outcome>) -> String {
    result
        .map(|r| r.to_string())
        .unwrap_or_else(|| "pending".to_string())
}

/// Colored result for terminal output
pub fn styled_result(result: Option<Outcome>) -> String {
    match result {
        Some(Outcome::Pass) => style("pass").green().to_string(),
        Some(Outcome::Fail) => style("fail").red().to_string(),
        None => style("pending").yellow().to_string(),
    }
}

/// Evaluate a sample against its batch, the project catalog and the
/// configured nominal defaults
pub fn evaluate_sample(
    project: &Project,
    catalog: &StandardCatalog,
    defaults: &EngineDefaults,
    sample: &SampleMeasurement,
) -> Result<Evaluation> {
    let batch: Option<ProductionBatch> =
        load_record(&project.record_dir(RecordPrefix::Lot), &sample.batch)?.map(|(_, b)| b);
    if batch.is_none() {
        warn!(sample = %sample.id, batch = %sample.batch, "batch not found, using default nominal dimensions");
    }
    let nominal = batch.as_ref().map(|b| b.nominal_dimensions());

    let reference = ReferenceData::new(catalog, defaults).with_batch(nominal.as_ref());
    Ok(evaluate(sample, &reference))
}

/// Print the checks of an evaluation, one per line
pub fn print_evaluation(evaluation: &Evaluation) {
    if !evaluation.is_applicable() {
        println!(
            "  {} No relevant readings for {}; result left pending",
            style("!").yellow(),
            evaluation.stage.label()
        );
        return;
    }

    for check in evaluation.scorecard.checks() {
        let mark = if check.compliant {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {} {}", mark, check.line());
    }
    println!(
        "  Score: {} ({}/{} checks), result: {}",
        style(format_score(evaluation.score())).cyan(),
        evaluation.passed_checks(),
        evaluation.total_checks(),
        styled_result(evaluation.outcome())
    );
    if let Some(classification) = evaluation.classification {
        println!(
            "  Classification: {} (group {})",
            style(classification.code).cyan(),
            classification.group
        );
    }
    if let Some(label) = evaluation.absorption_label {
        println!("  Absorption: {}", label);
    }
}
