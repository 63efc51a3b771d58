//! `cqt report` command - compliance summary across samples

use chrono::Utc;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_score, open_project, result_label, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::identity::RecordPrefix;
use crate::core::loader::load_all;
use crate::entities::batch::ProductionBatch;
use crate::entities::sample::{Outcome, SampleMeasurement, TestStage};

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Export one CSV row per sample instead of the Markdown summary
    #[arg(long)]
    pub csv: bool,

    /// Only include samples from batches matching this lot number prefix
    #[arg(long, short = 'b')]
    pub batch: Option<String>,

    /// Only include one stage
    #[arg(long, short = 's')]
    pub stage: Option<TestStage>,

    /// Number of recent failures to list
    #[arg(long, default_value_t = 10)]
    pub failures: usize,
}

/// Pass/fail tally for one group of samples
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Tally {
    total: usize,
    passed: usize,
    failed: usize,
}

impl Tally {
    fn add(&mut self, result: Option<Outcome>) {
        self.total += 1;
        match result {
            Some(Outcome::Pass) => self.passed += 1,
            Some(Outcome::Fail) => self.failed += 1,
            None => {}
        }
    }

    fn pending(&self) -> usize {
        self.total - self.passed - self.failed
    }

    /// Share of evaluated samples that passed
    fn pass_rate(&self) -> String {
        let evaluated = self.passed + self.failed;
        if evaluated == 0 {
            "-".to_string()
        } else {
            format!("{:.1}%", self.passed as f64 * 100.0 / evaluated as f64)
        }
    }

    fn cells(&self, label: String) -> [String; 6] {
        [
            label,
            self.total.to_string(),
            self.passed.to_string(),
            self.failed.to_string(),
            self.pending().to_string(),
            self.pass_rate(),
        ]
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: String,
    batch: &'a str,
    stage: &'static str,
    result: String,
    score: Option<f64>,
    classification: Option<String>,
    evaluation_mode: Option<String>,
    created: String,
    details: Option<&'a str>,
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let samples: Vec<SampleMeasurement> = load_all(&project.record_dir(RecordPrefix::Samp))?
        .into_iter()
        .filter(|s: &SampleMeasurement| args.stage.map_or(true, |stage| s.test_stage == stage))
        .filter(|s| {
            args.batch
                .as_ref()
                .map_or(true, |b| s.batch.to_uppercase().starts_with(&b.to_uppercase()))
        })
        .collect();

    if args.csv {
        return write_csv(&samples, args.output, global.quiet);
    }

    let batches: Vec<ProductionBatch> = load_all(&project.record_dir(RecordPrefix::Lot))?;
    let content = markdown_report(&samples, &batches, args.failures);
    write_output(&content, args.output, global.quiet)
}

fn markdown_report(samples: &[SampleMeasurement], batches: &[ProductionBatch], failures: usize) -> String {
    let mut output = String::new();
    output.push_str("# Quality Compliance Report\n\n");
    output.push_str(&format!(
        "Generated {} from {} sample(s).\n\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC"),
        samples.len()
    ));

    // Summary by stage, in production order
    let mut overall = Tally::default();
    let mut by_stage: BTreeMap<usize, Tally> = BTreeMap::new();
    for sample in samples {
        overall.add(sample.result);
        let order = TestStage::all()
            .iter()
            .position(|s| *s == sample.test_stage)
            .unwrap_or(usize::MAX);
        by_stage.entry(order).or_default().add(sample.result);
    }

    output.push_str("## Summary by Stage\n\n");
    let mut summary = Builder::default();
    summary.push_record(["Stage", "Samples", "Pass", "Fail", "Not evaluated", "Pass rate"]);
    for (order, tally) in &by_stage {
        let label = TestStage::all()
            .get(*order)
            .map(|s| s.label().to_string())
            .unwrap_or_default();
        summary.push_record(tally.cells(label));
    }
    summary.push_record(overall.cells("**Total**".to_string()));
    output.push_str(&summary.build().with(Style::markdown()).to_string());
    output.push('\n');

    // Per batch
    let mut by_batch: BTreeMap<&str, Tally> = BTreeMap::new();
    for sample in samples {
        by_batch.entry(sample.batch.as_str()).or_default().add(sample.result);
    }
    if !by_batch.is_empty() {
        output.push_str("\n## Summary by Batch\n\n");
        let mut table = Builder::default();
        table.push_record(["Lot", "Product", "Status", "Samples", "Pass", "Fail", "Not evaluated"]);
        for (lot, tally) in &by_batch {
            let batch = batches.iter().find(|b| b.id.to_string() == *lot);
            table.push_record([
                lot.to_string(),
                batch
                    .map(|b| truncate_str(&b.product_type, 30))
                    .unwrap_or_else(|| "(unknown batch)".to_string()),
                batch.map(|b| b.status.to_string()).unwrap_or_else(|| "-".to_string()),
                tally.total.to_string(),
                tally.passed.to_string(),
                tally.failed.to_string(),
                tally.pending().to_string(),
            ]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    // Most recent failures first
    let mut failed: Vec<&SampleMeasurement> = samples
        .iter()
        .filter(|s| s.result == Some(Outcome::Fail))
        .collect();
    failed.sort_by(|a, b| b.created.cmp(&a.created));
    failed.truncate(failures);

    if !failed.is_empty() {
        output.push_str("\n## Recent Failures\n\n");
        let mut table = Builder::default();
        table.push_record(["Sample", "Batch", "Stage", "Score", "Failed checks"]);
        for sample in failed {
            table.push_record([
                sample.id.to_string(),
                sample.batch.clone(),
                sample.test_stage.label().to_string(),
                format_score(sample.compliance_score),
                failed_checks(sample),
            ]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    output
}

/// Non-compliant lines from the stored details
fn failed_checks(sample: &SampleMeasurement) -> String {
    let Some(details) = sample.compliance_details.as_deref() else {
        return "(manual verdict)".to_string();
    };
    let failed: Vec<&str> = details
        .split(crate::compliance::scorer::DETAIL_SEPARATOR)
        .filter(|line| line.contains(crate::compliance::NON_CONFORME))
        .collect();
    truncate_str(&failed.join("; "), 80)
}

fn write_csv(samples: &[SampleMeasurement], output_path: Option<PathBuf>, quiet: bool) -> Result<()> {
    let sink: Box<dyn Write> = match &output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path).into_diagnostic()?)),
        None => Box::new(io::stdout()),
    };
    let mut writer = csv::Writer::from_writer(sink);

    for sample in samples {
        writer
            .serialize(CsvRow {
                id: sample.id.to_string(),
                batch: &sample.batch,
                stage: sample.test_stage.as_str(),
                result: result_label(sample.result),
                score: sample.compliance_score,
                classification: sample.tile_classification.map(|c| c.to_string()),
                evaluation_mode: sample.evaluation_mode.map(|m| m.to_string()),
                created: sample.created.to_rfc3339(),
                details: sample.compliance_details.as_deref(),
            })
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;

    if let Some(path) = output_path {
        if !quiet {
            eprintln!("Report written to: {}", path.display());
        }
    }
    Ok(())
}

fn write_output(content: &str, output_path: Option<PathBuf>, quiet: bool) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            if !quiet {
                println!("Report written to: {}", path.display());
            }
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
