//! `cqt sample` command - Laboratory sample recording and evaluation

use chrono::{Local, NaiveDate};
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;
use tracing::debug;

use crate::cli::helpers::{
    evaluate_sample, format_score, open_project, print_evaluation, print_structured,
    resolve_format, result_label, styled_result,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{RecordId, RecordPrefix};
use crate::core::loader::{load_all, load_catalog, load_record, save_record};
use crate::core::Config;
use crate::entities::batch::ProductionBatch;
use crate::entities::sample::{Outcome, SampleMeasurement, TestStage};

/// Result filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResultFilter {
    Pass,
    Fail,
    /// Not evaluated yet, or no relevant readings
    Pending,
    All,
}

impl ResultFilter {
    fn matches(&self, result: Option<Outcome>) -> bool {
        match self {
            ResultFilter::Pass => result == Some(Outcome::Pass),
            ResultFilter::Fail => result == Some(Outcome::Fail),
            ResultFilter::Pending => result.is_none(),
            ResultFilter::All => true,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SampleCommands {
    /// List samples with filtering
    List(ListArgs),

    /// Record a new sample (evaluated unless --no-eval)
    New(NewArgs),

    /// Show a sample's details
    Show(ShowArgs),

    /// Re-evaluate samples and write the results back
    Eval(EvalArgs),

    /// Record a manual verdict for a sample automatic evaluation cannot decide
    Override(OverrideArgs),

    /// Change readings on an existing sample and re-evaluate it
    Set(SetArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by test stage
    #[arg(long, short = 's')]
    pub stage: Option<TestStage>,

    /// Filter by result
    #[arg(long, short = 'r', default_value = "all")]
    pub result: ResultFilter,

    /// Filter by batch (lot number prefix)
    #[arg(long, short = 'b')]
    pub batch: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Lot number of the batch the sample was taken from
    #[arg(long, short = 'b')]
    pub batch: String,

    /// Test stage, e.g. clay_testing, dimensional, water_absorption
    #[arg(long, short = 's')]
    pub stage: TestStage,

    /// Reading as field=value (repeatable), e.g. --set clay_humidity_silo=5.8
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_key_val)]
    pub readings: Vec<(String, String)>,

    /// Sampling date (YYYY-MM-DD, default: today)
    #[arg(long, short = 'd')]
    pub date: Option<NaiveDate>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Store the sample without evaluating it
    #[arg(long)]
    pub no_eval: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Sample ID (or a unique prefix of it)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EvalArgs {
    /// Sample IDs to evaluate
    #[arg(required_unless_present = "all")]
    pub ids: Vec<String>,

    /// Evaluate every sample in the project
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct OverrideArgs {
    /// Sample ID (or a unique prefix of it)
    pub id: String,

    /// Verdict to record
    #[arg(long, short = 'r')]
    pub result: Outcome,

    /// Compliance score to record (0-100)
    #[arg(long)]
    pub score: Option<f64>,

    /// Justification, appended to the sample notes
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Sample ID (or a unique prefix of it)
    pub id: String,

    /// Reading as field=value (repeatable); an empty value clears the field
    #[arg(value_name = "FIELD=VALUE", value_parser = parse_key_val, required = true)]
    pub readings: Vec<(String, String)>,
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Run a sample subcommand
pub fn run(cmd: SampleCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SampleCommands::List(args) => run_list(args, global),
        SampleCommands::New(args) => run_new(args, global),
        SampleCommands::Show(args) => run_show(args, global),
        SampleCommands::Eval(args) => run_eval(args, global),
        SampleCommands::Override(args) => run_override(args, global),
        SampleCommands::Set(args) => run_set(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));
    let format = resolve_format(global, &config, OutputFormat::Tsv);

    let samples: Vec<SampleMeasurement> = load_all(&project.record_dir(RecordPrefix::Samp))?
        .into_iter()
        .filter(|s: &SampleMeasurement| args.stage.map_or(true, |stage| s.test_stage == stage))
        .filter(|s| args.result.matches(s.result))
        .filter(|s| {
            args.batch
                .as_ref()
                .map_or(true, |b| s.batch.to_uppercase().starts_with(&b.to_uppercase()))
        })
        .collect();

    if args.count {
        println!("{}", samples.len());
        return Ok(());
    }

    if samples.is_empty() {
        if !global.quiet {
            println!("No samples found.");
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&samples, format)?,
        OutputFormat::Id => {
            for sample in &samples {
                println!("{}", sample.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<17} {:<16} {:<18} {:<9} {:<8} {:<6}",
                style("SAMPLE").bold(),
                style("BATCH").bold(),
                style("STAGE").bold(),
                style("RESULT").bold(),
                style("SCORE").bold(),
                style("CLASS").bold()
            );
            println!("{}", "-".repeat(80));

            for sample in &samples {
                let mut result = result_label(sample.result);
                if sample.is_manual() {
                    result.push('*');
                }
                let result = match sample.result {
                    Some(Outcome::Pass) => style(result).green(),
                    Some(Outcome::Fail) => style(result).red(),
                    None => style(result).yellow(),
                };
                println!(
                    "{:<17} {:<16} {:<18} {:<9} {:<8} {:<6}",
                    style(sample.id.to_string()).cyan(),
                    sample.batch,
                    sample.test_stage.as_str(),
                    result,
                    format_score(sample.compliance_score),
                    sample
                        .tile_classification
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
            }

            if !global.quiet {
                println!();
                println!(
                    "{} sample(s) found. {} marks a manual verdict.",
                    style(samples.len()).cyan(),
                    style("*").yellow()
                );
            }
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));

    // Resolve a partial lot number to the stored one
    let batch_ref = match load_record::<ProductionBatch>(&project.record_dir(RecordPrefix::Lot), &args.batch)? {
        Some((_, batch)) => batch.id.to_string(),
        None => {
            if !global.quiet {
                eprintln!(
                    "{} Batch {} not found; nominal dimensions fall back to the configured defaults",
                    style("!").yellow(),
                    style(&args.batch).cyan()
                );
            }
            args.batch.trim().to_uppercase()
        }
    };

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let existing = project.existing_ids(RecordPrefix::Samp);
    let id = RecordId::next(RecordPrefix::Samp, date, &existing);

    let mut sample = SampleMeasurement::new(id, batch_ref, args.stage, config.author());
    for (field, value) in &args.readings {
        sample
            .set_field(field, value)
            .map_err(|e| miette::miette!("{}", e))?;
    }
    sample.notes = args.notes;

    let evaluation = if args.no_eval {
        None
    } else {
        let catalog = load_catalog(&project)?;
        let evaluation = evaluate_sample(&project, &catalog, &config.engine_defaults(), &sample)?;
        sample.apply(&evaluation);
        Some(evaluation)
    };

    let path = save_record(&project, &sample)?;

    match global.format {
        OutputFormat::Id => println!("{}", sample.id),
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&sample, global.format)?,
        _ => {
            println!(
                "{} Created sample {} ({}, batch {})",
                style("✓").green(),
                style(sample.id.to_string()).cyan(),
                sample.test_stage.label(),
                sample.batch
            );
            if !global.quiet {
                println!("   {}", style(path.display()).dim());
                if let Some(evaluation) = &evaluation {
                    print_evaluation(evaluation);
                }
            }
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));

    let (_, sample): (_, SampleMeasurement) = load_record(&project.record_dir(RecordPrefix::Samp), &args.id)?
        .ok_or_else(|| miette::miette!("No sample found matching '{}'", args.id))?;

    match resolve_format(global, &config, OutputFormat::Yaml) {
        OutputFormat::Id => println!("{}", sample.id),
        OutputFormat::Json => print_structured(&sample, OutputFormat::Json)?,
        _ => print_structured(&sample, OutputFormat::Yaml)?,
    }

    Ok(())
}

fn run_eval(args: EvalArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));
    let catalog = load_catalog(&project)?;
    let defaults = config.engine_defaults();
    let dir = project.record_dir(RecordPrefix::Samp);

    let samples: Vec<SampleMeasurement> = if args.all {
        load_all(&dir)?
    } else {
        let mut found = Vec::new();
        for id in &args.ids {
            let (_, sample) = load_record(&dir, id)?
                .ok_or_else(|| miette::miette!("No sample found matching '{}'", id))?;
            found.push(sample);
        }
        found
    };

    let mut changed = 0;
    for mut sample in samples {
        let evaluation = evaluate_sample(&project, &catalog, &defaults, &sample)?;

        if sample.is_manual() && !evaluation.is_applicable() {
            debug!(sample = %sample.id, "keeping manual verdict");
            if !global.quiet {
                println!(
                    "{} {} keeps its manual verdict ({})",
                    style("-").dim(),
                    style(sample.id.to_string()).cyan(),
                    styled_result(sample.result)
                );
            }
            continue;
        }

        let before = sample.clone();
        sample.apply(&evaluation);
        if sample != before {
            save_record(&project, &sample)?;
            changed += 1;
        }

        if global.format == OutputFormat::Id {
            println!("{}", sample.id);
        } else if !global.quiet {
            println!(
                "{} {} {:<18} {} {}",
                style("✓").green(),
                style(sample.id.to_string()).cyan(),
                sample.test_stage.as_str(),
                styled_result(sample.result),
                format_score(sample.compliance_score)
            );
            if global.verbose {
                print_evaluation(&evaluation);
            }
        }
    }

    if !global.quiet && global.format != OutputFormat::Id {
        println!();
        println!("{} record(s) updated.", style(changed).cyan());
    }

    Ok(())
}

fn run_override(args: OverrideArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));

    let (_, mut sample): (_, SampleMeasurement) =
        load_record(&project.record_dir(RecordPrefix::Samp), &args.id)?
            .ok_or_else(|| miette::miette!("No sample found matching '{}'", args.id))?;

    // Samples stored with --no-eval have no result yet; evaluate before deciding
    let catalog = load_catalog(&project)?;
    let current = evaluate_sample(&project, &catalog, &config.engine_defaults(), &sample)?;
    sample
        .override_result(args.result, args.score, &current)
        .map_err(|e| miette::miette!("{}", e))?;

    if let Some(reason) = args.reason {
        let line = format!("Manual verdict: {}", reason.trim());
        sample.notes = Some(match sample.notes.take() {
            Some(notes) if !notes.is_empty() => format!("{}\n{}", notes, line),
            _ => line,
        });
    }

    save_record(&project, &sample)?;

    if !global.quiet {
        println!(
            "{} Recorded manual verdict {} for {}",
            style("✓").green(),
            styled_result(sample.result),
            style(sample.id.to_string()).cyan()
        );
    }

    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));

    let (_, mut sample): (_, SampleMeasurement) =
        load_record(&project.record_dir(RecordPrefix::Samp), &args.id)?
            .ok_or_else(|| miette::miette!("No sample found matching '{}'", args.id))?;

    for (field, value) in &args.readings {
        sample
            .set_field(field, value)
            .map_err(|e| miette::miette!("{}", e))?;
    }

    let catalog = load_catalog(&project)?;
    let evaluation = evaluate_sample(&project, &catalog, &config.engine_defaults(), &sample)?;
    if !(sample.is_manual() && !evaluation.is_applicable()) {
        sample.apply(&evaluation);
    }
    save_record(&project, &sample)?;

    if !global.quiet {
        println!(
            "{} Updated {}",
            style("✓").green(),
            style(sample.id.to_string()).cyan()
        );
        print_evaluation(&evaluation);
    }

    Ok(())
}
