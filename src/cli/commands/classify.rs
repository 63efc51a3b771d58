//! `cqt classify` command - ISO 13006 classification from water absorption

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::cli::helpers::print_structured;
use crate::compliance::{classify, AbsorptionGroup, AbsorptionLabel, FormingMethod, TileClassification};

#[derive(clap::Args, Debug)]
pub struct ClassifyArgs {
    /// Water absorption E (%)
    #[arg(long, short = 'e')]
    pub absorption: f64,

    /// Forming method (pressed or extruded)
    #[arg(long, short = 'm', default_value = "pressed")]
    pub method: FormingMethod,
}

#[derive(Debug, Serialize)]
struct ClassifyOutput {
    water_absorption: f64,
    forming_method: FormingMethod,
    group: AbsorptionGroup,
    classification: TileClassification,
    label: AbsorptionLabel,
}

pub fn run(args: ClassifyArgs, global: &GlobalOpts) -> Result<()> {
    if !args.absorption.is_finite() || args.absorption < 0.0 {
        return Err(miette::miette!(
            "Water absorption must be a non-negative percentage, got {}",
            args.absorption
        ));
    }

    let classification = classify(Some(args.absorption), args.method)
        .ok_or_else(|| miette::miette!("No classification for {}", args.absorption))?;
    let output = ClassifyOutput {
        water_absorption: args.absorption,
        forming_method: args.method,
        group: classification.group,
        classification: classification.code,
        label: AbsorptionLabel::for_absorption(args.absorption),
    };

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&output, global.format)?,
        OutputFormat::Id | OutputFormat::Tsv => println!("{}", output.classification),
        OutputFormat::Auto => {
            println!(
                "E = {:.2} % ({}): {} (group {})",
                output.water_absorption,
                output.forming_method,
                style(output.classification).cyan().bold(),
                output.group
            );
            let label = match output.label {
                AbsorptionLabel::NonCompliant => style(output.label.as_str()).red(),
                AbsorptionLabel::LimitAcceptable => style(output.label.as_str()).yellow(),
                AbsorptionLabel::Compliant => style(output.label.as_str()).green(),
                AbsorptionLabel::DeclarationRequired => style(output.label.as_str()).yellow(),
            };
            println!("Absorption verdict: {}", label);
        }
    }

    Ok(())
}
