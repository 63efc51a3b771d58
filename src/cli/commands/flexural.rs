//! `cqt flexural` command - modulus of rupture from a breaking test

use miette::Result;
use serde::Serialize;

use crate::cli::helpers::print_structured;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::compliance::flexural::{flexural_strength, SPAN_RATIO};

#[derive(clap::Args, Debug)]
pub struct FlexuralArgs {
    /// Breaking force F (N)
    #[arg(long, short = 'F')]
    pub force: f64,

    /// Tile length (mm); the support span is 0.9 × length
    #[arg(long, short = 'l')]
    pub length: f64,

    /// Tile width b (mm)
    #[arg(long, short = 'w')]
    pub width: f64,

    /// Tile thickness h (mm)
    #[arg(long, short = 't')]
    pub thickness: f64,
}

#[derive(Debug, Serialize)]
struct FlexuralOutput {
    force: f64,
    span: f64,
    width: f64,
    thickness: f64,
    flexural_strength: f64,
}

pub fn run(args: FlexuralArgs, global: &GlobalOpts) -> Result<()> {
    let strength = flexural_strength(
        Some(args.force),
        Some(args.length),
        Some(args.width),
        Some(args.thickness),
    )
    .ok_or_else(|| miette::miette!("Force, length, width and thickness must all be positive"))?;

    let output = FlexuralOutput {
        force: args.force,
        span: SPAN_RATIO * args.length,
        width: args.width,
        thickness: args.thickness,
        flexural_strength: strength,
    };

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&output, global.format)?,
        OutputFormat::Id | OutputFormat::Tsv => println!("{:.2}", strength),
        OutputFormat::Auto => println!(
            "Flexural strength: {:.2} N/mm² (F = {} N, span = {:.1} mm, b = {} mm, h = {} mm)",
            strength, output.force, output.span, output.width, output.thickness
        ),
    }

    Ok(())
}
