use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cqt::cli::commands;
use cqt::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    // CQT_LOG wins over --verbose
    let filter = EnvFilter::try_from_env("CQT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if global.verbose { "cqt=debug" } else { "warn" })
    });
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).into_diagnostic()?;

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Batch(cmd) => commands::batch::run(cmd, &global),
        Commands::Sample(cmd) => commands::sample::run(cmd, &global),
        Commands::Classify(args) => commands::classify::run(args, &global),
        Commands::Flexural(args) => commands::flexural::run(args, &global),
        Commands::Tolerances(args) => commands::tolerances::run(args, &global),
        Commands::Standards(cmd) => commands::standards::run(cmd, &global),
        Commands::Energy(cmd) => commands::energy::run(cmd, &global),
        Commands::Waste(cmd) => commands::waste::run(cmd, &global),
        Commands::Material(cmd) => commands::material::run(cmd, &global),
        Commands::Report(args) => commands::report::run(args, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
