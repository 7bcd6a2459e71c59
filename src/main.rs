use anyhow::Result;
use clap::Parser;
use subwrap::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    // Initialize logging with verbosity-aware level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity.to_log_level().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::List(args) => {
            subwrap::cli::commands::list(&cli.lib, args, verbosity)?;
        }
        Commands::Call(args) => {
            subwrap::cli::commands::call(&cli.lib, args, verbosity)?;
        }
    }

    Ok(())
}
