mod cli;
mod commands;
mod observability;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    observability::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            env_names,
            posargs,
            config,
            root,
            cache_dir,
            skip_missing,
        } => {
            let ok = commands::run::run(commands::run::RunArgs {
                config,
                env_names,
                posargs,
                root,
                cache_dir,
                skip_missing,
            })?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::List { config } => {
            commands::list::list(&config)?;
        }
        Commands::Validate { config } => {
            commands::validate::validate(&config)?;
        }
    }

    Ok(())
}
