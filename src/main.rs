//! Scorecast - Main Entry Point
//!
//! Runs the transformation and training stages from the command line.

use clap::Parser;
use scorecast::cli::{cmd_train, cmd_transform, Cli, Commands};
use scorecast::logging::init_file_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log = init_file_logging(&cli.log_dir)?;

    match cli.command {
        Commands::Transform { train, test, artifacts } => {
            cmd_transform(&train, &test, &artifacts)?;
        }
        Commands::Train { train, test, artifacts, min_score, parallel, json } => {
            cmd_train(&train, &test, &artifacts, min_score, parallel, json)?;
        }
    }

    Ok(())
}
