//! certpost -- X.509 certificate inventory scanner.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::debug;

use certpost_cli::cli::{Cli, Commands};
use certpost_cli::commands;
use certpost_cli::error::CliError;
use certpost_cli::logging::init_tracing;
use certpost_cli::output::OutputWriter;
use certpost_core::config::CertpostConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = CertpostConfig::load_or_default(&cli.config).await;

    let mut general = loaded
        .as_ref()
        .map(|c| c.general.clone())
        .unwrap_or_default();
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    if let Err(e) = init_tracing(&general) {
        eprintln!("{} {e}", "error:".red().bold());
        return ExitCode::from(2);
    }

    let writer = OutputWriter::new(cli.output);
    let result = run(cli.command, &cli.config, loaded, &writer).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.already_reported() {
                debug!(error = %e, "command failed");
            } else {
                eprintln!("{} {e}", "error:".red().bold());
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(
    command: Commands,
    config_path: &std::path::Path,
    loaded: Result<CertpostConfig, certpost_core::error::CertpostError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match command {
        Commands::Config(args) => commands::config::execute(args, config_path, writer).await,
        Commands::Scan(args) => {
            let config = loaded.map_err(|e| CliError::Config(e.to_string()))?;
            commands::scan::execute(args, &config, writer).await
        }
        Commands::Inspect(args) => {
            let config = loaded.map_err(|e| CliError::Config(e.to_string()))?;
            commands::inspect::execute(args, &config, writer).await
        }
    }
}
