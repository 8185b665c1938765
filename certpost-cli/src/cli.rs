//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// certpost -- X.509 certificate inventory scanner.
///
/// Use `certpost <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "certpost", version, about, long_about = None)]
pub struct Cli {
    /// Path to the certpost.toml configuration file (optional; defaults are used when missing).
    #[arg(short, long, default_value = "certpost.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a directory tree for certificates and write an xlsx report.
    Scan(ScanArgs),

    /// Extract and print the fields of a single certificate file.
    Inspect(InspectArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Scan a directory tree for DER certificates.
///
/// Missing PATH or --report FILE are requested interactively when stdin is a terminal.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Root directory to scan.
    pub path: Option<PathBuf>,

    /// Report destination (".xlsx" is appended when missing).
    #[arg(short = 'o', long = "report")]
    pub report: Option<PathBuf>,

    /// Maximum number of files to collect (overrides config).
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Number of parallel extraction workers (overrides config).
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Disable the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Never prompt; fail instead of asking for missing values.
    #[arg(long)]
    pub non_interactive: bool,
}

// ---- inspect ----

/// Print the extracted fields of one certificate.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Certificate file (DER).
    pub file: PathBuf,
}

// ---- config ----

/// Manage certpost configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, scan, report).
        #[arg(long)]
        section: Option<String>,
    },
}
