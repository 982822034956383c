//! CLI argument parsing for the obsdiff binary.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

/// Default suite configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "suites.json";

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("suite marker must not be empty")]
    EmptyMarker,

    #[error("invalid input pattern: {0}")]
    InvalidInputPattern(String),
}

/// Validate conversion output against a trusted reference corpus.
#[derive(Parser, Debug, Clone)]
#[command(name = "obsdiff")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run verification for the selected suites.
    Verify(VerifyArgs),
    /// List the suites registered in the configuration.
    List(ListArgs),
}

/// Arguments for the verify command.
#[derive(Parser, Debug, Clone)]
pub struct VerifyArgs {
    /// Suite configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Marker of a suite to run. Repeatable; no marker means no suite runs.
    #[arg(short = 's', long = "suite")]
    pub suites: Vec<String>,

    /// Glob selecting which input files the converter is run over.
    #[arg(long, default_value = "*")]
    pub input_pattern: String,

    /// Root directory holding pre-fetched fixture trees and archives.
    #[arg(long)]
    pub fixture_root: Option<PathBuf>,

    /// Keep generated output directories after the run.
    #[arg(long)]
    pub keep_output: bool,

    /// Increase verbosity (-v verbose, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl VerifyArgs {
    /// Validate argument values beyond what clap enforces.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.suites.iter().any(|m| m.trim().is_empty()) {
            return Err(CliError::EmptyMarker);
        }
        glob::Pattern::new(&self.input_pattern)
            .map_err(|_| CliError::InvalidInputPattern(self.input_pattern.clone()))?;
        Ok(())
    }
}

/// Arguments for the list command.
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Suite configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}
