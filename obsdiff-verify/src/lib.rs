//! obsdiff verification engine.
//!
//! Proves that a data-conversion executable produces output structurally and
//! numerically equivalent to a trusted reference corpus by:
//!
//! 1. Resolving the suites selected by marker and running their one-time,
//!    idempotent preparation (converter invocation over fixture inputs)
//! 2. Pairing generated output files with same-named reference files
//! 3. Walking both dataset trees and comparing every group, variable,
//!    attribute, and payload under type-aware tolerance rules
//!
//! The verdict of a run is the aggregate set of mismatch records; zero
//! records is a pass. Fatal setup errors abort before any comparison and are
//! never mixed up with genuine data mismatches.

pub mod cli;
pub mod compare;
pub mod differ;
pub mod dispatch;
pub mod exit;
pub mod logger;
pub mod prepare;
pub mod suite;
pub mod types;

pub use cli::{Cli, CliError, Command, ListArgs, VerifyArgs};
pub use compare::{
    compare_attribute_sets, compare_dimensions, compare_dtype, compare_payload, compare_variable,
    CompareError, VarContext, ABS_TOL, REL_TOL, TEXT_FILL,
};
pub use differ::{diff_structures, diff_variable_names};
pub use dispatch::{Dispatcher, RunError};
pub use logger::{BufferLogger, Logger, StderrLogger, Verbosity};
pub use prepare::{
    verify_archive_checksum, ConvertPrepare, FixtureSource, LocalFixtureSource, PrepareStep,
};
pub use suite::{
    clean_directory, collect_file_pairs, RegistryConfig, SetupError, SuiteConfig, SuiteRegistry,
    SuiteSpec,
};
pub use types::{FileReport, Mismatch, RunReport, ALL_VARIABLES, GLOBAL_SCOPE};
