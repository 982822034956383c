//! Suite dispatch: resolve active suites, prepare, verify pairs, teardown.

use crate::compare::CompareError;
use crate::differ::diff_structures;
use crate::logger::Logger;
use crate::prepare::PrepareStep;
use crate::suite::{clean_directory, collect_file_pairs, SetupError, SuiteRegistry, SuiteSpec};
use crate::types::{FileReport, RunReport};
use obsdiff_schema::{extract_structure, DatasetStore, SchemaError, StoreError};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Fatal errors aborting a verification run. Data mismatches are never
/// errors; they live in the run report.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Compare(#[from] CompareError),
}

/// Drives a verification run over the suites selected by marker.
///
/// The registry, dataset store, and logger are borrowed for the run; the
/// dispatcher itself holds no state between runs.
pub struct Dispatcher<'a> {
    registry: &'a SuiteRegistry,
    store: &'a dyn DatasetStore,
    logger: &'a dyn Logger,
    prepare: BTreeMap<String, Box<dyn PrepareStep>>,
    keep_output: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        registry: &'a SuiteRegistry,
        store: &'a dyn DatasetStore,
        logger: &'a dyn Logger,
    ) -> Self {
        Self {
            registry,
            store,
            logger,
            prepare: BTreeMap::new(),
            keep_output: false,
        }
    }

    /// Attach a preparation step to the suite registered under `marker`.
    pub fn with_prepare(mut self, marker: &str, step: Box<dyn PrepareStep>) -> Self {
        self.prepare.insert(marker.to_string(), step);
        self
    }

    /// Skip teardown of generated output directories after the run.
    pub fn keep_output(mut self, keep: bool) -> Self {
        self.keep_output = keep;
        self
    }

    /// Execute a run scoped to `markers`.
    ///
    /// An empty selection resolves to no suites and triggers no preparation
    /// side effects. Teardown of each active suite's output directory runs
    /// after verification whether or not mismatches were found, and also
    /// when a fatal error aborts the run partway.
    pub fn run(&self, markers: &[String]) -> Result<RunReport, RunError> {
        let active = self.registry.active(markers)?;
        let result = self.run_suites(&active);
        if !self.keep_output {
            for suite in &active {
                if let Err(e) = clean_directory(&suite.output_dir) {
                    self.logger.info(&format!(
                        "warning: failed to clean {}: {}",
                        suite.output_dir.display(),
                        e
                    ));
                }
            }
        }
        result
    }

    fn run_suites(&self, active: &[&SuiteSpec]) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();
        for suite in active {
            if let Some(step) = self.prepare.get(&suite.marker) {
                self.logger
                    .verbose(&format!("suite '{}': preparing", suite.marker));
                step.prepare(suite)?;
            }

            let pairs = collect_file_pairs(&suite.ref_dir, &suite.output_dir, &suite.ext)?;
            self.logger.verbose(&format!(
                "suite '{}': verifying {} file pair(s)",
                suite.marker,
                pairs.len()
            ));

            for (reference, candidate) in pairs {
                report.push(self.verify_pair(&reference, &candidate)?);
            }
        }
        Ok(report)
    }

    fn verify_pair(&self, reference: &Path, candidate: &Path) -> Result<FileReport, RunError> {
        let name = candidate
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| candidate.display().to_string());
        self.logger.debug(&format!("verifying {}", name));

        let ref_structure = extract_structure(&self.store.load(reference)?)?;
        let cand_structure = extract_structure(&self.store.load(candidate)?)?;
        let mismatches = diff_structures(&name, &ref_structure, &cand_structure)?;
        Ok(FileReport::new(&name, mismatches))
    }
}
