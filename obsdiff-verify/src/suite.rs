//! Suite descriptors, registry, and file-pair collection.
//!
//! A suite binds a marker name to a conversion executable, its input and
//! output directories, a reference corpus, and an extension filter. The
//! registry is built once at startup from a JSON configuration and passed by
//! reference to the dispatcher.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal configuration and setup errors. These abort a run before any
/// comparison executes and are never confused with data mismatches.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unknown suite marker: {0}")]
    UnknownMarker(String),

    #[error("reference directory not found: {0}")]
    MissingReferenceDir(PathBuf),

    #[error("output directory not found: {0}")]
    MissingOutputDir(PathBuf),

    #[error("missing reference file for: {0}")]
    MissingReference(String),

    #[error("no matching {ext} file pairs found in {dir}")]
    NoPairs { ext: String, dir: PathBuf },

    #[error("converter executable not found: {0}")]
    MissingExecutable(PathBuf),

    #[error("input directory not found: {0}")]
    MissingInputDir(PathBuf),

    #[error("{executable} failed for {input}: {stderr}")]
    ConverterFailed {
        executable: String,
        input: String,
        stderr: String,
    },

    #[error("fixture not found: {0}")]
    MissingFixture(PathBuf),

    #[error("fixture archive checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("invalid glob pattern: {0}")]
    InvalidPattern(String),

    #[error("failed to read suite config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse suite config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Immutable suite descriptor, consumed during dispatch, never mutated.
#[derive(Debug, Clone)]
pub struct SuiteSpec {
    /// Marker name selecting this suite.
    pub marker: String,
    /// Conversion executable invoked during preparation.
    pub executable: PathBuf,
    /// Directory holding the converter's input files.
    pub input_dir: PathBuf,
    /// Directory the converter writes its output into. Owned by this suite;
    /// removed at teardown.
    pub output_dir: PathBuf,
    /// Trusted reference corpus.
    pub ref_dir: PathBuf,
    /// Extension filter for output files, e.g. ".h5".
    pub ext: String,
    /// Fixture binding name resolved through the fixture source.
    pub fixture: String,
}

/// Serializable subset of a suite descriptor (the on-disk configuration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub marker: String,
    pub executable: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub reference_dir: PathBuf,
    pub extension: String,
    pub fixture: String,
}

impl SuiteConfig {
    /// Convert to a suite descriptor.
    pub fn to_spec(&self) -> SuiteSpec {
        SuiteSpec {
            marker: self.marker.clone(),
            executable: self.executable.clone(),
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            ref_dir: self.reference_dir.clone(),
            ext: self.extension.clone(),
            fixture: self.fixture.clone(),
        }
    }
}

/// Top-level suite configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub suites: Vec<SuiteConfig>,
}

/// Fixed mapping from marker name to suite descriptor.
#[derive(Debug, Default)]
pub struct SuiteRegistry {
    suites: BTreeMap<String, SuiteSpec>,
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a JSON configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self, SetupError> {
        let content = fs::read_to_string(path).map_err(|e| SetupError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: RegistryConfig =
            serde_json::from_str(&content).map_err(|e| SetupError::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        let mut registry = Self::new();
        for suite in &config.suites {
            registry.register(suite.to_spec());
        }
        Ok(registry)
    }

    /// Register a suite under its marker.
    pub fn register(&mut self, spec: SuiteSpec) {
        self.suites.insert(spec.marker.clone(), spec);
    }

    pub fn get(&self, marker: &str) -> Option<&SuiteSpec> {
        self.suites.get(marker)
    }

    /// All registered markers, sorted.
    pub fn markers(&self) -> impl Iterator<Item = &String> {
        self.suites.keys()
    }

    /// Resolve the suites selected by `markers`. An empty selection resolves
    /// to no suites (the default unmarked run triggers no side effects); an
    /// unknown marker is a fatal configuration error.
    pub fn active(&self, markers: &[String]) -> Result<Vec<&SuiteSpec>, SetupError> {
        markers
            .iter()
            .map(|m| {
                self.suites
                    .get(m)
                    .ok_or_else(|| SetupError::UnknownMarker(m.clone()))
            })
            .collect()
    }
}

/// Build the (reference, candidate) file pair list for one suite.
///
/// Candidate files are enumerated from the output directory, filtered by the
/// extension glob, sorted by name, and matched to a same-named reference
/// file. A candidate with no reference counterpart is a fatal setup error —
/// a broken corpus must not be masked by a silent skip. Zero pairs is also
/// fatal.
pub fn collect_file_pairs(
    ref_dir: &Path,
    out_dir: &Path,
    ext: &str,
) -> Result<Vec<(PathBuf, PathBuf)>, SetupError> {
    if !ref_dir.is_dir() {
        return Err(SetupError::MissingReferenceDir(ref_dir.to_path_buf()));
    }
    if !out_dir.is_dir() {
        return Err(SetupError::MissingOutputDir(out_dir.to_path_buf()));
    }

    let pattern = Pattern::new(&format!("*{}", ext))
        .map_err(|_| SetupError::InvalidPattern(format!("*{}", ext)))?;

    let mut names = Vec::new();
    for entry in fs::read_dir(out_dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if pattern.matches(&name) {
            names.push(name);
        }
    }
    names.sort();

    let mut pairs = Vec::new();
    for name in names {
        let reference = ref_dir.join(&name);
        if !reference.exists() {
            return Err(SetupError::MissingReference(name));
        }
        pairs.push((reference, out_dir.join(&name)));
    }

    if pairs.is_empty() {
        return Err(SetupError::NoPairs {
            ext: ext.to_string(),
            dir: out_dir.to_path_buf(),
        });
    }
    Ok(pairs)
}

/// Remove a suite's generated output directory tree. Missing directories are
/// fine (nothing was generated).
pub fn clean_directory(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    Ok(())
}
