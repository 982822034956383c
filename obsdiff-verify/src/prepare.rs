//! Suite preparation: converter invocation and fixture resolution.
//!
//! Preparation is a one-time, blocking, idempotent setup phase per suite.
//! The network transport for fixture archives lives behind `FixtureSource`;
//! the shipped implementation resolves pre-materialized local fixtures and
//! can verify a cached archive against a SHA-256 checksum.

use crate::suite::{SetupError, SuiteSpec};
use glob::Pattern;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One-time preparation step for a suite.
pub trait PrepareStep {
    fn prepare(&self, suite: &SuiteSpec) -> Result<(), SetupError>;
}

/// Runs the conversion executable over the suite's input files.
///
/// Invocation contract: `executable -i <input_dir> -o <output_dir>
/// <input_filename>`, exit status zero on success. A non-zero exit is fatal
/// and carries the executable's diagnostic output. If the output directory
/// already holds files, the whole step is skipped so local re-runs do not
/// re-invoke the converter.
///
/// When a fixture source is attached, the suite's fixture binding is
/// resolved before anything else runs; an unresolved fixture is fatal.
pub struct ConvertPrepare {
    /// Glob selecting which input files are converted, e.g. `*gdas*`.
    pub input_pattern: String,
    fixtures: Option<Box<dyn FixtureSource>>,
}

impl ConvertPrepare {
    pub fn new(input_pattern: &str) -> Self {
        Self {
            input_pattern: input_pattern.to_string(),
            fixtures: None,
        }
    }

    /// All inputs.
    pub fn all_inputs() -> Self {
        Self::new("*")
    }

    /// Resolve the suite's fixture binding through `source` before
    /// conversion.
    pub fn with_fixtures(mut self, source: Box<dyn FixtureSource>) -> Self {
        self.fixtures = Some(source);
        self
    }
}

impl PrepareStep for ConvertPrepare {
    fn prepare(&self, suite: &SuiteSpec) -> Result<(), SetupError> {
        if outputs_exist(&suite.output_dir)? {
            return Ok(());
        }
        if let Some(source) = &self.fixtures {
            source.ensure(&suite.fixture)?;
        }
        if !suite.executable.is_file() {
            return Err(SetupError::MissingExecutable(suite.executable.clone()));
        }
        if !suite.input_dir.is_dir() {
            return Err(SetupError::MissingInputDir(suite.input_dir.clone()));
        }

        let pattern = Pattern::new(&self.input_pattern)
            .map_err(|_| SetupError::InvalidPattern(self.input_pattern.clone()))?;

        let mut inputs = Vec::new();
        for entry in fs::read_dir(&suite.input_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.path().is_file() && pattern.matches(&name) {
                inputs.push(name);
            }
        }
        inputs.sort();

        fs::create_dir_all(&suite.output_dir)?;

        for name in &inputs {
            let output = Command::new(&suite.executable)
                .arg("-i")
                .arg(&suite.input_dir)
                .arg("-o")
                .arg(&suite.output_dir)
                .arg(name)
                .output()?;
            if !output.status.success() {
                return Err(SetupError::ConverterFailed {
                    executable: suite.executable.display().to_string(),
                    input: name.clone(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
        }
        Ok(())
    }
}

fn outputs_exist(dir: &Path) -> Result<bool, SetupError> {
    if !dir.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(dir)?.next().is_some())
}

/// Resolves a fixture binding name to a local directory.
///
/// Fetch and extraction of remote archives are owned by implementations of
/// this trait; both must be idempotent (skip when the cached archive or the
/// extracted directory already exists).
pub trait FixtureSource {
    fn ensure(&self, name: &str) -> Result<PathBuf, SetupError>;
}

/// Fixture source over an already-materialized local directory tree.
///
/// Archive fixtures can be pinned to an expected SHA-256 checksum, which is
/// then verified on every resolution.
#[derive(Debug, Clone)]
pub struct LocalFixtureSource {
    root: PathBuf,
    checksums: BTreeMap<String, String>,
}

impl LocalFixtureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            checksums: BTreeMap::new(),
        }
    }

    /// Pin the named fixture archive to an expected SHA-256 checksum.
    pub fn with_checksum(mut self, name: &str, sha256_hex: &str) -> Self {
        self.checksums
            .insert(name.to_string(), sha256_hex.to_string());
        self
    }
}

impl FixtureSource for LocalFixtureSource {
    fn ensure(&self, name: &str) -> Result<PathBuf, SetupError> {
        let path = self.root.join(name);
        if !path.exists() {
            return Err(SetupError::MissingFixture(path));
        }
        if let Some(expected) = self.checksums.get(name) {
            verify_archive_checksum(&path, expected)?;
        }
        Ok(path)
    }
}

/// Verify a cached fixture archive against its expected SHA-256 checksum.
pub fn verify_archive_checksum(path: &Path, expected_hex: &str) -> Result<(), SetupError> {
    let mut file = fs::File::open(path).map_err(|_| SetupError::MissingFixture(path.into()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let actual = format!("{:x}", hasher.finalize());
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(SetupError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected_hex.to_string(),
            actual,
        })
    }
}
