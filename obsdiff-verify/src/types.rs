//! Verdict types: mismatch records and run reports.

use serde::Serialize;
use std::fmt;

/// Variable slot used for whole-group structural mismatches.
pub const ALL_VARIABLES: &str = "<ALL>";

/// Variable slot used for root-scope (file-global) attribute mismatches.
pub const GLOBAL_SCOPE: &str = "global";

/// One detected difference between reference and candidate.
///
/// Produced by the comparator and the differ, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub file: String,
    pub group: String,
    pub variable: String,
    pub reason: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Dataset Mismatch] File: '{}' | Group: '{}' | Variable: '{}'\n\
             Reason: {}\nExpected: {}\nActual:   {}",
            self.file, self.group, self.variable, self.reason, self.expected, self.actual
        )
    }
}

/// Verdict for one reference/candidate file pair.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub passed: bool,
    pub mismatches: Vec<Mismatch>,
}

impl FileReport {
    pub fn new(file: &str, mismatches: Vec<Mismatch>) -> Self {
        Self {
            file: file.to_string(),
            passed: mismatches.is_empty(),
            mismatches,
        }
    }
}

/// Aggregate verdict of a run: one report per verified file pair.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn push(&mut self, report: FileReport) {
        self.files.push(report);
    }

    /// A run passes when no file pair produced a mismatch.
    pub fn passed(&self) -> bool {
        self.files.iter().all(|f| f.passed)
    }

    pub fn total_mismatches(&self) -> usize {
        self.files.iter().map(|f| f.mismatches.len()).sum()
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &Mismatch> {
        self.files.iter().flat_map(|f| f.mismatches.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mismatch() -> Mismatch {
        Mismatch {
            file: "obs.nc.json".to_string(),
            group: "/ObsValue".to_string(),
            variable: "airTemperature".to_string(),
            reason: "Dtype mismatch".to_string(),
            expected: "float".to_string(),
            actual: "double".to_string(),
        }
    }

    #[test]
    fn test_mismatch_display_renders_all_fields() {
        let text = sample_mismatch().to_string();
        assert!(text.contains("File: 'obs.nc.json'"));
        assert!(text.contains("Group: '/ObsValue'"));
        assert!(text.contains("Variable: 'airTemperature'"));
        assert!(text.contains("Reason: Dtype mismatch"));
        assert!(text.contains("Expected: float"));
        assert!(text.contains("Actual:   double"));
    }

    #[test]
    fn test_file_report_pass() {
        let report = FileReport::new("obs.nc.json", vec![]);
        assert!(report.passed);
        assert!(report.mismatches.is_empty());
    }

    #[test]
    fn test_file_report_fail() {
        let report = FileReport::new("obs.nc.json", vec![sample_mismatch()]);
        assert!(!report.passed);
        assert_eq!(report.mismatches.len(), 1);
    }

    #[test]
    fn test_run_report_aggregation() {
        let mut run = RunReport::default();
        run.push(FileReport::new("a.json", vec![]));
        assert!(run.passed());

        run.push(FileReport::new("b.json", vec![sample_mismatch()]));
        assert!(!run.passed());
        assert_eq!(run.total_mismatches(), 1);
        assert_eq!(run.mismatches().count(), 1);
    }
}
