//! Exit codes for the obsdiff binary.

use crate::dispatch::RunError;

/// Exit codes.
pub mod codes {
    /// All verified pairs matched.
    pub const SUCCESS: u8 = 0;
    /// Verification ran to completion and found mismatches.
    pub const MISMATCH: u8 = 1;
    /// Configuration or setup failure; no comparison executed.
    pub const SETUP_ERROR: u8 = 2;
    /// Malformed input data; the run aborted.
    pub const DATA_ERROR: u8 = 3;
}

/// Map a fatal run error to its exit code.
pub fn exit_code(err: &RunError) -> u8 {
    match err {
        RunError::Setup(_) => codes::SETUP_ERROR,
        RunError::Store(_) | RunError::Schema(_) | RunError::Compare(_) => codes::DATA_ERROR,
    }
}
