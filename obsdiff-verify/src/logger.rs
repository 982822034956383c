//! Logging abstraction for testable output.
//!
//! Trait-based so run output can be asserted deterministically in tests
//! without global logger state.

use std::io::Write;
use std::sync::{Arc, RwLock};

/// Verbosity level for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Normal output (always shown)
    Normal,
    /// Verbose output (-v flag)
    Verbose,
    /// Debug output (-vv flag)
    Debug,
}

impl Verbosity {
    /// Create verbosity from CLI flag count.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }
}

/// Trait for logging output. Implementations are shared by reference across
/// worker threads, so they must be `Send + Sync`.
pub trait Logger: Send + Sync {
    /// Log a message at the given verbosity level.
    fn log(&self, level: Verbosity, message: &str);

    /// Log at normal level (always visible).
    fn info(&self, message: &str) {
        self.log(Verbosity::Normal, message);
    }

    /// Log at verbose level (requires -v).
    fn verbose(&self, message: &str) {
        self.log(Verbosity::Verbose, message);
    }

    /// Log at debug level (requires -vv).
    fn debug(&self, message: &str) {
        self.log(Verbosity::Debug, message);
    }
}

/// Logger that writes to stderr.
#[derive(Debug)]
pub struct StderrLogger {
    level: Verbosity,
}

impl StderrLogger {
    /// Create a new stderr logger with the given verbosity level.
    pub fn new(level: Verbosity) -> Self {
        Self { level }
    }
}

impl Logger for StderrLogger {
    fn log(&self, level: Verbosity, message: &str) {
        if level <= self.level {
            let _ = writeln!(std::io::stderr(), "{}", message);
        }
    }
}

/// Logger that captures messages in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct BufferLogger {
    messages: Arc<RwLock<Vec<(Verbosity, String)>>>,
}

impl BufferLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages, regardless of level.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .read()
            .expect("logger lock poisoned")
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl Logger for BufferLogger {
    fn log(&self, level: Verbosity, message: &str) {
        self.messages
            .write()
            .expect("logger lock poisoned")
            .push((level, message.to_string()));
    }
}
