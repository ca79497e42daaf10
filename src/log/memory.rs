//! In-memory capturing logger implementation.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;
use std::sync::Mutex;

/// A logger that captures every message in memory.
///
/// Intended for tests that assert on what the host logged: best-effort
/// resource-setting warnings, caught workload errors, forwarded workload
/// output. Messages are stored in arrival order together with their level.
///
/// # Example
///
/// ```
/// use benchhost::log::{Logger, LogLevel, MemoryLogger};
///
/// let logger = MemoryLogger::new();
/// logger.warn(format_args!("failed to set affinity"));
/// assert!(logger.contains(LogLevel::Warn, "affinity"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    /// Create an empty capturing logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all captured lines.
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().expect("logger mutex poisoned").clone()
    }

    /// Returns true if any captured line at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lines
            .lock()
            .expect("logger mutex poisoned")
            .iter()
            .any(|(l, line)| *l == level && line.contains(needle))
    }

    /// Number of captured lines at the given level.
    pub fn count_at(&self, level: LogLevel) -> usize {
        self.lines
            .lock()
            .expect("logger mutex poisoned")
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        self.lines
            .lock()
            .expect("logger mutex poisoned")
            .push((level, args.to_string()));
    }
}
