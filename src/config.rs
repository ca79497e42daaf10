//! Execution settings.
//!
//! This module contains the [`ExecutionSettings`] struct and related
//! constants. Settings are process-level knobs decided by the caller's
//! configuration layer; per-benchmark values (workload, affinity, wake-lock
//! override) travel in [`crate::executor::ExecutionRequest`] instead.

use crate::executor::ExecutionMode;
use crate::wakelock::WakeLockPolicy;
use std::time::Duration;

// =============================================================================
// Configuration Constants
// =============================================================================

/// Default timeout for in-process benchmark runs.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Timeout used when an interactive debugger is attached, so a developer
/// can step through a workload without the supervisor firing.
pub const UNDER_DEBUGGER_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

// =============================================================================
// Execution Settings
// =============================================================================

/// Configuration for the execution host.
#[derive(Clone, Debug)]
pub struct ExecutionSettings {
    /// Wall-clock bound for one benchmark run. `Duration::ZERO` means
    /// "unset" and resolves to [`DEFAULT_TIMEOUT`].
    pub timeout: Duration,

    /// Whether workload output lines are forwarded to the request's logger.
    /// When false the workload writes into a silent sink.
    pub forward_output: bool,

    /// Global wake-lock policy default, overridable per workload.
    pub wake_lock: WakeLockPolicy,

    /// Execution mode identifier. Decides wake-lock bypass; see
    /// [`ExecutionMode::ignores_wake_lock`].
    pub mode: ExecutionMode,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            forward_output: false,
            wake_lock: WakeLockPolicy::None,
            mode: ExecutionMode::InProcess,
        }
    }
}
