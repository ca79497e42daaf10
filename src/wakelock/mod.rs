//! Wake-lock management.
//!
//! While a benchmark runs, the host can ask the OS not to enter sleep (and
//! optionally not to turn off the display), since a power-state transition
//! mid-measurement distorts timing. The policy is resolved from a global
//! configuration default and an optional per-workload override; certain
//! execution modes ignore wake locks entirely.
//!
//! Windows is the only platform with a native mechanism here. Everywhere
//! else [`WakeLock::request`] returns `None`, which is the expected outcome
//! and logged at most at debug level - never a warning.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use benchhost::executor::ExecutionMode;
//! use benchhost::log::{Logger, NoOpLogger};
//! use benchhost::wakelock::{resolve, WakeLock, WakeLockPolicy};
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
//! let policy = resolve(WakeLockPolicy::RequireSystemAwake, None, ExecutionMode::InProcess);
//! let lock = WakeLock::request(policy, "benchhost running benchmarks", &logger);
//! drop(lock); // released here; None on non-Windows targets
//! ```

mod power_request;
#[cfg(windows)]
mod windows;

pub use power_request::{parse_power_requests, PowerRequestEntry};

use crate::executor::ExecutionMode;
use crate::log::Logger;
#[cfg(windows)]
use crate::log_warn;
use std::sync::Arc;

/// What the host asks the OS to keep awake during a run.
///
/// Ordered by strength: `None < RequireSystemAwake <
/// RequireSystemAndDisplayAwake`. Comparison is by enum value only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WakeLockPolicy {
    /// Allow the system to sleep and the display to turn off.
    #[default]
    None,
    /// Keep the system awake; the display may still turn off.
    RequireSystemAwake,
    /// Keep both the system and the display awake.
    RequireSystemAndDisplayAwake,
}

/// Resolve the effective wake-lock policy for a run.
///
/// Precedence, highest first: an execution mode documented to ignore wake
/// locks forces [`WakeLockPolicy::None`]; otherwise a per-workload override
/// wins; otherwise the global configuration default applies.
pub fn resolve(
    global_default: WakeLockPolicy,
    per_workload_override: Option<WakeLockPolicy>,
    mode: ExecutionMode,
) -> WakeLockPolicy {
    if mode.ignores_wake_lock() {
        return WakeLockPolicy::None;
    }
    per_workload_override.unwrap_or(global_default)
}

/// A held OS wake lock.
///
/// Only constructed when a native request was actually taken: the platform
/// supports wake locks, the policy is not `None`, and the native calls
/// succeeded. Releasing is idempotent and also happens on `Drop`, mirroring
/// the scoped-acquisition discipline of the elevation guard.
pub struct WakeLock {
    #[cfg(windows)]
    inner: Option<windows::PowerRequest>,
    #[cfg(not(windows))]
    inner: Option<std::convert::Infallible>,
}

impl WakeLock {
    /// Request a wake lock for the given policy.
    ///
    /// Returns `None` when the policy is [`WakeLockPolicy::None`] or the
    /// platform has no wake-lock mechanism; both are expected outcomes and
    /// produce no warning. A native failure on a supporting platform is
    /// best-effort: it logs a warning and returns `None`.
    pub fn request(
        policy: WakeLockPolicy,
        reason: &str,
        logger: &Arc<dyn Logger>,
    ) -> Option<WakeLock> {
        if policy == WakeLockPolicy::None {
            return None;
        }
        Self::request_native(policy, reason, logger)
    }

    #[cfg(windows)]
    fn request_native(
        policy: WakeLockPolicy,
        reason: &str,
        logger: &Arc<dyn Logger>,
    ) -> Option<WakeLock> {
        let keep_display = policy == WakeLockPolicy::RequireSystemAndDisplayAwake;
        match windows::PowerRequest::create(reason, keep_display) {
            Ok(request) => Some(WakeLock {
                inner: Some(request),
            }),
            Err(e) => {
                log_warn!(logger, "failed to acquire wake lock ({policy:?}): {e}");
                None
            }
        }
    }

    #[cfg(not(windows))]
    fn request_native(
        _policy: WakeLockPolicy,
        _reason: &str,
        _logger: &Arc<dyn Logger>,
    ) -> Option<WakeLock> {
        None
    }

    /// Release the lock, clearing whichever native requests it holds.
    ///
    /// Safe to call more than once; subsequent calls are no-ops.
    pub fn release(&mut self) {
        #[cfg(windows)]
        if let Some(mut request) = self.inner.take() {
            request.clear();
        }
        #[cfg(not(windows))]
        {
            self.inner = None;
        }
    }

    /// True until the first `release` (or `Drop`).
    pub fn is_held(&self) -> bool {
        self.inner.is_some()
    }
}

impl Drop for WakeLock {
    fn drop(&mut self) {
        self.release();
    }
}
