//! OS scheduling and process-environment primitives.
//!
//! This module isolates every native call the execution host makes:
//! process/thread priority, CPU affinity, debugger detection, and the
//! legacy single-threaded COM apartment. The [`ResourceControl`] trait is
//! the seam between the executor and the OS, which keeps the elevation
//! logic testable against a mock backend.
//!
//! All setters are plain one-shot calls; the best-effort retry-free
//! discipline (attempt once, warn on failure, keep running) lives in the
//! executor, not here.

use std::fmt;
use std::io;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::NativeResourceControl;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::NativeResourceControl;

#[cfg(not(any(unix, windows)))]
mod unsupported;
#[cfg(not(any(unix, windows)))]
pub use unsupported::NativeResourceControl;

// =============================================================================
// Value types
// =============================================================================

/// A process priority value in the platform's native encoding.
///
/// On Windows this is a priority class (e.g. `HIGH_PRIORITY_CLASS`); on
/// Unix it is a nice value. The executor treats it as opaque: it reads the
/// current value, asks the backend for the elevated one, and writes values
/// back verbatim on restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessPriority(pub(crate) i32);

impl ProcessPriority {
    /// Raw platform value.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Wrap a raw platform value (used by backends and tests).
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ProcessPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A thread priority value in the platform's native encoding.
///
/// Opaque to the executor, same discipline as [`ProcessPriority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadPriority(pub(crate) i32);

impl ThreadPriority {
    /// Raw platform value.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Wrap a raw platform value (used by backends and tests).
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ThreadPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A CPU affinity mask: bit N set means logical CPU N is allowed.
///
/// Only the first 64 logical CPUs are representable, which matches the
/// affinity surface the host exposes to benchmark configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuAffinity(pub(crate) u64);

impl CpuAffinity {
    /// Create a mask from raw bits. Zero is a valid value to construct but
    /// every backend rejects it on set.
    pub fn from_mask(mask: u64) -> Self {
        Self(mask)
    }

    /// Raw mask bits.
    pub fn mask(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CpuAffinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors from native scheduling calls.
///
/// Every variant is recoverable from the executor's point of view: a failed
/// priority or affinity call downgrades to a warning, never an abort.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The operation has no implementation on this platform.
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    /// The OS rejected the call.
    #[error("{op} failed: {source}")]
    Os {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// The caller supplied a value the platform cannot apply.
    #[error("invalid {what}: {detail}")]
    Invalid {
        what: &'static str,
        detail: String,
    },
}

impl PlatformError {
    pub(crate) fn os(op: &'static str) -> Self {
        PlatformError::Os {
            op,
            source: io::Error::last_os_error(),
        }
    }
}

// =============================================================================
// Resource control seam
// =============================================================================

/// Read/write access to process-wide scheduling state.
///
/// `process_*` methods act on the current process, `thread_*` methods on the
/// calling thread. Getters may fail (permissions, platform gaps); the
/// executor records an absent snapshot value and skips the matching restore.
pub trait ResourceControl: Send + Sync {
    /// Current process priority.
    fn process_priority(&self) -> Result<ProcessPriority, PlatformError>;

    /// Set the process priority.
    fn set_process_priority(&self, priority: ProcessPriority) -> Result<(), PlatformError>;

    /// The highest non-realtime process priority on this platform.
    fn elevated_process_priority(&self) -> ProcessPriority;

    /// Current priority of the calling thread.
    fn thread_priority(&self) -> Result<ThreadPriority, PlatformError>;

    /// Set the priority of the calling thread.
    fn set_thread_priority(&self, priority: ThreadPriority) -> Result<(), PlatformError>;

    /// The maximum thread priority on this platform.
    fn elevated_thread_priority(&self) -> ThreadPriority;

    /// Current process CPU affinity mask.
    fn process_affinity(&self) -> Result<CpuAffinity, PlatformError>;

    /// Pin the process to the given affinity mask.
    fn set_process_affinity(&self, affinity: CpuAffinity) -> Result<(), PlatformError>;
}

/// The native backend for the compile target.
pub fn native() -> NativeResourceControl {
    NativeResourceControl::new()
}

// =============================================================================
// Debugger detection
// =============================================================================

/// Returns true when an interactive debugger is attached to this process.
///
/// Linux: reads `TracerPid` from `/proc/self/status`. Windows:
/// `IsDebuggerPresent`. Other targets report false.
pub fn debugger_attached() -> bool {
    debugger_attached_impl()
}

#[cfg(target_os = "linux")]
fn debugger_attached_impl() -> bool {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
        return false;
    };
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .map(|rest| rest.trim().parse::<u32>().unwrap_or(0) != 0)
        .unwrap_or(false)
}

#[cfg(windows)]
fn debugger_attached_impl() -> bool {
    // SAFETY: no arguments, no side effects.
    unsafe { windows_sys::Win32::System::Diagnostics::Debug::IsDebuggerPresent() != 0 }
}

#[cfg(not(any(target_os = "linux", windows)))]
fn debugger_attached_impl() -> bool {
    false
}

// =============================================================================
// Single-threaded apartment
// =============================================================================

/// Scoped membership in a legacy single-threaded COM apartment.
///
/// Only meaningful on Windows; elsewhere the request is ignored and no
/// guard is produced. Held by the worker thread for the whole run when the
/// workload declares the requirement.
pub struct ApartmentGuard {
    _priv: (),
}

/// Enter a single-threaded apartment on the calling thread.
///
/// Returns `None` when the platform has no apartment concept or the native
/// initialization failed; neither case stops the run.
pub fn enter_single_threaded_apartment() -> Option<ApartmentGuard> {
    enter_sta_impl()
}

#[cfg(windows)]
fn enter_sta_impl() -> Option<ApartmentGuard> {
    use windows_sys::Win32::System::Com::{CoInitializeEx, COINIT_APARTMENTTHREADED};

    // SAFETY: standard per-thread COM initialization; the guard's Drop pairs
    // it with CoUninitialize on the same thread.
    let hr = unsafe { CoInitializeEx(std::ptr::null(), COINIT_APARTMENTTHREADED) };
    if hr >= 0 {
        Some(ApartmentGuard { _priv: () })
    } else {
        None
    }
}

#[cfg(not(windows))]
fn enter_sta_impl() -> Option<ApartmentGuard> {
    None
}

#[cfg(windows)]
impl Drop for ApartmentGuard {
    fn drop(&mut self) {
        // SAFETY: paired with the successful CoInitializeEx above.
        unsafe { windows_sys::Win32::System::Com::CoUninitialize() };
    }
}
