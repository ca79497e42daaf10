//! Fallback backend for targets without scheduling control.
//!
//! Every operation reports [`PlatformError::Unsupported`]; the executor's
//! best-effort discipline turns each into a single warning and keeps going.

use super::{CpuAffinity, PlatformError, ProcessPriority, ResourceControl, ThreadPriority};

/// No-op resource control for unsupported targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeResourceControl;

impl NativeResourceControl {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }
}

impl ResourceControl for NativeResourceControl {
    fn process_priority(&self) -> Result<ProcessPriority, PlatformError> {
        Err(PlatformError::Unsupported("process priority"))
    }

    fn set_process_priority(&self, _priority: ProcessPriority) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported("process priority"))
    }

    fn elevated_process_priority(&self) -> ProcessPriority {
        ProcessPriority(0)
    }

    fn thread_priority(&self) -> Result<ThreadPriority, PlatformError> {
        Err(PlatformError::Unsupported("thread priority"))
    }

    fn set_thread_priority(&self, _priority: ThreadPriority) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported("thread priority"))
    }

    fn elevated_thread_priority(&self) -> ThreadPriority {
        ThreadPriority(0)
    }

    fn process_affinity(&self) -> Result<CpuAffinity, PlatformError> {
        Err(PlatformError::Unsupported("CPU affinity"))
    }

    fn set_process_affinity(&self, _affinity: CpuAffinity) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported("CPU affinity"))
    }
}
