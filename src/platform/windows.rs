//! Windows backend for scheduling control.
//!
//! Process priority is the priority class of the current process; the
//! elevated value is `HIGH_PRIORITY_CLASS`, deliberately below realtime.
//! Thread priority uses the current thread; affinity uses the process
//! affinity mask.

use super::{CpuAffinity, PlatformError, ProcessPriority, ResourceControl, ThreadPriority};

use windows_sys::Win32::System::Threading::{
    GetCurrentProcess, GetCurrentThread, GetPriorityClass, GetProcessAffinityMask,
    GetThreadPriority, SetPriorityClass, SetProcessAffinityMask, SetThreadPriority,
    HIGH_PRIORITY_CLASS, THREAD_PRIORITY_ERROR_RETURN, THREAD_PRIORITY_HIGHEST,
};

/// Native resource control for Windows targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeResourceControl;

impl NativeResourceControl {
    /// Create the backend. Stateless; every call reads the live OS state.
    pub fn new() -> Self {
        Self
    }
}

impl ResourceControl for NativeResourceControl {
    fn process_priority(&self) -> Result<ProcessPriority, PlatformError> {
        // SAFETY: pseudo-handle to the current process, no cleanup needed.
        let class = unsafe { GetPriorityClass(GetCurrentProcess()) };
        if class == 0 {
            return Err(PlatformError::os("GetPriorityClass"));
        }
        Ok(ProcessPriority(class as i32))
    }

    fn set_process_priority(&self, priority: ProcessPriority) -> Result<(), PlatformError> {
        // SAFETY: pseudo-handle to the current process.
        let ok = unsafe { SetPriorityClass(GetCurrentProcess(), priority.0 as u32) };
        if ok == 0 {
            return Err(PlatformError::os("SetPriorityClass"));
        }
        Ok(())
    }

    fn elevated_process_priority(&self) -> ProcessPriority {
        ProcessPriority(HIGH_PRIORITY_CLASS as i32)
    }

    fn thread_priority(&self) -> Result<ThreadPriority, PlatformError> {
        // SAFETY: pseudo-handle to the current thread.
        let priority = unsafe { GetThreadPriority(GetCurrentThread()) };
        if priority == THREAD_PRIORITY_ERROR_RETURN as i32 {
            return Err(PlatformError::os("GetThreadPriority"));
        }
        Ok(ThreadPriority(priority))
    }

    fn set_thread_priority(&self, priority: ThreadPriority) -> Result<(), PlatformError> {
        // SAFETY: pseudo-handle to the current thread.
        let ok = unsafe { SetThreadPriority(GetCurrentThread(), priority.0) };
        if ok == 0 {
            return Err(PlatformError::os("SetThreadPriority"));
        }
        Ok(())
    }

    fn elevated_thread_priority(&self) -> ThreadPriority {
        ThreadPriority(THREAD_PRIORITY_HIGHEST)
    }

    fn process_affinity(&self) -> Result<CpuAffinity, PlatformError> {
        let mut process_mask: usize = 0;
        let mut system_mask: usize = 0;
        // SAFETY: out-pointers reference live locals.
        let ok = unsafe {
            GetProcessAffinityMask(GetCurrentProcess(), &mut process_mask, &mut system_mask)
        };
        if ok == 0 {
            return Err(PlatformError::os("GetProcessAffinityMask"));
        }
        Ok(CpuAffinity(process_mask as u64))
    }

    fn set_process_affinity(&self, affinity: CpuAffinity) -> Result<(), PlatformError> {
        if affinity.0 == 0 {
            return Err(PlatformError::Invalid {
                what: "affinity mask",
                detail: "mask selects no CPUs".to_string(),
            });
        }
        // SAFETY: pseudo-handle to the current process.
        let ok = unsafe { SetProcessAffinityMask(GetCurrentProcess(), affinity.0 as usize) };
        if ok == 0 {
            return Err(PlatformError::os("SetProcessAffinityMask"));
        }
        Ok(())
    }
}
