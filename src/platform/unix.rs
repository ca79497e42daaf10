//! Unix backend for scheduling control.
//!
//! Priorities are nice values (lower is more favorable). Thread priority on
//! Linux is the per-thread nice value addressed by thread id; CPU affinity
//! uses `sched_{get,set}affinity` and is Linux-only. On other Unixes the
//! thread and affinity operations report [`PlatformError::Unsupported`] and
//! the executor degrades gracefully.

use super::{CpuAffinity, PlatformError, ProcessPriority, ResourceControl, ThreadPriority};

/// Nice value used when elevating. The kernel clamps what an unprivileged
/// process may set; a rejection surfaces as a warning, not a failure.
const ELEVATED_NICE: i32 = -20;

/// Native resource control for Unix targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeResourceControl;

impl NativeResourceControl {
    /// Create the backend. Stateless; every call reads the live OS state.
    pub fn new() -> Self {
        Self
    }
}

/// Reset errno so a -1 return from `getpriority` can be told apart from a
/// legitimate nice value of -1.
fn clear_errno() {
    #[cfg(target_os = "linux")]
    // SAFETY: errno location is valid for the calling thread.
    unsafe {
        *libc::__errno_location() = 0;
    }
    #[cfg(target_os = "macos")]
    // SAFETY: errno location is valid for the calling thread.
    unsafe {
        *libc::__error() = 0;
    }
}

fn errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

fn get_nice(who: libc::id_t) -> Result<i32, PlatformError> {
    clear_errno();
    // SAFETY: getpriority has no memory arguments.
    let nice = unsafe { libc::getpriority(libc::PRIO_PROCESS as _, who) };
    if nice == -1 && errno() != 0 {
        return Err(PlatformError::os("getpriority"));
    }
    Ok(nice)
}

fn set_nice(who: libc::id_t, nice: i32) -> Result<(), PlatformError> {
    // SAFETY: setpriority has no memory arguments.
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS as _, who, nice) };
    if rc != 0 {
        return Err(PlatformError::os("setpriority"));
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn current_thread_id() -> libc::id_t {
    // SAFETY: gettid never fails.
    (unsafe { libc::syscall(libc::SYS_gettid) }) as libc::id_t
}

impl ResourceControl for NativeResourceControl {
    fn process_priority(&self) -> Result<ProcessPriority, PlatformError> {
        get_nice(0).map(ProcessPriority)
    }

    fn set_process_priority(&self, priority: ProcessPriority) -> Result<(), PlatformError> {
        set_nice(0, priority.0)
    }

    fn elevated_process_priority(&self) -> ProcessPriority {
        ProcessPriority(ELEVATED_NICE)
    }

    #[cfg(target_os = "linux")]
    fn thread_priority(&self) -> Result<ThreadPriority, PlatformError> {
        get_nice(current_thread_id()).map(ThreadPriority)
    }

    #[cfg(not(target_os = "linux"))]
    fn thread_priority(&self) -> Result<ThreadPriority, PlatformError> {
        Err(PlatformError::Unsupported("thread priority"))
    }

    #[cfg(target_os = "linux")]
    fn set_thread_priority(&self, priority: ThreadPriority) -> Result<(), PlatformError> {
        set_nice(current_thread_id(), priority.0)
    }

    #[cfg(not(target_os = "linux"))]
    fn set_thread_priority(&self, _priority: ThreadPriority) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported("thread priority"))
    }

    fn elevated_thread_priority(&self) -> ThreadPriority {
        ThreadPriority(ELEVATED_NICE)
    }

    #[cfg(target_os = "linux")]
    fn process_affinity(&self) -> Result<CpuAffinity, PlatformError> {
        // SAFETY: zeroed cpu_set_t is a valid empty set.
        let mut set: libc::cpu_set_t = unsafe { std::mem::zeroed() };
        // SAFETY: set points to a properly sized cpu_set_t.
        let rc = unsafe {
            libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set)
        };
        if rc != 0 {
            return Err(PlatformError::os("sched_getaffinity"));
        }

        let mut mask = 0u64;
        for cpu in 0..64usize {
            // SAFETY: cpu < CPU_SETSIZE.
            if unsafe { libc::CPU_ISSET(cpu, &set) } {
                mask |= 1u64 << cpu;
            }
        }
        Ok(CpuAffinity(mask))
    }

    #[cfg(not(target_os = "linux"))]
    fn process_affinity(&self) -> Result<CpuAffinity, PlatformError> {
        Err(PlatformError::Unsupported("CPU affinity"))
    }

    #[cfg(target_os = "linux")]
    fn set_process_affinity(&self, affinity: CpuAffinity) -> Result<(), PlatformError> {
        if affinity.0 == 0 {
            return Err(PlatformError::Invalid {
                what: "affinity mask",
                detail: "mask selects no CPUs".to_string(),
            });
        }

        // SAFETY: zeroed cpu_set_t is a valid empty set.
        let mut set: libc::cpu_set_t = unsafe { std::mem::zeroed() };
        for cpu in 0..64usize {
            if affinity.0 & (1u64 << cpu) != 0 {
                // SAFETY: cpu < CPU_SETSIZE.
                unsafe { libc::CPU_SET(cpu, &mut set) };
            }
        }
        // SAFETY: set points to a properly sized cpu_set_t.
        let rc =
            unsafe { libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) };
        if rc != 0 {
            return Err(PlatformError::os("sched_setaffinity"));
        }
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn set_process_affinity(&self, _affinity: CpuAffinity) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported("CPU affinity"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_own_process_priority() {
        let control = NativeResourceControl::new();
        let nice = control.process_priority().expect("getpriority failed");
        assert!((-20..=19).contains(&nice.raw()));
    }

    #[test]
    fn restore_to_current_value_succeeds() {
        // Setting the priority to its current value needs no privilege and
        // exercises the same code path as a guard restore.
        let control = NativeResourceControl::new();
        let current = control.process_priority().expect("getpriority failed");
        control
            .set_process_priority(current)
            .expect("setpriority to current value failed");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn reads_own_thread_priority() {
        let control = NativeResourceControl::new();
        let nice = control.thread_priority().expect("thread getpriority failed");
        assert!((-20..=19).contains(&nice.raw()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn affinity_round_trip() {
        let control = NativeResourceControl::new();
        let before = control.process_affinity().expect("affinity unreadable");
        assert_ne!(before.mask(), 0);

        control
            .set_process_affinity(before)
            .expect("restoring current affinity failed");
        let after = control.process_affinity().expect("affinity unreadable");
        assert_eq!(before, after);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn empty_affinity_mask_is_rejected() {
        let control = NativeResourceControl::new();
        let err = control
            .set_process_affinity(CpuAffinity::from_mask(0))
            .unwrap_err();
        assert!(matches!(err, PlatformError::Invalid { .. }));
    }
}
