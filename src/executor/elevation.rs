//! Scheduling resource elevation with guaranteed restoration.
//!
//! [`ElevationGuard`] raises process priority, thread priority and
//! (optionally) CPU affinity for the duration of a measured run, and puts
//! every captured value back when it goes out of scope - on the normal
//! path, on the caught-failure path, and during unwinding alike.
//!
//! Every individual set is best-effort: one attempt, a warning on failure,
//! never an abort. The host keeps measuring with whatever elevation it
//! actually obtained.

use crate::log::Logger;
use crate::log_warn;
use crate::platform::{CpuAffinity, PlatformError, ProcessPriority, ResourceControl, ThreadPriority};
use std::sync::Arc;

/// Scheduling state captured before elevation.
///
/// Consumed exactly once, at restore time. Absent fields mean the value
/// could not be read and the matching restore is skipped.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSnapshot {
    process_priority: Option<ProcessPriority>,
    thread_priority: Option<ThreadPriority>,
    affinity: Option<CpuAffinity>,
}

impl ResourceSnapshot {
    /// Prior process priority, if it was readable.
    pub fn process_priority(&self) -> Option<ProcessPriority> {
        self.process_priority
    }

    /// Prior priority of the worker thread, if it was readable.
    pub fn thread_priority(&self) -> Option<ThreadPriority> {
        self.thread_priority
    }

    /// Prior affinity mask, if it was readable.
    pub fn affinity(&self) -> Option<CpuAffinity> {
        self.affinity
    }
}

/// RAII guard over elevated scheduling state.
///
/// Must be acquired and dropped on the worker thread: thread priority acts
/// on the calling thread.
pub struct ElevationGuard<'a> {
    control: &'a dyn ResourceControl,
    logger: Arc<dyn Logger>,
    snapshot: Option<ResourceSnapshot>,
    affinity_requested: bool,
}

impl<'a> ElevationGuard<'a> {
    /// Capture the current scheduling state, then elevate.
    ///
    /// Sets process priority to the highest non-realtime class, thread
    /// priority to its maximum, and pins the process to `desired_affinity`
    /// when one is given. Each failure is logged as a warning and skipped.
    pub fn acquire(
        control: &'a dyn ResourceControl,
        logger: Arc<dyn Logger>,
        desired_affinity: Option<CpuAffinity>,
    ) -> Self {
        let snapshot = ResourceSnapshot {
            process_priority: read_or_warn(&logger, "process priority", control.process_priority()),
            thread_priority: read_or_warn(&logger, "thread priority", control.thread_priority()),
            affinity: read_or_warn(&logger, "CPU affinity", control.process_affinity()),
        };

        try_set(
            &logger,
            "process priority",
            control.set_process_priority(control.elevated_process_priority()),
        );
        try_set(
            &logger,
            "thread priority",
            control.set_thread_priority(control.elevated_thread_priority()),
        );
        if let Some(affinity) = desired_affinity {
            try_set(
                &logger,
                "CPU affinity",
                control.set_process_affinity(affinity),
            );
        }

        Self {
            control,
            logger,
            snapshot: Some(snapshot),
            affinity_requested: desired_affinity.is_some(),
        }
    }

    /// The snapshot taken at acquire time, until restoration consumes it.
    pub fn snapshot(&self) -> Option<&ResourceSnapshot> {
        self.snapshot.as_ref()
    }

    /// Restore every captured value. Idempotent; also runs on `Drop`.
    ///
    /// Affinity restoration is skipped when no new affinity was requested
    /// or the prior mask was unreadable.
    pub fn restore(&mut self) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };

        if let Some(priority) = snapshot.process_priority {
            try_set(
                &self.logger,
                "process priority",
                self.control.set_process_priority(priority),
            );
        }
        if let Some(priority) = snapshot.thread_priority {
            try_set(
                &self.logger,
                "thread priority",
                self.control.set_thread_priority(priority),
            );
        }
        if self.affinity_requested {
            if let Some(affinity) = snapshot.affinity {
                try_set(
                    &self.logger,
                    "CPU affinity",
                    self.control.set_process_affinity(affinity),
                );
            }
        }
    }
}

impl Drop for ElevationGuard<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Uniform best-effort wrapper: one attempt, a warning on failure.
fn try_set(logger: &Arc<dyn Logger>, what: &str, result: Result<(), PlatformError>) {
    if let Err(e) = result {
        log_warn!(logger, "failed to set {what}: {e}");
    }
}

/// Read a value for the snapshot; unreadable values are warned about once
/// and recorded as absent.
fn read_or_warn<T>(
    logger: &Arc<dyn Logger>,
    what: &str,
    result: Result<T, PlatformError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log_warn!(logger, "could not read current {what}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{LogLevel, MemoryLogger, NoOpLogger};
    use std::sync::Mutex;

    /// Mock backend with observable state.
    struct MockControl {
        process: Mutex<i32>,
        thread: Mutex<i32>,
        affinity: Mutex<u64>,
        affinity_readable: bool,
    }

    impl MockControl {
        fn new() -> Self {
            Self {
                process: Mutex::new(0),
                thread: Mutex::new(0),
                affinity: Mutex::new(0xFF),
                affinity_readable: true,
            }
        }
    }

    impl ResourceControl for MockControl {
        fn process_priority(&self) -> Result<ProcessPriority, PlatformError> {
            Ok(ProcessPriority::from_raw(*self.process.lock().unwrap()))
        }

        fn set_process_priority(&self, priority: ProcessPriority) -> Result<(), PlatformError> {
            *self.process.lock().unwrap() = priority.raw();
            Ok(())
        }

        fn elevated_process_priority(&self) -> ProcessPriority {
            ProcessPriority::from_raw(100)
        }

        fn thread_priority(&self) -> Result<ThreadPriority, PlatformError> {
            Ok(ThreadPriority::from_raw(*self.thread.lock().unwrap()))
        }

        fn set_thread_priority(&self, priority: ThreadPriority) -> Result<(), PlatformError> {
            *self.thread.lock().unwrap() = priority.raw();
            Ok(())
        }

        fn elevated_thread_priority(&self) -> ThreadPriority {
            ThreadPriority::from_raw(99)
        }

        fn process_affinity(&self) -> Result<CpuAffinity, PlatformError> {
            if self.affinity_readable {
                Ok(CpuAffinity::from_mask(*self.affinity.lock().unwrap()))
            } else {
                Err(PlatformError::Unsupported("CPU affinity"))
            }
        }

        fn set_process_affinity(&self, affinity: CpuAffinity) -> Result<(), PlatformError> {
            *self.affinity.lock().unwrap() = affinity.mask();
            Ok(())
        }
    }

    fn noop_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger)
    }

    #[test]
    fn elevates_and_restores_priorities() {
        let control = MockControl::new();
        {
            let guard = ElevationGuard::acquire(&control, noop_logger(), None);
            assert_eq!(*control.process.lock().unwrap(), 100);
            assert_eq!(*control.thread.lock().unwrap(), 99);
            assert!(guard.snapshot().is_some());
        }
        // Pre-acquire values read back after release.
        assert_eq!(*control.process.lock().unwrap(), 0);
        assert_eq!(*control.thread.lock().unwrap(), 0);
    }

    #[test]
    fn pins_and_restores_affinity_when_requested() {
        let control = MockControl::new();
        {
            let _guard = ElevationGuard::acquire(
                &control,
                noop_logger(),
                Some(CpuAffinity::from_mask(0b10)),
            );
            assert_eq!(*control.affinity.lock().unwrap(), 0b10);
        }
        assert_eq!(*control.affinity.lock().unwrap(), 0xFF);
    }

    #[test]
    fn affinity_left_alone_when_not_requested() {
        let control = MockControl::new();
        {
            let _guard = ElevationGuard::acquire(&control, noop_logger(), None);
            assert_eq!(*control.affinity.lock().unwrap(), 0xFF);
        }
        assert_eq!(*control.affinity.lock().unwrap(), 0xFF);
    }

    #[test]
    fn unreadable_affinity_skips_restore_but_still_pins() {
        let mut control = MockControl::new();
        control.affinity_readable = false;
        {
            let _guard = ElevationGuard::acquire(
                &control,
                noop_logger(),
                Some(CpuAffinity::from_mask(0b1)),
            );
            assert_eq!(*control.affinity.lock().unwrap(), 0b1);
        }
        // No snapshot to restore from; the pin stays.
        assert_eq!(*control.affinity.lock().unwrap(), 0b1);
    }

    #[test]
    fn restore_is_idempotent() {
        let control = MockControl::new();
        let mut guard = ElevationGuard::acquire(&control, noop_logger(), None);
        guard.restore();
        *control.process.lock().unwrap() = 42;
        guard.restore(); // second call must not touch anything
        assert_eq!(*control.process.lock().unwrap(), 42);
    }

    #[test]
    fn restores_during_unwind() {
        let control = MockControl::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ElevationGuard::acquire(&control, noop_logger(), None);
            panic!("workload blew up");
        }));
        assert!(result.is_err());
        assert_eq!(*control.process.lock().unwrap(), 0);
        assert_eq!(*control.thread.lock().unwrap(), 0);
    }

    #[test]
    fn set_failures_are_warnings_not_aborts() {
        struct FailingControl;
        impl ResourceControl for FailingControl {
            fn process_priority(&self) -> Result<ProcessPriority, PlatformError> {
                Ok(ProcessPriority::from_raw(0))
            }
            fn set_process_priority(&self, _p: ProcessPriority) -> Result<(), PlatformError> {
                Err(PlatformError::Unsupported("process priority"))
            }
            fn elevated_process_priority(&self) -> ProcessPriority {
                ProcessPriority::from_raw(1)
            }
            fn thread_priority(&self) -> Result<ThreadPriority, PlatformError> {
                Ok(ThreadPriority::from_raw(0))
            }
            fn set_thread_priority(&self, _p: ThreadPriority) -> Result<(), PlatformError> {
                Err(PlatformError::Unsupported("thread priority"))
            }
            fn elevated_thread_priority(&self) -> ThreadPriority {
                ThreadPriority::from_raw(1)
            }
            fn process_affinity(&self) -> Result<CpuAffinity, PlatformError> {
                Err(PlatformError::Unsupported("CPU affinity"))
            }
            fn set_process_affinity(&self, _a: CpuAffinity) -> Result<(), PlatformError> {
                Err(PlatformError::Unsupported("CPU affinity"))
            }
        }

        let logger = Arc::new(MemoryLogger::new());
        {
            let _guard = ElevationGuard::acquire(
                &FailingControl,
                logger.clone(),
                Some(CpuAffinity::from_mask(1)),
            );
        }
        // Two failed sets at acquire + unreadable affinity + two failed
        // restores; all warnings, nothing escalated.
        assert!(logger.contains(LogLevel::Warn, "process priority"));
        assert!(logger.contains(LogLevel::Warn, "thread priority"));
        assert!(logger.contains(LogLevel::Warn, "CPU affinity"));
        assert_eq!(logger.count_at(LogLevel::Error), 0);
    }
}
