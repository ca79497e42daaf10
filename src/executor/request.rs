//! Execution request and result types.

use crate::host::{Diagnoser, ExecutionHost, RunResults};
use crate::log::{Logger, NoOpLogger};
use crate::platform::CpuAffinity;
use crate::wakelock::WakeLockPolicy;
use std::sync::Arc;

/// Exit code reported when the workload never produced one, e.g. it failed
/// before finishing.
pub const DEFAULT_EXIT_CODE: i32 = -1;

/// Error type workloads may fail with. Opaque to the host; it is logged,
/// never propagated.
pub type WorkloadError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The measured callable.
///
/// Invoked exactly once per run, on the dedicated worker thread, with the
/// host as its only collaborator. Outcome is success or failure; a failure
/// is caught inside the worker and converted to [`DEFAULT_EXIT_CODE`].
pub trait Workload: Send + Sync {
    /// Run the workload to completion.
    fn run(&self, host: &mut dyn ExecutionHost) -> Result<(), WorkloadError>;

    /// Whether the workload requires a legacy single-threaded COM
    /// apartment. Only meaningful on Windows; ignored elsewhere.
    fn single_threaded_apartment(&self) -> bool {
        false
    }
}

/// How the workload is being executed.
///
/// The execution core itself always runs in-process; the mode records which
/// in-process strategy the caller chose, because some strategies are
/// documented to ignore wake-lock semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Standard in-process measurement run.
    #[default]
    InProcess,
    /// Debug-oriented in-process run (developer stepping through the
    /// workload). Wake locks are pointless here and are bypassed.
    InProcessDebug,
}

impl ExecutionMode {
    /// True for modes documented to ignore wake-lock semantics.
    pub fn ignores_wake_lock(self) -> bool {
        matches!(self, ExecutionMode::InProcessDebug)
    }
}

/// Everything needed to execute one benchmark.
///
/// Immutable once constructed; owned by the caller and handed to
/// [`crate::executor::InProcessExecutor::execute`].
pub struct ExecutionRequest {
    /// Display name of the benchmark, used in log and error messages.
    pub benchmark: String,
    /// The measured callable.
    pub workload: Arc<dyn Workload>,
    /// Resolved CPU-affinity mask to pin the process to, if any.
    pub affinity: Option<CpuAffinity>,
    /// Sink for warnings and caught workload errors.
    pub logger: Arc<dyn Logger>,
    /// Opaque diagnoser handle, passed through to the host unchanged.
    pub diagnoser: Option<Arc<dyn Diagnoser>>,
    /// Per-workload wake-lock override; wins over the global default.
    pub wake_lock_override: Option<WakeLockPolicy>,
}

impl ExecutionRequest {
    /// Create a request with no affinity, a silent logger, no diagnoser and
    /// no wake-lock override.
    pub fn new(benchmark: impl Into<String>, workload: Arc<dyn Workload>) -> Self {
        Self {
            benchmark: benchmark.into(),
            workload,
            affinity: None,
            logger: Arc::new(NoOpLogger),
            diagnoser: None,
            wake_lock_override: None,
        }
    }

    /// Attach a logger sink.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Pin the run to the given affinity mask.
    pub fn with_affinity(mut self, affinity: CpuAffinity) -> Self {
        self.affinity = Some(affinity);
        self
    }

    /// Attach a diagnoser handle.
    pub fn with_diagnoser(mut self, diagnoser: Arc<dyn Diagnoser>) -> Self {
        self.diagnoser = Some(diagnoser);
        self
    }

    /// Override the global wake-lock policy for this workload.
    pub fn with_wake_lock(mut self, policy: WakeLockPolicy) -> Self {
        self.wake_lock_override = Some(policy);
        self
    }
}

/// Outcome of one bounded, in-time execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Worker exit code: `0` for a successful workload,
    /// [`DEFAULT_EXIT_CODE`] when it failed before finishing.
    pub exit_code: i32,
    /// Measurements the host collected, in arrival order. Opaque to the
    /// core; aggregation belongs to the caller.
    pub run_results: RunResults,
}

impl ExecutionResult {
    /// Build a result from collected run data and the worker's exit code.
    pub fn from_run_results(run_results: RunResults, exit_code: i32) -> Self {
        Self {
            exit_code,
            run_results,
        }
    }

    /// True when the workload completed successfully.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopWorkload;

    impl Workload for NoopWorkload {
        fn run(&self, _host: &mut dyn ExecutionHost) -> Result<(), WorkloadError> {
            Ok(())
        }
    }

    #[test]
    fn request_builder_defaults() {
        let request = ExecutionRequest::new("Fib/Recursive", Arc::new(NoopWorkload));
        assert_eq!(request.benchmark, "Fib/Recursive");
        assert!(request.affinity.is_none());
        assert!(request.diagnoser.is_none());
        assert!(request.wake_lock_override.is_none());
    }

    #[test]
    fn request_builder_sets_fields() {
        let request = ExecutionRequest::new("Fib/Iterative", Arc::new(NoopWorkload))
            .with_affinity(CpuAffinity::from_mask(0b11))
            .with_wake_lock(WakeLockPolicy::RequireSystemAwake);
        assert_eq!(request.affinity.map(|a| a.mask()), Some(0b11));
        assert_eq!(
            request.wake_lock_override,
            Some(WakeLockPolicy::RequireSystemAwake)
        );
    }

    #[test]
    fn sta_defaults_to_false() {
        assert!(!NoopWorkload.single_threaded_apartment());
    }

    #[test]
    fn mode_wake_lock_bypass() {
        assert!(!ExecutionMode::InProcess.ignores_wake_lock());
        assert!(ExecutionMode::InProcessDebug.ignores_wake_lock());
    }

    #[test]
    fn result_success_is_exit_zero() {
        let ok = ExecutionResult::from_run_results(RunResults::default(), 0);
        let failed = ExecutionResult::from_run_results(RunResults::default(), DEFAULT_EXIT_CODE);
        assert!(ok.is_success());
        assert!(!failed.is_success());
    }
}
