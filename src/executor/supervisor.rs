//! Timeout-bounded execution supervisor.

use super::error::ExecuteError;
use super::request::{ExecutionMode, ExecutionRequest, ExecutionResult, DEFAULT_EXIT_CODE};
use super::runner;
use crate::config::{ExecutionSettings, DEFAULT_TIMEOUT, UNDER_DEBUGGER_TIMEOUT};
use crate::host::{ExecutionHost, InProcessHost, RunResults};
use crate::log::{Logger, NoOpLogger};
use crate::platform;
use crate::wakelock::{self, WakeLockPolicy};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, warn};

/// What the worker thread hands back when it finishes in time.
struct WorkerOutcome {
    exit_code: i32,
    run_results: RunResults,
}

/// Executes benchmarks in-process under a hard wall-clock bound.
///
/// One dedicated worker thread is started per [`execute`](Self::execute)
/// call; the calling thread blocks on a bounded wait. See the module docs
/// for the single-run-per-process precondition.
pub struct InProcessExecutor {
    timeout: Duration,
    forward_output: bool,
    wake_lock_default: WakeLockPolicy,
    mode: ExecutionMode,
}

impl InProcessExecutor {
    /// Build an executor from settings. A zero timeout resolves to
    /// [`DEFAULT_TIMEOUT`].
    pub fn new(settings: &ExecutionSettings) -> Self {
        let timeout = if settings.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            settings.timeout
        };
        Self {
            timeout,
            forward_output: settings.forward_output,
            wake_lock_default: settings.wake_lock,
            mode: settings.mode,
        }
    }

    /// The configured (pre-debugger-adjustment) timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute one benchmark to completion or timeout.
    ///
    /// Fails with [`ExecuteError::ExecutionTimedOut`] when the bounded wait
    /// elapses first. The worker thread is *not* terminated in that case:
    /// it is abandoned and keeps running until the workload returns or the
    /// process exits. Forced thread termination is unsafe, so the harness
    /// trades guaranteed worker shutdown for a reliable exit of its own.
    pub fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, ExecuteError> {
        let benchmark = request.benchmark.clone();
        let policy = wakelock::resolve(self.wake_lock_default, request.wake_lock_override, self.mode);

        let host_logger: Arc<dyn Logger> = if self.forward_output {
            request.logger.clone()
        } else {
            Arc::new(NoOpLogger)
        };
        let mut host = InProcessHost::new(host_logger, request.diagnoser.clone());

        let effective_timeout = self.effective_timeout();
        let needs_sta = request.workload.single_threaded_apartment();

        debug!(
            benchmark = %benchmark,
            timeout_secs = effective_timeout.as_secs(),
            wake_lock = ?policy,
            "starting isolated benchmark run"
        );

        let (outcome_tx, outcome_rx) = mpsc::channel::<WorkerOutcome>();
        let worker = thread::Builder::new()
            .name(format!("benchhost-worker: {benchmark}"))
            .spawn(move || {
                // Held for the whole run; only takes effect on Windows.
                let _apartment = if needs_sta {
                    platform::enter_single_threaded_apartment()
                } else {
                    None
                };

                let control = platform::native();
                let exit_code = runner::run_isolated(&control, &request, policy, &mut host);

                // The supervisor may have stopped listening; that is fine.
                let _ = outcome_tx.send(WorkerOutcome {
                    exit_code,
                    run_results: host.take_run_results(),
                });
            })
            .map_err(|source| ExecuteError::WorkerSpawn {
                benchmark: benchmark.clone(),
                source,
            })?;

        match outcome_rx.recv_timeout(effective_timeout) {
            Ok(outcome) => {
                let _ = worker.join();
                debug!(
                    benchmark = %benchmark,
                    exit_code = outcome.exit_code,
                    measurements = outcome.run_results.len(),
                    "benchmark run finished"
                );
                Ok(ExecutionResult::from_run_results(
                    outcome.run_results,
                    outcome.exit_code,
                ))
            }
            Err(RecvTimeoutError::Timeout) => {
                // Dropping the JoinHandle detaches the worker; it keeps
                // running in the background as an orphan. Rust threads
                // never block process exit, so the harness still
                // terminates cleanly.
                drop(worker);
                error!(
                    benchmark = %benchmark,
                    timeout_secs = effective_timeout.as_secs(),
                    "benchmark timed out; worker thread abandoned"
                );
                Err(ExecuteError::ExecutionTimedOut {
                    benchmark,
                    timeout: effective_timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                // Worker ended without reporting, i.e. the plumbing itself
                // gave out before the outcome was sent.
                let _ = worker.join();
                warn!(benchmark = %benchmark, "worker finished without reporting an outcome");
                Ok(ExecutionResult::from_run_results(
                    RunResults::default(),
                    DEFAULT_EXIT_CODE,
                ))
            }
        }
    }

    /// The timeout actually applied to the bounded wait.
    ///
    /// With an interactive debugger attached the bound is effectively
    /// removed (a day) so a developer can step through the workload.
    fn effective_timeout(&self) -> Duration {
        if platform::debugger_attached() {
            UNDER_DEBUGGER_TIMEOUT
        } else {
            self.timeout
        }
    }
}
