//! Error types for the executor module.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to the caller of
/// [`crate::executor::InProcessExecutor::execute`].
///
/// Workload failures are not here: they are caught inside the worker thread
/// and reported through the exit code instead.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The worker did not finish within the effective timeout. Fatal and
    /// not retryable; the worker thread keeps running in the background.
    #[error(
        "benchmark '{benchmark}' takes too long to run (did not finish within {timeout:?}); \
         prefer an out-of-process execution strategy for long-running benchmarks"
    )]
    ExecutionTimedOut {
        /// Display name of the benchmark that overran.
        benchmark: String,
        /// The effective timeout that elapsed.
        timeout: Duration,
    },

    /// The OS refused to start the worker thread.
    #[error("failed to start worker thread for benchmark '{benchmark}': {source}")]
    WorkerSpawn {
        /// Display name of the benchmark.
        benchmark: String,
        #[source]
        source: io::Error,
    },
}
