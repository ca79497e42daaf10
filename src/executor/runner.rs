//! Worker-thread body for one isolated run.
//!
//! Executes the workload synchronously inside the thread the supervisor
//! started. Nothing unwinds across the thread boundary: workload failures
//! and panics alike are caught here, logged, and folded into the exit code.

use super::elevation::ElevationGuard;
use super::request::{ExecutionRequest, DEFAULT_EXIT_CODE};
use crate::host::ExecutionHost;
use crate::log_error;
use crate::platform::ResourceControl;
use crate::wakelock::{WakeLock, WakeLockPolicy};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run the workload with elevated scheduling state and an optional wake
/// lock, both scoped to this call. Returns the exit code.
pub(crate) fn run_isolated(
    control: &dyn ResourceControl,
    request: &ExecutionRequest,
    policy: WakeLockPolicy,
    host: &mut dyn ExecutionHost,
) -> i32 {
    let _elevation = ElevationGuard::acquire(control, request.logger.clone(), request.affinity);
    let _wake_lock = WakeLock::request(
        policy,
        &format!("benchhost running benchmark '{}'", request.benchmark),
        &request.logger,
    );

    let outcome = catch_unwind(AssertUnwindSafe(|| request.workload.run(host)));

    match outcome {
        Ok(Ok(())) => 0,
        Ok(Err(e)) => {
            log_error!(
                request.logger,
                "// ! isolated runner: benchmark '{}' failed: {e}",
                request.benchmark
            );
            DEFAULT_EXIT_CODE
        }
        Err(panic) => {
            log_error!(
                request.logger,
                "// ! isolated runner: benchmark '{}' panicked: {}",
                request.benchmark,
                panic_message(panic.as_ref())
            );
            DEFAULT_EXIT_CODE
        }
    }
    // Wake lock released, then elevation restored, as both guards drop.
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}
