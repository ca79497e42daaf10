//! Controlled benchmark execution.
//!
//! This module runs one measured workload in isolation under a hard
//! wall-clock timeout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     InProcessExecutor                        │
//! │  computes effective timeout, starts the worker thread,       │
//! │  bounded-waits, escalates overruns to a fatal error          │
//! ├──────────────────────────────────────────────────────────────┤
//! │                     worker thread (runner)                   │
//! │  ┌──────────────┐  ┌───────────────┐  ┌───────────────────┐  │
//! │  │ Elevation    │  │ Wake lock     │  │ Workload via      │  │
//! │  │ guard        │  │ (optional)    │  │ ExecutionHost     │  │
//! │  └──────────────┘  └───────────────┘  └───────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **One dedicated thread per run.** Isolation, not throughput: the
//!   calling thread blocks on a bounded wait, no pooling, no work stealing.
//!
//! - **Scoped acquisition.** Process priority, thread priority, affinity
//!   and the wake lock are acquired at the start of the worker scope and
//!   restored on every exit path, including caught failures.
//!
//! - **No forced termination.** A run that outlives its timeout is reported
//!   as fatal to the caller, but its thread is only abandoned, never
//!   killed; it keeps running in the background until the workload returns
//!   or the process exits.
//!
//! # Preconditions
//!
//! Priority, affinity and the OS wake-lock table are process-global mutable
//! state. The host assumes a single benchmark run in flight per process;
//! overlapping [`InProcessExecutor::execute`] calls corrupt each other's
//! before/after snapshots and are unsupported.

mod elevation;
mod error;
mod request;
mod runner;
mod supervisor;

pub use crate::host::ExecutionHost;
pub use elevation::{ElevationGuard, ResourceSnapshot};
pub use error::ExecuteError;
pub use request::{
    ExecutionMode, ExecutionRequest, ExecutionResult, Workload, WorkloadError, DEFAULT_EXIT_CODE,
};
pub use supervisor::InProcessExecutor;
