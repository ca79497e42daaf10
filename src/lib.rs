//! BenchHost - controlled in-process execution host for micro-benchmarks
//!
//! This library runs a single measured workload in isolation on a dedicated
//! OS thread, under a hard wall-clock timeout, while temporarily elevating
//! scheduling resources (process priority, thread priority, CPU affinity)
//! to reduce measurement noise, and optionally holding an OS wake lock so
//! power-saving transitions cannot distort timing.
//!
//! # High-Level API
//!
//! ```ignore
//! use std::sync::Arc;
//! use benchhost::config::ExecutionSettings;
//! use benchhost::executor::{ExecutionRequest, InProcessExecutor};
//! use benchhost::log::TracingLogger;
//!
//! let settings = ExecutionSettings::default();
//! let executor = InProcessExecutor::new(&settings);
//!
//! let request = ExecutionRequest::new("Md5/Hash", Arc::new(my_workload))
//!     .with_logger(Arc::new(TracingLogger));
//!
//! let result = executor.execute(request)?;
//! println!("exit code {}", result.exit_code);
//! ```
//!
//! What to run and with which policy values is decided by the caller; this
//! crate only executes an already-resolved workload and manages the OS
//! environment around that execution.

pub mod config;
pub mod executor;
pub mod host;
pub mod log;
pub mod logging;
pub mod platform;
pub mod wakelock;

/// Version of the BenchHost library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
