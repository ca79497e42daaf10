//! Logging abstraction layer.
//!
//! The execution host reports best-effort resource failures and caught
//! workload errors through a logger sink supplied by the caller, never by
//! propagating exceptions. This module defines that sink as a trait so the
//! host stays decoupled from any concrete logging backend:
//!
//! - [`Logger`] trait: the sink interface consumed by the executor
//! - [`TracingLogger`]: production adapter that delegates to `tracing`
//! - [`NoOpLogger`]: silent sink, used when workload output is not forwarded
//! - [`MemoryLogger`]: capturing sink for assertions in tests
//!
//! # Usage
//!
//! ```
//! use benchhost::log::{Logger, NoOpLogger};
//! use benchhost::log_warn;
//! use std::sync::Arc;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
//! log_warn!(logger, "failed to set process priority: {}", "EPERM");
//! ```

mod memory;
mod noop;
mod tracing_adapter;
mod r#trait;

pub use memory::MemoryLogger;
pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
