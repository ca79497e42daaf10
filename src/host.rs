//! Host abstraction between the execution core and the measured workload.
//!
//! The workload never talks to the executor directly. It receives a
//! [`ExecutionHost`] through which it announces lifecycle transitions,
//! reports run measurements, and writes output lines. The executor only
//! calls into the host and reads back the accumulated [`RunResults`]; how
//! the results are aggregated afterwards belongs to the caller.

use crate::log::Logger;
use crate::log_info;
use std::sync::Arc;

/// One measurement reported by the workload.
///
/// Opaque to the execution core: it is stored in arrival order and handed
/// back untouched inside [`RunResults`].
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Label chosen by the workload (e.g. iteration stage).
    pub label: String,
    /// Measured value in nanoseconds.
    pub nanoseconds: f64,
}

impl Measurement {
    /// Create a measurement record.
    pub fn new(label: impl Into<String>, nanoseconds: f64) -> Self {
        Self {
            label: label.into(),
            nanoseconds,
        }
    }
}

/// Ordered sequence of measurements collected during one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResults {
    measurements: Vec<Measurement>,
}

impl RunResults {
    /// Append a measurement, preserving arrival order.
    pub fn push(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    /// Iterate measurements in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }

    /// Number of collected measurements.
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// True when no measurements were collected.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

/// Opaque diagnoser handle.
///
/// The execution core passes it through to the host unchanged; whatever the
/// diagnoser does with lifecycle information is the caller's concern.
pub trait Diagnoser: Send + Sync {
    /// Diagnoser name, for log lines.
    fn name(&self) -> &str;
}

/// Interface the workload uses to talk back to the harness.
///
/// Implementations must be `Send`: the host is moved into the worker thread
/// for the duration of the run.
pub trait ExecutionHost: Send {
    /// Called by the workload when the measured section begins.
    fn workload_started(&mut self);

    /// Called by the workload once per reported measurement.
    fn record(&mut self, measurement: Measurement);

    /// Forwarded workload output. Whether this reaches the caller's logger
    /// depends on the output-forwarding setting.
    fn write_line(&mut self, line: &str);

    /// Called by the workload when the measured section ends.
    fn workload_finished(&mut self);

    /// Hand over everything collected so far, leaving the host empty.
    fn take_run_results(&mut self) -> RunResults;
}

/// Host used for in-process execution.
///
/// Accumulates measurements and forwards workload output to the supplied
/// logger sink (the executor substitutes a silent sink when forwarding is
/// disabled).
pub struct InProcessHost {
    logger: Arc<dyn Logger>,
    diagnoser: Option<Arc<dyn Diagnoser>>,
    results: RunResults,
}

impl InProcessHost {
    /// Create a host writing forwarded output to `logger`.
    pub fn new(logger: Arc<dyn Logger>, diagnoser: Option<Arc<dyn Diagnoser>>) -> Self {
        Self {
            logger,
            diagnoser,
            results: RunResults::default(),
        }
    }

    /// The diagnoser handle, if one was attached to the run.
    pub fn diagnoser(&self) -> Option<&Arc<dyn Diagnoser>> {
        self.diagnoser.as_ref()
    }
}

impl ExecutionHost for InProcessHost {
    fn workload_started(&mut self) {
        if let Some(diagnoser) = &self.diagnoser {
            log_info!(self.logger, "// diagnoser attached: {}", diagnoser.name());
        }
    }

    fn record(&mut self, measurement: Measurement) {
        self.results.push(measurement);
    }

    fn write_line(&mut self, line: &str) {
        log_info!(self.logger, "{line}");
    }

    fn workload_finished(&mut self) {}

    fn take_run_results(&mut self) -> RunResults {
        std::mem::take(&mut self.results)
    }
}
