//! Fault reporting seam

use logkeep_core::Error;
use tracing::error;

/// Receives faults that should reach telemetry. Per-file issues never surface
/// to callers any other way.
pub trait FaultReporter: Send + Sync {
    fn report(&self, error: &Error);
}

/// Reporter that writes faults to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FaultReporter for TracingReporter {
    fn report(&self, error: &Error) {
        error!("[FAULT] {}", error);
    }
}
