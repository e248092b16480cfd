//! File pipelines: write, cleanup, upload preparation, upload, export
//!
//! Every local mutation of a path happens under that path's lock from the
//! shared [`LockRegistry`]. No lock is held across an uploader call.

mod cleanup;
mod export;
mod prepare;
mod upload;
mod write;

pub use cleanup::CleanupReport;
pub use prepare::PrepareOutcome;
pub use upload::UploadReport;

use crate::locks::LockRegistry;
use crate::report::FaultReporter;
use crate::rotation::RotationPolicy;
use logkeep_core::Error;
use std::sync::Arc;

/// Shared state for all file pipelines of one store
#[derive(Clone)]
pub struct Pipeline {
    locks: Arc<LockRegistry>,
    reporter: Arc<dyn FaultReporter>,
    policy: RotationPolicy,
}

impl Pipeline {
    pub fn new(
        locks: Arc<LockRegistry>,
        reporter: Arc<dyn FaultReporter>,
        policy: RotationPolicy,
    ) -> Self {
        Self {
            locks,
            reporter,
            policy,
        }
    }

    pub fn locks(&self) -> &Arc<LockRegistry> {
        &self.locks
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Hand an error to telemetry and give it back for propagation
    fn fault(&self, error: Error) -> Error {
        self.reporter.report(&error);
        error
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::test_support::RecordingReporter;

    pub fn pipeline() -> (Pipeline, Arc<RecordingReporter>) {
        pipeline_with(RotationPolicy::default())
    }

    pub fn pipeline_with(policy: RotationPolicy) -> (Pipeline, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::default());
        let pipeline = Pipeline::new(
            Arc::new(LockRegistry::new()),
            Arc::clone(&reporter) as Arc<dyn FaultReporter>,
            policy,
        );
        (pipeline, reporter)
    }
}
