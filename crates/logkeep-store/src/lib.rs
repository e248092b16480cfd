//! logkeep Store - Rotating per-category log files with cleanup and upload
//!
//! Files live under `<root>/logs/<category>/`. The structured category has one
//! active file per stream (`log-<name>.log`) that is sealed by renaming; the raw
//! category gets one file per write. The filesystem is the only shared state;
//! an in-process lock per path serializes every local mutation.

mod entry;
mod locks;
pub mod naming;
mod pipeline;
mod queue;
mod report;
mod rotation;
mod scheduler;
mod store;
#[cfg(test)]
mod test_support;

pub use entry::{EntrySerializer, JsonEntry, LogEntry, RawBody, RawEntry, WriteContext};
pub use locks::{LockRegistry, PathLock};
pub use naming::{LogFile, NameFilter};
pub use pipeline::{CleanupReport, Pipeline, PrepareOutcome, UploadReport};
pub use queue::{LocalExecutor, Ticket, WorkQueue};
pub use report::{FaultReporter, TracingReporter};
pub use rotation::RotationPolicy;
pub use scheduler::UploadScheduler;
pub use store::{LogStore, UploadSummary};

pub use logkeep_core::{Category, Error, Result, StoreConfig};
pub use logkeep_upload::Uploader;
