//! Upload triggers: one-shot and periodic runs keyed by tag

use crate::store::LogStore;
use logkeep_core::{LOG_UPLOAD_TAG, ONE_TIME_LOG_UPLOAD, PERIODIC_LOG_UPLOAD};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

struct ScheduledJob {
    /// Group tag, cancelled together
    group: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledJob {
    fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Schedules upload runs against a store.
///
/// Each run executes in its own task. Cancelling stops future runs only;
/// a run already in progress finishes.
pub struct UploadScheduler {
    store: Arc<LogStore>,
    jobs: Mutex<HashMap<&'static str, ScheduledJob>>,
}

impl UploadScheduler {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self {
            store,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Run an upload now, replacing any one-shot that has not finished
    pub fn schedule_upload(&self) {
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            let run = tokio::spawn(upload_once(store));
            let _ = run.await;
        });

        let previous = self.jobs.lock().insert(
            ONE_TIME_LOG_UPLOAD,
            ScheduledJob {
                group: LOG_UPLOAD_TAG,
                handle,
            },
        );
        if let Some(previous) = previous {
            previous.handle.abort();
        }
        info!("[SCHEDULER] Scheduled one-time upload");
    }

    /// Upload every `interval`, starting now. Keeps an existing periodic
    /// schedule; returns false in that case.
    pub fn schedule_periodic_upload(&self, every: Duration) -> bool {
        let mut jobs = self.jobs.lock();
        if jobs.get(PERIODIC_LOG_UPLOAD).is_some_and(ScheduledJob::is_active) {
            debug!("[SCHEDULER] Periodic upload already scheduled, keeping it");
            return false;
        }

        // interval() panics on a zero period
        let every = every.max(Duration::from_millis(1));
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                // Awaited so runs never overlap, spawned so abort leaves it running
                let run = tokio::spawn(upload_once(Arc::clone(&store)));
                let _ = run.await;
            }
        });
        jobs.insert(
            PERIODIC_LOG_UPLOAD,
            ScheduledJob {
                group: LOG_UPLOAD_TAG,
                handle,
            },
        );
        info!("[SCHEDULER] Scheduled periodic upload every {:?}", every);
        true
    }

    /// Cancel every upload job. An upload already running is not interrupted.
    pub fn cancel_scheduled_uploads(&self) {
        let mut jobs = self.jobs.lock();
        let tags: Vec<&'static str> = jobs
            .iter()
            .filter(|(_, job)| job.group == LOG_UPLOAD_TAG)
            .map(|(tag, _)| *tag)
            .collect();
        for tag in tags {
            if let Some(job) = jobs.remove(tag) {
                job.handle.abort();
            }
        }
        info!("[SCHEDULER] Cancelled scheduled uploads");
    }

    /// Whether a job with this tag, or in this group, is still pending or running
    pub fn is_scheduled(&self, tag: &str) -> bool {
        self.jobs
            .lock()
            .iter()
            .any(|(name, job)| (*name == tag || job.group == tag) && job.is_active())
    }
}

impl Drop for UploadScheduler {
    fn drop(&mut self) {
        for job in self.jobs.get_mut().values() {
            job.handle.abort();
        }
    }
}

async fn upload_once(store: Arc<LogStore>) {
    match store.upload_logs().await {
        Ok(summary) => debug!("[SCHEDULER] Upload run done, {} uploaded", summary.uploaded()),
        Err(e) => warn!("[SCHEDULER] Upload run failed, will retry on next trigger: {}", e),
    }
}
