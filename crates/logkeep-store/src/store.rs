//! The store facade: one storage root, one stream name, two queues

use crate::entry::LogEntry;
use crate::locks::LockRegistry;
use crate::naming::{build_active_name, build_stream_name, list_files, LogFile};
use crate::pipeline::{CleanupReport, Pipeline, PrepareOutcome, UploadReport};
use crate::queue::{LocalExecutor, Ticket, WorkQueue};
use crate::report::FaultReporter;
use crate::rotation::RotationPolicy;
use chrono::Local;
use logkeep_core::{Category, Error, Result, StoreConfig};
use logkeep_upload::Uploader;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, warn};

/// Result of a successful upload run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub prepared: PrepareOutcome,
    pub reports: BTreeMap<Category, UploadReport>,
}

impl UploadSummary {
    pub fn uploaded(&self) -> usize {
        self.reports.values().map(|r| r.uploaded).sum()
    }
}

/// Durable rotating log store.
///
/// Writes, cleanup, preparation and export run on the local queue (or inline
/// when `immediate` is set). Uploader calls run on a separate network queue so
/// a slow upload never holds up logging.
pub struct LogStore {
    config: StoreConfig,
    pipeline: Arc<Pipeline>,
    uploader: Arc<dyn Uploader>,
    local: LocalExecutor,
    network: WorkQueue,
}

impl LogStore {
    /// Must be called inside a tokio runtime
    pub fn new(
        config: StoreConfig,
        uploader: Arc<dyn Uploader>,
        reporter: Arc<dyn FaultReporter>,
    ) -> Result<Self> {
        config.validate()?;

        let pipeline = Pipeline::new(
            Arc::new(LockRegistry::new()),
            reporter,
            RotationPolicy::from_config(&config),
        );
        let local = if config.immediate {
            LocalExecutor::immediate()
        } else {
            LocalExecutor::queued("local")?
        };
        let network = WorkQueue::new("network")?;

        info!(
            "[LOG] Store at {} (stream {}, {})",
            config.logs_dir().display(),
            config.log_name,
            if local.is_immediate() { "immediate" } else { "queued" }
        );

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            uploader,
            local,
            network,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// `<root>/logs/<category>`
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.config.logs_dir().join(category.dir_name())
    }

    /// The structured stream's active file
    pub fn active_path(&self) -> PathBuf {
        self.category_dir(Category::Structured)
            .join(build_stream_name(&self.config.log_name))
    }

    /// Append an entry, then run cleanup on its category.
    ///
    /// The target is resolved now, so a raw entry is named after the moment it
    /// was logged rather than the moment the queue got to it.
    pub fn log(&self, entry: impl Into<LogEntry>) -> Ticket<()> {
        let entry = entry.into();
        let category = entry.category();
        let dir = self.category_dir(category);
        let name = build_active_name(category, &self.config.log_name, Local::now());
        let target = dir.join(name);
        let max_dir_size = self.config.max_dir_size;
        let pipeline = Arc::clone(&self.pipeline);

        self.local.run(move || {
            let written = pipeline.write(&target, &entry);
            let cleaned = pipeline.cleanup(category, &dir, SystemTime::now(), max_dir_size);
            written.and(cleaned.map(|_| ()))
        })
    }

    pub fn cleanup(&self, category: Category) -> Ticket<CleanupReport> {
        let dir = self.category_dir(category);
        let max_dir_size = self.config.max_dir_size;
        let pipeline = Arc::clone(&self.pipeline);

        self.local
            .run(move || pipeline.cleanup(category, &dir, SystemTime::now(), max_dir_size))
    }

    /// Seal the structured active file
    pub fn prepare_for_upload(&self) -> Ticket<PrepareOutcome> {
        let active = self.active_path();
        let pipeline = Arc::clone(&self.pipeline);

        self.local.run(move || pipeline.prepare_for_upload(&active))
    }

    /// Prepare, then upload both categories.
    ///
    /// Every category is attempted even if preparation or another category
    /// failed; any failure fails the run as a whole.
    pub async fn upload_logs(&self) -> Result<UploadSummary> {
        let prepared = self.prepare_for_upload().wait().await;
        if let Err(e) = &prepared {
            warn!("[UPLOAD] Preparation failed, uploading what is already sealed: {}", e);
        }

        let dirs: Vec<(Category, PathBuf)> = Category::ALL
            .iter()
            .map(|&category| (category, self.category_dir(category)))
            .collect();
        let pipeline = Arc::clone(&self.pipeline);
        let uploader = Arc::clone(&self.uploader);

        let uploads = self.network.submit(async move {
            let mut reports = BTreeMap::new();
            let mut failures = Vec::new();
            for (category, dir) in dirs {
                match pipeline.upload_pending(category, &dir, uploader.as_ref()).await {
                    Ok(report) => {
                        reports.insert(category, report);
                    }
                    Err(e) => failures.push(e),
                }
            }
            Ok((reports, failures))
        });
        let (reports, mut failures) = uploads.wait().await?;

        let prepared = match prepared {
            Ok(outcome) => outcome,
            Err(e) => {
                failures.insert(0, e);
                PrepareOutcome::Skipped
            }
        };

        match failures.len() {
            0 => {
                let summary = UploadSummary { prepared, reports };
                info!("[UPLOAD] Run finished, {} file(s) uploaded", summary.uploaded());
                Ok(summary)
            }
            1 => Err(failures.remove(0)),
            _ => Err(Error::upload_run(
                failures
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        }
    }

    /// Concatenate the structured category into `<export_dir>/log-<name>.log`
    pub fn export_logs(&self) -> Ticket<PathBuf> {
        let dir = self.category_dir(Category::Structured);
        let output = self
            .config
            .export_dir()
            .join(build_stream_name(&self.config.log_name));
        let pipeline = Arc::clone(&self.pipeline);

        self.local.run(move || {
            pipeline.export(&dir, &output)?;
            Ok(output)
        })
    }

    /// Files of a category, oldest-first
    pub fn list_files(&self, category: Category) -> Vec<LogFile> {
        list_files(&self.category_dir(category), None, true)
    }

    /// Stop accepting work. Already queued jobs still complete.
    pub fn shutdown(&self) {
        self.local.close();
        self.network.close();
        info!("[LOG] Store shut down");
    }
}
