//! Upload archived files oldest-first, deleting each on success

use super::Pipeline;
use crate::naming::{list_files, LogFile, NameFilter};
use logkeep_core::{Category, Error, Result};
use logkeep_upload::Uploader;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one category's upload sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Archived files found when the sweep started
    pub pending: usize,
    pub uploaded: usize,
    /// Empty or vanished files
    pub skipped: usize,
}

impl Pipeline {
    /// Upload every archived file under `dir`.
    ///
    /// Stops at the first uploader error: files before it stay deleted, the
    /// failing file and everything after it stay for the next run.
    pub async fn upload_pending(
        &self,
        category: Category,
        dir: &Path,
        uploader: &dyn Uploader,
    ) -> Result<UploadReport> {
        let files = list_files(dir, Some(NameFilter::Archived), true);
        let mut report = UploadReport {
            pending: files.len(),
            ..Default::default()
        };
        if files.is_empty() {
            debug!("[UPLOAD] No pending {} files", category);
            return Ok(report);
        }
        info!("[UPLOAD] {} pending {} file(s)", files.len(), category);

        for file in &files {
            let current = match self.stat_locked(&file.path).await {
                Ok(Some(current)) if current.size > 0 => current,
                Ok(Some(_)) => {
                    info!("[UPLOAD] Skipping empty {}", file.path.display());
                    report.skipped += 1;
                    continue;
                }
                Ok(None) => {
                    debug!("[UPLOAD] {} vanished before upload", file.path.display());
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!("[UPLOAD] Cannot stat {}: {}", file.path.display(), e);
                    report.skipped += 1;
                    continue;
                }
            };

            if let Err(e) = uploader.upload_log(&current.path, category).await {
                return Err(self.fault(Error::UploadFailed {
                    file: current.path.clone(),
                    category,
                    message: e.to_string(),
                }));
            }
            report.uploaded += 1;
            debug!("[UPLOAD] Uploaded {} ({} bytes)", current.name(), current.size);

            if let Err(source) = fs::remove_file(&current.path) {
                warn!("[UPLOAD] Uploaded but cannot delete {}", current.path.display());
                self.reporter.report(&Error::DeleteFailed {
                    path: current.path.clone(),
                    source,
                });
            }
        }

        info!(
            "[UPLOAD] {}: uploaded {}, skipped {}",
            category, report.uploaded, report.skipped
        );
        Ok(report)
    }

    /// Stat under the path's lock. A writer may still be appending to a fresh
    /// raw file, so the wait happens on the blocking pool.
    async fn stat_locked(&self, path: &Path) -> io::Result<Option<LogFile>> {
        let locks = Arc::clone(&self.locks);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || locks.with_lock(&path, || LogFile::stat(&path)))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }
}
