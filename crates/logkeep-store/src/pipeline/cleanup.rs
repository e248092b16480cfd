//! Size-budget cleanup with a retention floor

use super::Pipeline;
use crate::naming::{list_files, total_size, LogFile};
use logkeep_core::{Category, Error, Result, RETENTION_FLOOR};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Outcome of one cleanup sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub scanned: usize,
    pub total_size: u64,
    pub deleted: usize,
    pub freed: u64,
}

impl Pipeline {
    /// Delete files older than the retention floor, but only while `dir`
    /// holds more than `max_size` bytes.
    pub fn cleanup(
        &self,
        category: Category,
        dir: &Path,
        now: SystemTime,
        max_size: u64,
    ) -> Result<CleanupReport> {
        if !dir.exists() {
            warn!("[CLEANUP] {} directory {} does not exist", category, dir.display());
            return Ok(CleanupReport::default());
        }
        if !dir.is_dir() {
            return Err(self.fault(Error::NotADirectory(dir.to_path_buf())));
        }

        let files = list_files(dir, None, false);
        if files.is_empty() {
            warn!("[CLEANUP] No {} files in {}", category, dir.display());
            return Ok(CleanupReport::default());
        }

        let mut report = CleanupReport {
            scanned: files.len(),
            total_size: total_size(&files),
            ..Default::default()
        };
        if report.total_size <= max_size {
            debug!(
                "[CLEANUP] {} uses {} of {} bytes, nothing to do",
                category, report.total_size, max_size
            );
            return Ok(report);
        }

        let horizon = now.checked_sub(RETENTION_FLOOR).unwrap_or(SystemTime::UNIX_EPOCH);
        for file in files.iter().filter(|f| f.modified < horizon) {
            if let Some(freed) = self.delete_expired(file, horizon) {
                report.deleted += 1;
                report.freed += freed;
            }
        }

        info!(
            "[CLEANUP] {}: {} bytes over budget, deleted {} file(s), freed {} bytes",
            category,
            report.total_size - max_size,
            report.deleted,
            report.freed
        );
        Ok(report)
    }

    /// Delete one file under its lock, re-checking its age first: a write may
    /// have touched it since the listing.
    fn delete_expired(&self, file: &LogFile, horizon: SystemTime) -> Option<u64> {
        self.locks.with_lock(&file.path, || {
            let current = match LogFile::stat(&file.path) {
                Ok(Some(current)) if current.modified < horizon => current,
                Ok(_) => return None,
                Err(e) => {
                    debug!("[CLEANUP] Cannot stat {}: {}", file.path.display(), e);
                    return None;
                }
            };

            match fs::remove_file(&current.path) {
                Ok(()) => {
                    debug!("[CLEANUP] Deleted {}", current.path.display());
                    Some(current.size)
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(source) => {
                    self.reporter.report(&Error::DeleteFailed {
                        path: current.path.clone(),
                        source,
                    });
                    None
                }
            }
        })
    }
}
