//! Seal the active file so it can be uploaded while writes continue

use super::Pipeline;
use crate::naming::LogFile;
use logkeep_core::{Error, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// Missing or empty; nothing to seal
    Skipped,
    /// Renamed to this archived path
    Sealed(PathBuf),
}

impl Pipeline {
    /// Rename `active` to a fresh `_<index>` archived name and leave an empty
    /// active file behind.
    pub fn prepare_for_upload(&self, active: &Path) -> Result<PrepareOutcome> {
        let lock = self.locks.acquire(active);
        let _guard = lock.lock();

        self.prepare_locked(active).map_err(|e| self.fault(e))
    }

    fn prepare_locked(&self, active: &Path) -> Result<PrepareOutcome> {
        if let Some(parent) = active.parent() {
            if parent.exists() && !parent.is_dir() {
                return Err(Error::NotADirectory(parent.to_path_buf()));
            }
        }

        let file = match LogFile::stat(active)? {
            Some(file) if file.size > 0 => file,
            _ => {
                info!("[PREPARE] {} is missing or empty, nothing to seal", active.display());
                return Ok(PrepareOutcome::Skipped);
            }
        };

        let sealed = self
            .policy
            .choose_free_path(active, file.modified_local())?;
        fs::rename(active, &sealed).map_err(|source| Error::RenameFailed {
            from: active.to_path_buf(),
            to: sealed.clone(),
            source,
        })?;
        info!(
            "[PREPARE] Sealed {} ({} bytes) as {}",
            active.display(),
            file.size,
            sealed.display()
        );

        if !active.exists() {
            if let Err(source) = OpenOptions::new().create(true).append(true).open(active) {
                self.reporter.report(&Error::WriteFailed {
                    path: active.to_path_buf(),
                    source,
                });
            } else {
                debug!("[PREPARE] Recreated empty {}", active.display());
            }
        }

        Ok(PrepareOutcome::Sealed(sealed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::to_local;
    use crate::pipeline::testing::{pipeline, pipeline_with};
    use crate::rotation::RotationPolicy;
    use crate::test_support::{dir_names, new_log_file, read};
    use logkeep_core::MAX_NAME_ATTEMPTS;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_missing_or_empty_is_skipped() {
        let dir = TempDir::new().unwrap();
        let (pipeline, reporter) = pipeline();
        let active = dir.path().join("log-main.log");

        assert_eq!(pipeline.prepare_for_upload(&active).unwrap(), PrepareOutcome::Skipped);

        new_log_file(dir.path(), "log-main.log", "", None);
        assert_eq!(pipeline.prepare_for_upload(&active).unwrap(), PrepareOutcome::Skipped);
        assert_eq!(dir_names(dir.path()), vec!["log-main.log"]);
        assert!(reporter.faults().is_empty());
    }

    #[test]
    fn test_parent_not_a_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let (pipeline, reporter) = pipeline();
        let parent = new_log_file(dir.path(), "structured", "x", None);

        let result = pipeline.prepare_for_upload(&parent.join("log-main.log"));

        assert!(matches!(result, Err(Error::NotADirectory(p)) if p == parent));
        assert_eq!(reporter.faults().len(), 1);
        assert_eq!(read(&parent), "x");
    }

    #[test]
    fn test_seals_and_recreates_active() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline_with(RotationPolicy::new(1024, "-guest"));
        let modified = SystemTime::now() - Duration::from_secs(60);
        let active = new_log_file(dir.path(), "log-main.log", "{\"a\":1}\n", Some(modified));

        let outcome = pipeline.prepare_for_upload(&active).unwrap();

        let expected = pipeline.policy().indexed_path(&active, to_local(modified), 0);
        assert_eq!(outcome, PrepareOutcome::Sealed(expected.clone()));
        assert_eq!(read(&expected), "{\"a\":1}\n");
        assert_eq!(read(&active), "");
    }

    #[test]
    fn test_exhausted_names_leave_active_in_place() {
        let dir = TempDir::new().unwrap();
        let (pipeline, reporter) = pipeline();
        let modified = SystemTime::now() - Duration::from_secs(60);
        let active = new_log_file(dir.path(), "log-main.log", "keep\n", Some(modified));
        for index in 0..=MAX_NAME_ATTEMPTS {
            let taken = pipeline.policy().indexed_path(&active, to_local(modified), index);
            std::fs::write(taken, "").unwrap();
        }

        let result = pipeline.prepare_for_upload(&active);

        assert!(matches!(result, Err(Error::NameExhausted { .. })));
        assert_eq!(reporter.faults().len(), 1);
        assert_eq!(read(&active), "keep\n");
    }

    #[test]
    fn test_repeated_preparation_yields_unique_names() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline();
        let modified = SystemTime::now() - Duration::from_secs(60);
        let active = dir.path().join("log-main.log");

        let mut sealed = Vec::new();
        for i in 0..5 {
            // Same mtime each time so every seal shares one suffix
            new_log_file(dir.path(), "log-main.log", &format!("gen {}\n", i), Some(modified));
            match pipeline.prepare_for_upload(&active).unwrap() {
                PrepareOutcome::Sealed(path) => sealed.push(path),
                PrepareOutcome::Skipped => panic!("generation {} was skipped", i),
            }
        }

        for (i, path) in sealed.iter().enumerate() {
            assert!(path.to_string_lossy().ends_with(&format!("_{}", i)));
            assert_eq!(read(path), format!("gen {}\n", i));
        }
        assert_eq!(dir_names(dir.path()).len(), 6);
    }
}
