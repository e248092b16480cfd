//! Append entries to the active file, rotating first when needed

use super::Pipeline;
use crate::entry::{LogEntry, WriteContext};
use crate::naming::LogFile;
use crate::rotation::{is_from_another_day, midnight};
use chrono::{DateTime, Local};
use logkeep_core::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

impl Pipeline {
    /// Append `entry` to `target`
    pub fn write(&self, target: &Path, entry: &LogEntry) -> Result<()> {
        self.write_at(target, entry, Local::now())
    }

    /// Append `entry` to `target` as if the current time were `now`.
    ///
    /// Failures are reported before being returned; callers are free to
    /// ignore the result.
    pub fn write_at(&self, target: &Path, entry: &LogEntry, now: DateTime<Local>) -> Result<()> {
        let lock = self.locks.acquire(target);
        let _guard = lock.lock();

        self.write_locked(target, entry, now)
            .map_err(|e| self.fault(e))
    }

    fn write_locked(&self, target: &Path, entry: &LogEntry, now: DateTime<Local>) -> Result<()> {
        if !target.exists() {
            ensure_parent_dir(target)?;
        } else if entry.category().rotates() {
            self.ensure_day_rotation(target, now);
            self.ensure_size_rotation(target);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(target)
            .map_err(|source| Error::WriteFailed {
                path: target.to_path_buf(),
                source,
            })?;

        let mut writer = BufWriter::new(file);
        let ctx = WriteContext {
            target,
            written_at: now,
        };
        entry
            .write_to(&ctx, &mut writer)
            .and_then(|_| writer.flush())
            .map_err(|source| Error::WriteFailed {
                path: target.to_path_buf(),
                source,
            })?;

        debug!("[LOG] Appended {} entry to {}", entry.category(), target.display());
        Ok(())
    }

    fn ensure_day_rotation(&self, active: &Path, now: DateTime<Local>) {
        let Some(file) = self.stat_active(active) else {
            return;
        };
        let modified = file.modified_local();
        if is_from_another_day(modified, now) {
            info!("[LOG] Day changed, rotating {}", active.display());
            self.seal(active, midnight(modified));
        }
    }

    fn ensure_size_rotation(&self, active: &Path) {
        // Fresh stat: day rotation may already have moved the file away
        let Some(file) = self.stat_active(active) else {
            return;
        };
        if file.size > self.policy.max_file_size {
            info!(
                "[LOG] {} is {} bytes (max {}), rotating",
                active.display(),
                file.size,
                self.policy.max_file_size
            );
            self.seal(active, file.modified_local());
        }
    }

    fn stat_active(&self, active: &Path) -> Option<LogFile> {
        match LogFile::stat(active) {
            Ok(file) => file,
            Err(e) => {
                warn!("[LOG] Cannot stat {}: {}", active.display(), e);
                None
            }
        }
    }

    /// Rename the active file to its archived name. The next append recreates
    /// the active name. A failed rename is reported and the write goes on into
    /// the old file.
    fn seal(&self, active: &Path, sealed_at: DateTime<Local>) {
        let mut dest = self.policy.rotated_path(active, sealed_at);
        if dest.exists() {
            dest = match self.policy.choose_free_path(active, sealed_at) {
                Ok(path) => path,
                Err(e) => {
                    self.reporter.report(&e);
                    return;
                }
            };
        }

        match fs::rename(active, &dest) {
            Ok(()) => debug!("[LOG] Sealed {} as {}", active.display(), dest.display()),
            Err(source) => self.reporter.report(&Error::RenameFailed {
                from: active.to_path_buf(),
                to: dest,
                source,
            }),
        }
    }
}

fn ensure_parent_dir(target: &Path) -> Result<()> {
    let Some(parent) = target.parent() else {
        return Ok(());
    };
    if let Err(source) = fs::create_dir_all(parent) {
        // Another writer may have created it in the meantime
        if !parent.is_dir() {
            return Err(Error::CreateDirFailed {
                path: parent.to_path_buf(),
                source,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{pipeline, pipeline_with};
    use crate::entry::{JsonEntry, RawEntry};
    use crate::naming::build_timestamped_name;
    use crate::rotation::RotationPolicy;
    use crate::test_support::{dir_names, new_log_file, read};
    use std::collections::BTreeMap;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn json(message: &str) -> LogEntry {
        let mut fields = BTreeMap::new();
        fields.insert("msg".to_string(), message.to_string());
        LogEntry::from(JsonEntry::from_fields(fields))
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let (pipeline, reporter) = pipeline();
        let target = dir.path().join("logs/structured/log-main.log");

        pipeline.write(&target, &json("hello")).unwrap();
        pipeline.write(&target, &json("again")).unwrap();

        assert_eq!(read(&target), "{\"msg\":\"hello\"}\n{\"msg\":\"again\"}\n");
        assert!(reporter.faults().is_empty());
    }

    #[test]
    fn test_day_rotation() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline();
        let two_days_ago = SystemTime::now() - Duration::from_secs(2 * 24 * 60 * 60);
        let active = new_log_file(dir.path(), "log-main.log", "old\n", Some(two_days_ago));
        let old = LogFile::stat(&active).unwrap().unwrap();

        pipeline.write_at(&active, &json("new"), Local::now()).unwrap();

        let archived = pipeline
            .policy()
            .rotated_path(&active, midnight(old.modified_local()));
        assert_eq!(dir_names(dir.path()).len(), 2);
        assert_eq!(read(&archived), "old\n");
        assert_eq!(read(&active), "{\"msg\":\"new\"}\n");
    }

    #[test]
    fn test_size_rotation() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline_with(RotationPolicy::new(10, ""));
        let content = "0123456789abcdef\n";
        let active = new_log_file(dir.path(), "log-main.log", content, None);
        let old = LogFile::stat(&active).unwrap().unwrap();

        // Same day as the last modification, so only size applies
        pipeline
            .write_at(&active, &json("new"), old.modified_local())
            .unwrap();

        let archived = pipeline.policy().rotated_path(&active, old.modified_local());
        assert_eq!(dir_names(dir.path()).len(), 2);
        assert_eq!(LogFile::stat(&archived).unwrap().unwrap().size, content.len() as u64);
        assert_eq!(read(&active), "{\"msg\":\"new\"}\n");
    }

    #[test]
    fn test_old_oversized_file_rotates_once() {
        let dir = TempDir::new().unwrap();
        let (pipeline, reporter) = pipeline_with(RotationPolicy::new(10, ""));
        let two_days_ago = SystemTime::now() - Duration::from_secs(2 * 24 * 60 * 60);
        let content = "0123456789abcdef\n";
        let active = new_log_file(dir.path(), "log-main.log", content, Some(two_days_ago));
        let old = LogFile::stat(&active).unwrap().unwrap();

        pipeline.write_at(&active, &json("new"), Local::now()).unwrap();

        // Day rotation moved it away, so the size check sees nothing to seal
        let archived = pipeline
            .policy()
            .rotated_path(&active, midnight(old.modified_local()));
        assert_eq!(dir_names(dir.path()).len(), 2);
        assert_eq!(read(&archived), content);
        assert_eq!(read(&active), "{\"msg\":\"new\"}\n");
        assert!(reporter.faults().is_empty());
    }

    #[test]
    fn test_small_file_not_rotated() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline_with(RotationPolicy::new(1024, ""));
        let active = new_log_file(dir.path(), "log-main.log", "x\n", None);
        let old = LogFile::stat(&active).unwrap().unwrap();

        pipeline
            .write_at(&active, &json("y"), old.modified_local())
            .unwrap();

        assert_eq!(dir_names(dir.path()), vec!["log-main.log"]);
        assert_eq!(read(&active), "x\n{\"msg\":\"y\"}\n");
    }

    #[test]
    fn test_rotation_never_overwrites_archive() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline_with(RotationPolicy::new(1, "-guest"));
        let active = new_log_file(dir.path(), "log-main.log", "second\n", None);
        let old = LogFile::stat(&active).unwrap().unwrap();
        let taken = pipeline.policy().rotated_path(&active, old.modified_local());
        std::fs::write(&taken, "first\n").unwrap();

        pipeline
            .write_at(&active, &json("third"), old.modified_local())
            .unwrap();

        assert_eq!(read(&taken), "first\n");
        let indexed = pipeline.policy().indexed_path(&active, old.modified_local(), 0);
        assert_eq!(read(&indexed), "second\n");
        assert!(indexed.to_string_lossy().ends_with("_0-guest"));
    }

    #[test]
    fn test_raw_files_never_rotate() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline_with(RotationPolicy::new(1, ""));
        let yesterday = SystemTime::now() - Duration::from_secs(2 * 24 * 60 * 60);
        let name = build_timestamped_name(Local::now());
        let target = new_log_file(dir.path(), &name, "earlier\n", Some(yesterday));

        let entry = RawEntry::new("dump", Local::now(), Duration::ZERO).with_text("body");
        pipeline.write(&target, &LogEntry::from(entry)).unwrap();

        assert_eq!(dir_names(dir.path()), vec![name]);
        assert!(read(&target).starts_with("earlier\ndump\n"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let (pipeline, reporter) = pipeline();
        new_log_file(dir.path(), "structured", "not a dir", None);
        let target = dir.path().join("structured/log-main.log");

        let result = pipeline.write(&target, &json("lost"));

        assert!(matches!(result, Err(Error::CreateDirFailed { .. })));
        assert_eq!(reporter.faults().len(), 1);
    }
}
