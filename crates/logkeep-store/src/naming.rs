//! File naming and directory listing
//!
//! Every name here is a pure function of its inputs, so suffixes produced by
//! independent components stay comparable. They collide only when two files
//! are sealed within the same millisecond.

use chrono::{DateTime, Local};
use logkeep_core::{
    Category, LOG_FILE_NAME_DATE_TIME_FMT, LOG_FILE_NAME_PREFIX, LOG_FILE_NAME_SUFFIX,
    ROTATION_SEPARATOR,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Name of the always-current file of a stream.
///
/// Raw entries have no long-lived file, so their "active" name is the
/// timestamped name of the write logged at `now`.
pub fn build_active_name(category: Category, log_name: &str, now: DateTime<Local>) -> String {
    match category {
        Category::Structured => build_stream_name(log_name),
        Category::Raw => build_timestamped_name(now),
    }
}

/// `log-<log_name>.log`
pub fn build_stream_name(log_name: &str) -> String {
    format!("{}{}{}", LOG_FILE_NAME_PREFIX, log_name, LOG_FILE_NAME_SUFFIX)
}

/// Fixed-width, lexically sortable `yyyy-MM-dd-HH-mm-ss-SSS.log`
pub fn build_timestamped_name(timestamp: DateTime<Local>) -> String {
    format!(
        "{}{}",
        timestamp.format(LOG_FILE_NAME_DATE_TIME_FMT),
        LOG_FILE_NAME_SUFFIX
    )
}

/// `.yyyy-MM-dd-HH-mm-ss-SSS`, appended when a file is sealed
pub fn rotation_suffix(timestamp: DateTime<Local>) -> String {
    format!(
        "{}{}",
        ROTATION_SEPARATOR,
        timestamp.format(LOG_FILE_NAME_DATE_TIME_FMT)
    )
}

/// Convert a filesystem timestamp to local time
pub fn to_local(time: SystemTime) -> DateTime<Local> {
    DateTime::<Local>::from(time)
}

/// Whether a bare file name is an active stream name (no rotation suffix)
pub fn is_active_name(name: &str) -> bool {
    name.starts_with(LOG_FILE_NAME_PREFIX) && name.ends_with(LOG_FILE_NAME_SUFFIX)
}

/// Accepts active files; directories always pass
pub fn is_active(path: &Path) -> bool {
    path.is_dir() || file_name(path).is_some_and(is_active_name)
}

/// Accepts archived files; directories always pass
pub fn is_archived(path: &Path) -> bool {
    path.is_dir() || !file_name(path).is_some_and(is_active_name)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Partition used when listing a category directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFilter {
    Active,
    Archived,
}

impl NameFilter {
    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            NameFilter::Active => is_active(path),
            NameFilter::Archived => is_archived(path),
        }
    }
}

/// A file on disk with the metadata read while listing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

impl LogFile {
    /// Stat a path; `None` if it is gone or not a regular file
    pub fn stat(path: &Path) -> io::Result<Option<Self>> {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        if !metadata.is_file() {
            return Ok(None);
        }
        Ok(Some(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            modified: metadata.modified()?,
        }))
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn modified_local(&self) -> DateTime<Local> {
        to_local(self.modified)
    }
}

/// Recursively collect regular files under `dir`.
///
/// Directories are traversed but never returned. With `sorted`, the result is
/// ordered oldest-first by last-modified time (stable for ties).
pub fn list_files(dir: &Path, filter: Option<NameFilter>, sorted: bool) -> Vec<LogFile> {
    let mut files = Vec::new();
    collect_files(dir, filter, &mut files);

    if sorted {
        files.sort_by_key(|f| f.modified);
    }
    files
}

fn collect_files(dir: &Path, filter: Option<NameFilter>, files: &mut Vec<LogFile>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if let Some(filter) = filter {
            if !filter.accepts(&path) {
                continue;
            }
        }

        if path.is_dir() {
            collect_files(&path, filter, files);
            continue;
        }

        // Files may vanish between read_dir and stat; a later sweep will see the truth
        match LogFile::stat(&path) {
            Ok(Some(file)) => files.push(file),
            Ok(None) => {}
            Err(e) => debug!("Cannot stat {}: {}", path.display(), e),
        }
    }
}

/// Sum of file sizes; zero for no files
pub fn total_size(files: &[LogFile]) -> u64 {
    files.iter().map(|f| f.size).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_log_file, set_modified};
    use chrono::TimeZone;
    use std::time::Duration;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2014, 5, 1, 14, 15, 16)
            .single()
            .unwrap()
            + chrono::Duration::milliseconds(7)
    }

    #[test]
    fn test_build_stream_name() {
        assert_eq!(build_stream_name("main"), "log-main.log");
        assert_eq!(
            build_active_name(Category::Structured, "test", fixed_time()),
            "log-test.log"
        );
    }

    #[test]
    fn test_build_timestamped_name() {
        assert_eq!(build_timestamped_name(fixed_time()), "2014-05-01-14-15-16-007.log");
    }

    #[test]
    fn test_raw_active_name_is_timestamped() {
        let name = build_active_name(Category::Raw, "ignored", fixed_time());
        assert_eq!(name, "2014-05-01-14-15-16-007.log");
        assert!(!is_active_name(&name));
    }

    #[test]
    fn test_rotation_suffix() {
        assert_eq!(rotation_suffix(fixed_time()), ".2014-05-01-14-15-16-007");
    }

    #[test]
    fn test_names_sort_like_time() {
        let earlier = fixed_time();
        let later = earlier + chrono::Duration::milliseconds(1);
        assert!(build_timestamped_name(earlier) < build_timestamped_name(later));
        assert!(rotation_suffix(earlier) < rotation_suffix(later));
    }

    #[test]
    fn test_filters_partition_names() {
        let dir = TempDir::new().unwrap();
        let names = [
            "log-main.log",
            "log-main.log.2014-05-01-14-15-16-007",
            "log-main.log.2014-05-01-14-15-16-007_0",
            "log-main.log.2014-05-01-14-15-16-007_3-guest",
            "2014-05-01-14-15-16-007.log",
            "unrelated.txt",
        ];

        for name in names {
            let path = dir.path().join(name);
            assert_ne!(is_active(&path), is_archived(&path), "{}", name);
        }
        assert!(is_active(&dir.path().join("log-main.log")));
        assert!(is_archived(&dir.path().join("2014-05-01-14-15-16-007.log")));
    }

    #[test]
    fn test_directories_pass_both_filters() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("log-nested.log");
        fs::create_dir(&sub).unwrap();

        assert!(is_active(&sub));
        assert!(is_archived(&sub));
        assert!(is_active(dir.path()));
        assert!(is_archived(dir.path()));
    }

    #[test]
    fn test_list_files_recurses_and_skips_dirs() {
        let dir = TempDir::new().unwrap();
        new_log_file(dir.path(), "a.log", "a", None);
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        new_log_file(&nested, "b.log", "bb", None);

        let files = list_files(dir.path(), None, false);
        assert_eq!(files.len(), 2);
        assert_eq!(total_size(&files), 3);
        assert!(files.iter().all(|f| f.path.is_file()));
    }

    #[test]
    fn test_list_files_filtered() {
        let dir = TempDir::new().unwrap();
        new_log_file(dir.path(), "log-main.log", "active", None);
        new_log_file(dir.path(), "log-main.log.2014-05-01-14-15-16-007_0", "old", None);

        let active = list_files(dir.path(), Some(NameFilter::Active), false);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name(), "log-main.log");

        let archived = list_files(dir.path(), Some(NameFilter::Archived), false);
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].name(), "log-main.log.2014-05-01-14-15-16-007_0");
    }

    #[test]
    fn test_list_files_sorted_by_modified() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        new_log_file(dir.path(), "x", "1", Some(now - Duration::from_secs(10)));
        new_log_file(dir.path(), "y", "2", Some(now - Duration::from_secs(30)));
        let z = new_log_file(dir.path(), "z", "3", None);
        set_modified(&z, now - Duration::from_secs(20));

        let names: Vec<String> = list_files(dir.path(), None, true)
            .iter()
            .map(LogFile::name)
            .collect();
        assert_eq!(names, vec!["y", "z", "x"]);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let files = list_files(Path::new("/nonexistent/logs/structured"), None, true);
        assert!(files.is_empty());
        assert_eq!(total_size(&files), 0);
    }

    #[test]
    fn test_stat_missing_file() {
        assert!(LogFile::stat(Path::new("/nonexistent/file.log")).unwrap().is_none());
    }
}
