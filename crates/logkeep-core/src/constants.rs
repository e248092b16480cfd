//! Constants and default values for logkeep

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default storage root directory name
pub const LOGKEEP_DIR: &str = "logkeep";

/// Directory under the storage root holding one subdirectory per category
pub const LOGS_DIR: &str = "logs";

/// Directory under the storage root receiving exports
pub const EXPORTS_DIR: &str = "exports";

/// Default logical stream name
pub const DEFAULT_LOG_NAME: &str = "main";

/// Prefix of every active file name
pub const LOG_FILE_NAME_PREFIX: &str = "log-";

/// Suffix of every active and timestamped file name
pub const LOG_FILE_NAME_SUFFIX: &str = ".log";

/// chrono format used for timestamped names and rotation suffixes (millisecond precision)
pub const LOG_FILE_NAME_DATE_TIME_FMT: &str = "%Y-%m-%d-%H-%M-%S-%3f";

/// Separator between a file name and its rotation suffix
pub const ROTATION_SEPARATOR: &str = ".";

/// Separator between a rotation suffix and a disambiguating index
pub const INDEX_SEPARATOR: &str = "_";

/// Extension appended to remote object names
pub const UPLOAD_FILE_EXT: &str = ".txt";

/// Default max size of a category directory in bytes (15MB)
pub const DEFAULT_MAX_DIR_SIZE: u64 = 15 * 1024 * 1024;

/// Default max size of an active file before size rotation (5MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Files younger than this are never removed by cleanup
pub const RETENTION_FLOOR: Duration = Duration::from_secs(24 * 60 * 60);

/// Max number of per-path locks kept in the lock registry
pub const MAX_LOCK_ENTRIES: usize = 1000;

/// Max index probed when choosing a free archived name
pub const MAX_NAME_ATTEMPTS: usize = 1000;

/// Default periodic upload interval in seconds (12 hours)
pub const DEFAULT_UPLOAD_INTERVAL_SECS: u64 = 12 * 60 * 60;

/// Unique work name of a one-shot upload
pub const ONE_TIME_LOG_UPLOAD: &str = "one-time-log-upload";

/// Unique work name of the periodic upload
pub const PERIODIC_LOG_UPLOAD: &str = "periodic-log-upload";

/// Tag shared by all scheduled upload work
pub const LOG_UPLOAD_TAG: &str = "log-upload-tag";

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "logkeep.toml",
    "logkeep.yaml",
    "logkeep.yml",
    "logkeep.json",
];

/// Get the default storage root
pub fn default_root_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(LOGKEEP_DIR))
        .unwrap_or_else(|| PathBuf::from(LOGKEEP_DIR))
}

/// Get the logs directory under a storage root
pub fn logs_dir(root: &Path) -> PathBuf {
    root.join(LOGS_DIR)
}

/// Get the exports directory under a storage root
pub fn exports_dir(root: &Path) -> PathBuf {
    root.join(EXPORTS_DIR)
}
