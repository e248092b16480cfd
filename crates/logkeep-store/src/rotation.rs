//! Log rotation policy and sealed-name selection

use chrono::{DateTime, Local, TimeZone};
use logkeep_core::{Error, Result, StoreConfig, DEFAULT_MAX_FILE_SIZE, INDEX_SEPARATOR, MAX_NAME_ATTEMPTS};
use std::path::{Path, PathBuf};

use crate::naming::rotation_suffix;

/// Log rotation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size above which the active file is sealed before the next write
    pub max_file_size: u64,
    /// Identity postfix appended to every sealed name
    pub rotate_postfix: String,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            rotate_postfix: String::new(),
        }
    }
}

impl RotationPolicy {
    pub fn new(max_file_size: u64, rotate_postfix: impl Into<String>) -> Self {
        Self {
            max_file_size,
            rotate_postfix: rotate_postfix.into(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.max_file_size, config.rotate_postfix.clone())
    }

    /// `<name><suffix(sealed_at)><postfix>`, used by write-time rotation
    pub fn rotated_path(&self, active: &Path, sealed_at: DateTime<Local>) -> PathBuf {
        active.with_file_name(format!(
            "{}{}{}",
            file_name(active),
            rotation_suffix(sealed_at),
            self.rotate_postfix
        ))
    }

    /// `<name><suffix(sealed_at)>_<index><postfix>`, used by upload preparation
    pub fn indexed_path(&self, active: &Path, sealed_at: DateTime<Local>, index: usize) -> PathBuf {
        active.with_file_name(format!(
            "{}{}{}{}{}",
            file_name(active),
            rotation_suffix(sealed_at),
            INDEX_SEPARATOR,
            index,
            self.rotate_postfix
        ))
    }

    /// First indexed path that does not exist yet, probing `_0`, `_1`, ...
    pub fn choose_free_path(&self, active: &Path, sealed_at: DateTime<Local>) -> Result<PathBuf> {
        (0..=MAX_NAME_ATTEMPTS)
            .map(|index| self.indexed_path(active, sealed_at, index))
            .find(|candidate| !candidate.exists())
            .ok_or_else(|| Error::NameExhausted {
                path: active.to_path_buf(),
                attempts: MAX_NAME_ATTEMPTS,
            })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Local midnight at the start of `time`'s day
pub fn midnight(time: DateTime<Local>) -> DateTime<Local> {
    time.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or(time)
}

/// Whether `modified` falls on a different local calendar day than `now`
pub fn is_from_another_day(modified: DateTime<Local>, now: DateTime<Local>) -> bool {
    modified.date_naive() != now.date_naive()
}
