//! Shared fixtures for unit tests

use crate::report::FaultReporter;
use logkeep_core::Error;
use parking_lot::Mutex;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Create `dir/name` with `content`, optionally backdating its mtime
pub fn new_log_file(dir: &Path, name: &str, content: &str, modified: Option<SystemTime>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    if let Some(modified) = modified {
        set_modified(&path, modified);
    }
    path
}

pub fn set_modified(path: &Path, modified: SystemTime) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(modified).unwrap();
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Names of the entries directly inside `dir`, sorted
pub fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Reporter that keeps every fault for inspection
#[derive(Default)]
pub struct RecordingReporter {
    faults: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn faults(&self) -> Vec<String> {
        self.faults.lock().clone()
    }
}

impl FaultReporter for RecordingReporter {
    fn report(&self, error: &Error) {
        self.faults.lock().push(error.to_string());
    }
}
