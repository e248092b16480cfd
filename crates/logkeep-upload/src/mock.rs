//! Mock implementations for testing

use crate::error::{Result, UploadError};
use crate::Uploader;
use async_trait::async_trait;
use logkeep_core::Category;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One recorded upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedLog {
    pub file_name: String,
    pub category: Category,
    pub content: Vec<u8>,
}

/// A mock uploader for testing that records every uploaded file
#[derive(Default)]
pub struct MockUploader {
    /// Files that have been uploaded, in order
    uploads: Arc<Mutex<Vec<UploadedLog>>>,
    /// Number of upload calls, failed ones included
    call_count: AtomicUsize,
    /// Fail every call
    should_fail: bool,
    /// Fail calls for files with this name
    fail_on: Option<String>,
}

impl MockUploader {
    /// Create a new mock uploader
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock uploader that always fails
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Create a mock uploader that fails only for the named file
    pub fn failing_on(file_name: impl Into<String>) -> Self {
        Self {
            fail_on: Some(file_name.into()),
            ..Default::default()
        }
    }

    /// Get the number of times upload was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get all successful uploads
    pub async fn uploads(&self) -> Vec<UploadedLog> {
        self.uploads.lock().await.clone()
    }

    /// Names of successfully uploaded files, in upload order
    pub async fn uploaded_names(&self) -> Vec<String> {
        self.uploads
            .lock()
            .await
            .iter()
            .map(|u| u.file_name.clone())
            .collect()
    }

    /// Check if a file with this name was uploaded
    pub async fn was_uploaded(&self, file_name: &str) -> bool {
        self.uploads
            .lock()
            .await
            .iter()
            .any(|u| u.file_name == file_name)
    }
}

fn file_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl Uploader for MockUploader {
    async fn upload_log(&self, file: &Path, category: Category) -> Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let name = file_name(file);
        if self.should_fail || self.fail_on.as_deref() == Some(name.as_str()) {
            return Err(UploadError::other(format!("Mock failure for {}", name)));
        }

        let content = tokio::fs::read(file)
            .await
            .map_err(|source| UploadError::ReadFailed {
                path: PathBuf::from(file),
                source,
            })?;

        self.uploads.lock().await.push(UploadedLog {
            file_name: name,
            category,
            content,
        });
        Ok(())
    }
}
