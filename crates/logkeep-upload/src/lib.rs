//! logkeep Upload Backends
//!
//! Moves sealed log files to a remote endpoint:
//! - HTTP PUT to generated URLs
//! - (Future: multipart object storage, etc.)

mod error;
mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod url;

pub use error::{Result, UploadError};
pub use http::HttpUploader;
pub use url::{LogUrl, TemplateUrlGenerator, UrlGenerator};

use async_trait::async_trait;
use logkeep_core::Category;
use std::path::Path;

/// Trait for upload backends
///
/// Failure must come back as `Err`; the upload sweep stops a category on the
/// first error and leaves the remaining files for the next run.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload one sealed file of the given category
    async fn upload_log(&self, file: &Path, category: Category) -> Result<()>;
}

/// Uploader that accepts nothing; used when no endpoint is configured
pub struct DisabledUploader;

#[async_trait]
impl Uploader for DisabledUploader {
    async fn upload_log(&self, _file: &Path, _category: Category) -> Result<()> {
        Err(UploadError::NotConfigured)
    }
}
