//! Upload endpoint generation

use crate::error::{Result, UploadError};
use async_trait::async_trait;
use logkeep_core::Category;

/// Where a single file goes. Generated fresh per file per attempt, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogUrl {
    /// URL that will be used for uploading
    pub upload_url: String,
    /// URL for downloading the uploaded file
    pub download_url: String,
}

/// Produces upload endpoints, e.g. by asking a backend to sign a URL
#[async_trait]
pub trait UrlGenerator: Send + Sync {
    async fn generate_log_url(&self, log_name: &str, category: Category) -> Result<LogUrl>;
}

/// Builds `<base>/<category>/<log_name>` for both upload and download
#[derive(Debug, Clone)]
pub struct TemplateUrlGenerator {
    upload_base: String,
    download_base: String,
}

impl TemplateUrlGenerator {
    pub fn new(upload_base: impl Into<String>, download_base: Option<String>) -> Self {
        let upload_base = upload_base.into();
        let download_base = download_base.unwrap_or_else(|| upload_base.clone());
        Self {
            upload_base: upload_base.trim_end_matches('/').to_string(),
            download_base: download_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl UrlGenerator for TemplateUrlGenerator {
    async fn generate_log_url(&self, log_name: &str, category: Category) -> Result<LogUrl> {
        if log_name.is_empty() || log_name.contains('/') {
            return Err(UploadError::url(format!("Invalid log name: {:?}", log_name)));
        }
        Ok(LogUrl {
            upload_url: format!("{}/{}/{}", self.upload_base, category, log_name),
            download_url: format!("{}/{}/{}", self.download_base, category, log_name),
        })
    }
}
