//! HTTP upload backend

use crate::error::{Result, UploadError};
use crate::url::UrlGenerator;
use crate::Uploader;
use async_trait::async_trait;
use logkeep_core::{Category, UPLOAD_FILE_EXT};
use std::path::Path;
use tracing::{debug, error, info, warn};

const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Uploads each file with a PUT to a freshly generated URL
pub struct HttpUploader<G> {
    generator: G,
    client: reqwest::Client,
}

impl<G: UrlGenerator> HttpUploader<G> {
    /// Create a new HTTP uploader
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            client: reqwest::Client::new(),
        }
    }

    /// Create with a custom HTTP client (useful for testing)
    pub fn with_client(generator: G, client: reqwest::Client) -> Self {
        Self { generator, client }
    }

    async fn read_body(&self, file: &Path, category: Category) -> Result<Vec<u8>> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|source| UploadError::ReadFailed {
                path: file.to_path_buf(),
                source,
            })?;

        Ok(match category {
            Category::Structured => json_lines(&bytes),
            Category::Raw => bytes,
        })
    }
}

/// Keep only complete lines that hold a JSON object. A trailing line
/// without a newline is an interrupted write and is dropped.
fn json_lines(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut dropped = 0usize;

    let mut lines = bytes.split(|b| *b == b'\n').peekable();
    while let Some(line) = lines.next() {
        if lines.peek().is_none() {
            if !line.is_empty() {
                warn!("[UPLOADER] JSON logs are incomplete. Skipping the last line...");
            }
            break;
        }
        match serde_json::from_slice::<serde_json::Value>(line) {
            Ok(value) if value.is_object() => {
                out.extend_from_slice(line);
                out.push(b'\n');
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!("[UPLOADER] Dropped {} invalid JSON line(s)", dropped);
    }
    out
}

#[async_trait]
impl<G: UrlGenerator> Uploader for HttpUploader<G> {
    async fn upload_log(&self, file: &Path, category: Category) -> Result<()> {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError::other(format!("Not a file: {}", file.display())))?;

        let endpoint = self
            .generator
            .generate_log_url(&format!("{}{}", file_name, UPLOAD_FILE_EXT), category)
            .await?;

        info!(
            "[UPLOADER] Upload URL: {}. Download URL: {}",
            endpoint.upload_url, endpoint.download_url
        );

        let body = self.read_body(file, category).await?;
        info!(
            "[UPLOADER] File {} ({} bytes) is uploading to {}",
            file_name,
            body.len(),
            endpoint.upload_url
        );

        let response = self
            .client
            .put(&endpoint.upload_url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(
                "[UPLOADER] File {} successfully uploaded to {}",
                file_name, endpoint.upload_url
            );
            Ok(())
        } else {
            let message = status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string();
            error!(
                "[UPLOADER] Cannot upload file {} to {}: HTTP {}",
                file_name,
                endpoint.upload_url,
                status.as_u16()
            );
            Err(UploadError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::TemplateUrlGenerator;
    use tempfile::TempDir;

    #[test]
    fn test_json_lines_filters_invalid() {
        let input = b"{\"a\":1}\nnot json\n[1,2]\n{\"b\":2}\n";
        let out = json_lines(input);
        assert_eq!(out, b"{\"a\":1}\n{\"b\":2}\n".to_vec());
    }

    #[test]
    fn test_json_lines_drops_unterminated_tail() {
        let input = b"{\"a\":1}\n{\"b\":";
        assert_eq!(json_lines(input), b"{\"a\":1}\n".to_vec());
    }

    #[test]
    fn test_json_lines_empty() {
        assert!(json_lines(b"").is_empty());
    }

    #[tokio::test]
    async fn test_read_body_raw_is_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2024-01-01-00-00-00-000.log");
        std::fs::write(&path, b"not json at all\n\x00\x01").unwrap();

        let uploader = HttpUploader::new(TemplateUrlGenerator::new("http://localhost", None));
        let body = uploader.read_body(&path, Category::Raw).await.unwrap();
        assert_eq!(body, b"not json at all\n\x00\x01".to_vec());
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let uploader = HttpUploader::new(TemplateUrlGenerator::new("http://localhost", None));
        let result = uploader
            .upload_log(Path::new("/nonexistent/log-main.log.1"), Category::Structured)
            .await;
        assert!(matches!(result, Err(UploadError::ReadFailed { .. })));
    }
}
