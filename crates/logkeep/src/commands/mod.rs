//! Command implementations

pub mod cleanup;
pub mod export;
pub mod list;
pub mod log;
pub mod prepare;
pub mod raw;
pub mod upload;
pub mod watch;

use anyhow::{Context, Result};
use logkeep_core::{StoreConfig, CONFIG_FILES};
use logkeep_store::{FaultReporter, LogStore, TracingReporter};
use logkeep_upload::{DisabledUploader, HttpUploader, TemplateUrlGenerator, Uploader};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Load the config from `path`, else from the current directory, else defaults
pub fn load_config(path: Option<&Path>) -> Result<StoreConfig> {
    if let Some(path) = path {
        return StoreConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    if CONFIG_FILES.iter().any(|name| cwd.join(name).exists()) {
        let (config, path) = StoreConfig::find_and_load(&cwd)?;
        debug!("Loaded config from {}", path.display());
        return Ok(config);
    }

    debug!("No config file found, using defaults");
    Ok(StoreConfig::default())
}

/// Uploader for the configured endpoint, or one that refuses every upload
pub fn build_uploader(config: &StoreConfig) -> Arc<dyn Uploader> {
    match &config.upload.upload_url {
        Some(upload_url) => Arc::new(HttpUploader::new(TemplateUrlGenerator::new(
            upload_url.clone(),
            config.upload.download_url.clone(),
        ))),
        None => Arc::new(DisabledUploader),
    }
}

pub fn open_store(config: &StoreConfig) -> Result<Arc<LogStore>> {
    let reporter: Arc<dyn FaultReporter> = Arc::new(TracingReporter);
    let store = LogStore::new(config.clone(), build_uploader(config), reporter)
        .context("Failed to open log store")?;
    Ok(Arc::new(store))
}
