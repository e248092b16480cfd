//! Watch command - periodic uploads until Ctrl-C

use anyhow::{Context, Result};
use logkeep_core::StoreConfig;
use logkeep_store::UploadScheduler;
use std::time::Duration;
use tracing::info;

use crate::output::print_info;

pub async fn execute(config: &StoreConfig, interval: Option<Duration>) -> Result<()> {
    let every = interval.unwrap_or_else(|| config.upload_interval());
    let store = super::open_store(config)?;
    let scheduler = UploadScheduler::new(store.clone());

    scheduler.schedule_periodic_upload(every);
    print_info(&format!("Uploading every {:?}, press Ctrl-C to stop", every));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Stopping periodic uploads");
    scheduler.cancel_scheduled_uploads();
    store.shutdown();
    Ok(())
}
