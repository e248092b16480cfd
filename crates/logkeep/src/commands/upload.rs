//! Upload command - one prepare-and-upload run

use anyhow::Result;
use logkeep_core::{Category, StoreConfig};
use logkeep_store::UploadReport;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::output::{print_info, print_success_json};

#[derive(Serialize)]
struct CategoryJson {
    pending: usize,
    uploaded: usize,
    skipped: usize,
}

impl From<&UploadReport> for CategoryJson {
    fn from(report: &UploadReport) -> Self {
        CategoryJson {
            pending: report.pending,
            uploaded: report.uploaded,
            skipped: report.skipped,
        }
    }
}

pub async fn execute(config: &StoreConfig) -> Result<()> {
    if !config.upload.is_configured() {
        print_info("No upload_url configured; every upload will fail");
    }

    let store = super::open_store(config)?;
    let result = store.upload_logs().await;
    store.shutdown();
    let summary = result?;

    let data: BTreeMap<Category, CategoryJson> = summary
        .reports
        .iter()
        .map(|(category, report)| (*category, CategoryJson::from(report)))
        .collect();
    print_success_json(
        &format!("Uploaded {} file(s)", summary.uploaded()),
        Some(data),
    );
    Ok(())
}
