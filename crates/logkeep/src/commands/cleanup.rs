//! Cleanup command - enforce the size budget

use anyhow::Result;
use logkeep_core::{Category, StoreConfig};
use serde::Serialize;

use crate::output::{format_bytes, is_json_mode, print_json, print_success};

#[derive(Serialize)]
struct CleanupJson {
    category: Category,
    scanned: usize,
    total_size: u64,
    deleted: usize,
    freed: u64,
}

pub async fn execute(config: &StoreConfig, category: Option<Category>) -> Result<()> {
    let store = super::open_store(config)?;
    let categories = match category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };

    let mut results = Vec::new();
    for category in categories {
        let report = store.cleanup(category).wait().await?;
        results.push(CleanupJson {
            category,
            scanned: report.scanned,
            total_size: report.total_size,
            deleted: report.deleted,
            freed: report.freed,
        });
    }
    store.shutdown();

    if is_json_mode() {
        print_json(&results);
        return Ok(());
    }
    for r in &results {
        print_success(&format!(
            "{}: {} file(s), {} total, deleted {} ({} freed)",
            r.category,
            r.scanned,
            format_bytes(r.total_size),
            r.deleted,
            format_bytes(r.freed)
        ));
    }
    Ok(())
}
