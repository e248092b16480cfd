//! Export command - concatenate structured logs

use anyhow::Result;
use logkeep_core::StoreConfig;

use crate::output::print_success_json;

pub async fn execute(config: &StoreConfig) -> Result<()> {
    let store = super::open_store(config)?;
    let output = store.export_logs().wait().await?;
    store.shutdown();

    let path = output.display().to_string();
    print_success_json(&format!("Exported to {}", path), Some(path.clone()));
    Ok(())
}
