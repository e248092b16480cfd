//! Prepare command - seal the active file

use anyhow::Result;
use logkeep_core::StoreConfig;
use logkeep_store::PrepareOutcome;

use crate::output::{print_info, print_success_json};

pub async fn execute(config: &StoreConfig) -> Result<()> {
    let store = super::open_store(config)?;
    let outcome = store.prepare_for_upload().wait().await?;
    store.shutdown();

    match outcome {
        PrepareOutcome::Sealed(path) => {
            let path = path.display().to_string();
            print_success_json(&format!("Sealed {}", path), Some(path.clone()));
        }
        PrepareOutcome::Skipped => print_info("Active file is missing or empty, nothing to seal"),
    }
    Ok(())
}
