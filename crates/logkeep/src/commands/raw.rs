//! Raw command - store a dump as its own file

use anyhow::{Context, Result};
use chrono::Local;
use logkeep_core::StoreConfig;
use logkeep_store::RawEntry;
use std::io::Read;
use std::time::Duration;

use crate::cli::RawArgs;
use crate::output::print_success_json;

pub async fn execute(config: &StoreConfig, args: RawArgs) -> Result<()> {
    // A one-shot process has no meaningful uptime
    let entry = RawEntry::new(args.label, Local::now(), Duration::ZERO);
    let entry = if args.input == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read stdin")?;
        entry.with_bytes(bytes)
    } else {
        entry.with_file(&args.input)
    };

    let store = super::open_store(config)?;
    store.log(entry).wait().await?;
    store.shutdown();

    print_success_json::<()>("Stored raw dump", None);
    Ok(())
}
