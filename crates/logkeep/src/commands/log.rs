//! Log command - append one structured entry

use anyhow::{bail, Context, Result};
use logkeep_core::StoreConfig;
use logkeep_store::JsonEntry;

use crate::cli::LogArgs;
use crate::output::print_success_json;

pub async fn execute(config: &StoreConfig, args: LogArgs) -> Result<()> {
    let entry = build_entry(args)?;
    let message = entry.message().to_string();

    let store = super::open_store(config)?;
    store.log(entry).wait().await?;
    store.shutdown();

    print_success_json("Logged entry", Some(message));
    Ok(())
}

fn build_entry(args: LogArgs) -> Result<JsonEntry> {
    if let Some(data) = args.data {
        let value: serde_json::Value =
            serde_json::from_str(&data).context("--data is not valid JSON")?;
        if !value.is_object() {
            bail!("--data must be a JSON object");
        }
        return Ok(JsonEntry::from_value(&value)?);
    }

    if args.fields.is_empty() {
        bail!("Nothing to log: pass --field KEY=VALUE or --data '{{...}}'");
    }
    Ok(JsonEntry::from_fields(args.fields.into_iter().collect()))
}
