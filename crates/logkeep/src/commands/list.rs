//! List command - show stored files

use anyhow::Result;
use logkeep_core::{Category, StoreConfig};

use crate::output::print_files;

pub async fn execute(config: &StoreConfig, category: Option<Category>) -> Result<()> {
    let store = super::open_store(config)?;
    let categories = match category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };

    let files: Vec<_> = categories
        .into_iter()
        .flat_map(|category| {
            store
                .list_files(category)
                .into_iter()
                .map(move |file| (category, file))
        })
        .collect();

    print_files(&files);
    store.shutdown();
    Ok(())
}
