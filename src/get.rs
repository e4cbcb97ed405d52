//! Form configuration lookup by `formId`.
//!
//! Backs the `designer-chat get` command: reads the stored document and
//! shows it exactly as the generation step would see it, with null-valued
//! fields pruned.

use anyhow::Result;
use serde_json::Value;

use crate::config::Config;
use crate::prune::prune;
use crate::store::{FormStore, SqliteFormStore};

/// Read and prune the configuration stored under `form_id`.
pub async fn get_form(config: &Config, form_id: &str) -> Result<Value> {
    let store = SqliteFormStore::open(&config.store).await?;
    let result = store.read(form_id).await;
    store.close().await;

    Ok(prune(&result?))
}

/// CLI entry point — calls get_form and prints to stdout.
pub async fn run_get(config: &Config, form_id: &str) -> Result<()> {
    let form = get_form(config, form_id).await?;

    println!("--- Form {} ---", form_id);
    println!("{}", serde_json::to_string_pretty(&form)?);

    Ok(())
}
