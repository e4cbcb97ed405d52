use anyhow::{Context, Result};

use crate::config::Config;
use crate::store::{FormStore, SqliteFormStore};

/// Create the database file and form collection if they do not exist.
/// Safe to run repeatedly.
pub async fn run_provision(config: &Config) -> Result<()> {
    let store = SqliteFormStore::open(&config.store).await?;
    let result = store
        .ensure_ready()
        .await
        .with_context(|| format!("failed to provision collection {}", store.collection()));
    store.close().await;
    result
}
