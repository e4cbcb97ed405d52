//! SQLite-backed [`FormStore`].
//!
//! The SQLite file is the logical database and one table is the
//! collection. Each row holds a document's item key, its partition key and
//! the JSON body:
//!
//! ```text
//! CREATE TABLE <collection> (
//!     id            TEXT NOT NULL,
//!     partition_key TEXT NOT NULL,
//!     body          TEXT NOT NULL,
//!     PRIMARY KEY (partition_key, id)
//! )
//! ```
//!
//! Rows are written by the authoring side; this adapter only reads.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use super::FormStore;
use crate::config::StoreConfig;
use crate::db;
use crate::error::StoreError;

pub struct SqliteFormStore {
    pool: SqlitePool,
    collection: String,
}

impl SqliteFormStore {
    /// Open the database file, creating it when missing.
    ///
    /// The collection name must already be a validated identifier
    /// (see [`crate::config::validate`]); it is interpolated into SQL.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = db::connect(config).await.map_err(|e| {
            StoreError::Provisioning(format!(
                "failed to create or access database {}: {}",
                config.path.display(),
                e
            ))
        })?;

        Ok(Self {
            pool,
            collection: config.collection.clone(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Underlying pool, for authoring tools and tests that seed documents.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl FormStore for SqliteFormStore {
    async fn ensure_ready(&self) -> Result<(), StoreError> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT NOT NULL,
                partition_key TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (partition_key, id)
            )
            "#,
            self.collection
        );

        sqlx::query(&ddl).execute(&self.pool).await.map_err(|e| {
            StoreError::Provisioning(format!(
                "failed to create or access collection {}: {}",
                self.collection, e
            ))
        })?;

        Ok(())
    }

    async fn read(&self, form_id: &str) -> Result<Value, StoreError> {
        let sql = format!(
            "SELECT body FROM {} WHERE id = ? AND partition_key = ?",
            self.collection
        );

        let row = sqlx::query(&sql)
            .bind(form_id)
            .bind(form_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let row = match row {
            Some(row) => row,
            None => return Err(StoreError::NotFound(form_id.to_string())),
        };

        let body: String = row
            .try_get("body")
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            StoreError::Unavailable(format!("stored document {} is not valid JSON: {}", form_id, e))
        })
    }
}
