//! Form configuration store abstraction.
//!
//! The [`FormStore`] trait is the boundary between the chat pipeline and
//! whatever keeps form configurations. Documents are keyed by their
//! `formId`, which doubles as the partition key, so every read is a point
//! lookup.
//!
//! Two backends are provided:
//! - [`SqliteFormStore`] — SQLite via `sqlx`; the table plays the role of a
//!   partitioned collection.
//! - [`InMemoryFormStore`] — a `HashMap` behind a lock, for tests and
//!   embedding.
//!
//! Implementations must be `Send + Sync`; a single instance is shared by
//! every request for the lifetime of the process.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

pub use memory::InMemoryFormStore;
pub use sqlite::SqliteFormStore;

#[async_trait]
pub trait FormStore: Send + Sync {
    /// Provision the database and collection if they do not exist yet.
    ///
    /// Calling this more than once must succeed without creating anything
    /// new. Any other failure is [`StoreError::Provisioning`].
    async fn ensure_ready(&self) -> Result<(), StoreError>;

    /// Fetch the configuration document stored under `form_id`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] when no document exists for the id.
    /// - [`StoreError::Unavailable`] on transport or decoding failures.
    async fn read(&self, form_id: &str) -> Result<Value, StoreError>;
}
