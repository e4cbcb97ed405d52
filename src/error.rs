//! Error taxonomy for the store and generation boundaries.
//!
//! Store failures are recoverable at request time: the chat pipeline treats
//! them as "no existing configuration". Provisioning failures are fatal at
//! startup. Generation failures are fatal to the single request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database or collection could not be created or opened.
    #[error("store provisioning failed: {0}")]
    Provisioning(String),

    #[error("form configuration not found: {0}")]
    NotFound(String),

    /// Transport, authentication or decoding failure during a read.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation provider is disabled")]
    Disabled,

    #[error("generation provider misconfigured: {0}")]
    Config(String),

    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid generation response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Request(e.to_string())
    }
}
