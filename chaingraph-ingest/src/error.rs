//! Error types for the ingestion engine

use thiserror::Error;

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors that can occur while ingesting ledgers into the graph
#[derive(Error, Debug)]
pub enum IngestError {
    /// Store error wrapper
    #[error("Store error: {0}")]
    Store(#[from] chaingraph_store::StoreError),

    /// Core record error wrapper
    #[error("Record error: {0}")]
    Record(#[from] chaingraph_core::Error),

    /// Ledger source read failure
    #[error("Ledger source error: {0}")]
    Source(String),

    /// A push finished without yielding the identity the writer needs
    #[error("Push returned no identity for {0}")]
    MissingIdentity(&'static str),
}

impl IngestError {
    /// Create a ledger source error
    pub fn source(msg: impl Into<String>) -> Self {
        IngestError::Source(msg.into())
    }
}
