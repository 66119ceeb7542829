//! Error types for the store interface

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur talking to a graph store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend I/O failure (connection, timeout, server fault)
    #[error("Store I/O error: {0}")]
    Io(String),

    /// The store answered a query with a result of the wrong shape
    #[error("Unexpected result for {query} query")]
    UnexpectedResult {
        /// Which query was issued
        query: &'static str,
    },

    /// A push completed without assigning an identity to a placeholder
    #[error("Placeholder '{0}' was not assigned an identity by the push")]
    UnresolvedPlaceholder(String),

    /// A mutation referenced a node the store does not know
    #[error("Unknown node: {0}")]
    UnknownNode(chaingraph_core::NodeId),

    /// The connection has been closed
    #[error("Store connection is closed")]
    Closed,
}

impl StoreError {
    /// Create a backend I/O error
    pub fn io(msg: impl Into<String>) -> Self {
        StoreError::Io(msg.into())
    }

    /// Create an unresolved placeholder error
    pub fn unresolved_placeholder(name: impl Into<String>) -> Self {
        StoreError::UnresolvedPlaceholder(name.into())
    }
}
