//! The graph store interface consumed by the indexing engine
//!
//! Three primitives, mirroring what the engine actually needs from a
//! backend: a parameterized query, an atomic mutation push, and connection
//! lifecycle. Everything else (query language, replication, mirrors) is the
//! backend's own business.

use crate::batch::{MutationBatch, PushResult};
use crate::error::{Result, StoreError};
use crate::query::{ChainEntry, GraphQuery, QueryResult, TransactionHit};
use async_trait::async_trait;
use chaingraph_core::NodeId;
use std::fmt::Debug;

/// A connection to a graph store
///
/// # Atomicity
///
/// `push` applies the whole batch or nothing. Scalar re-assertion
/// overwrites the previous value; edge re-assertion is idempotent (no
/// duplicate edges). Placeholder identities are assigned by the push and
/// returned in the [`PushResult`].
///
/// # Typed wrappers
///
/// The provided methods (`ledger_by_seq`, `transaction_by_id`, ...) wrap
/// [`GraphStore::query`] and enforce the query/result pairing, returning
/// [`StoreError::UnexpectedResult`] if a backend answers with the wrong
/// shape.
#[async_trait]
pub trait GraphStore: Debug + Send + Sync {
    /// Execute a parameterized query
    async fn query(&self, query: GraphQuery) -> Result<QueryResult>;

    /// Atomically apply a mutation batch
    async fn push(&self, batch: MutationBatch) -> Result<PushResult>;

    /// Release the connection
    ///
    /// Implementations with connection state must make subsequent queries
    /// and pushes fail with [`StoreError::Closed`]; the default is a no-op
    /// for backends with nothing to release.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Ledger node with the given sequence, if stored
    async fn ledger_by_seq(&self, seq: u64) -> Result<Option<NodeId>> {
        let query = GraphQuery::LedgerBySeq { seq };
        let name = query.name();
        match self.query(query).await? {
            QueryResult::Node(node) => Ok(node),
            _ => Err(StoreError::UnexpectedResult { query: name }),
        }
    }

    /// Transaction node by external id
    async fn transaction_by_id(&self, id: &str) -> Result<Option<TransactionHit>> {
        let query = GraphQuery::TransactionById { id: id.to_string() };
        let name = query.name();
        match self.query(query).await? {
            QueryResult::Transaction(hit) => Ok(hit),
            _ => Err(StoreError::UnexpectedResult { query: name }),
        }
    }

    /// Account node by external account identifier
    async fn account_by_key(&self, key: &str) -> Result<Option<NodeId>> {
        let query = GraphQuery::AccountByKey {
            key: key.to_string(),
        };
        let name = query.name();
        match self.query(query).await? {
            QueryResult::Node(node) => Ok(node),
            _ => Err(StoreError::UnexpectedResult { query: name }),
        }
    }

    /// Chain-walk entry for a stored ledger node
    async fn chain_entry(&self, ledger: NodeId) -> Result<Option<ChainEntry>> {
        let query = GraphQuery::ChainEntry { ledger };
        let name = query.name();
        match self.query(query).await? {
            QueryResult::ChainEntry(entry) => Ok(entry),
            _ => Err(StoreError::UnexpectedResult { query: name }),
        }
    }
}
