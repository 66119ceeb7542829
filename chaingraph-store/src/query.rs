//! Parameterized graph queries and their structured results
//!
//! The engine issues a small, closed set of query shapes: upsert-key
//! lookups (ledger by sequence, transaction by external id, account by
//! key) and the per-ledger chain entry the chain resolver walks. Each
//! [`GraphQuery`] variant has a matching [`QueryResult`] shape; the typed
//! wrappers on [`crate::GraphStore`] enforce the pairing.

use chaingraph_core::NodeId;

/// A parameterized graph query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphQuery {
    /// Ledger node with this exact sequence number
    LedgerBySeq {
        /// Sequence to look up
        seq: u64,
    },
    /// Transaction node by external id, with its memo handle if any
    TransactionById {
        /// External transaction id
        id: String,
    },
    /// Account node by external account identifier
    AccountByKey {
        /// External account identifier
        key: String,
    },
    /// Chain-walk entry for one stored ledger node
    ChainEntry {
        /// The ledger node to describe
        ledger: NodeId,
    },
}

impl GraphQuery {
    /// Short name used in error reporting
    pub fn name(&self) -> &'static str {
        match self {
            GraphQuery::LedgerBySeq { .. } => "LedgerBySeq",
            GraphQuery::TransactionById { .. } => "TransactionById",
            GraphQuery::AccountByKey { .. } => "AccountByKey",
            GraphQuery::ChainEntry { .. } => "ChainEntry",
        }
    }
}

/// Structured result of a [`GraphQuery`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryResult {
    /// A bare node handle (ledger or account lookups)
    Node(Option<NodeId>),
    /// A transaction upsert-key hit
    Transaction(Option<TransactionHit>),
    /// A chain-walk entry
    ChainEntry(Option<ChainEntry>),
}

/// Result of a transaction upsert-key lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionHit {
    /// The existing transaction node
    pub node: NodeId,
    /// Its existing memo node, if one was written earlier
    pub memo: Option<NodeId>,
}

/// One step of the backward chain walk
///
/// Describes a stored ledger: its sequence, its `prev` ledger edge, and its
/// transaction entries ordered **descending by index** so the greatest
/// index comes first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainEntry {
    /// The ledger node described
    pub node: NodeId,
    /// Its sequence number
    pub seq: u64,
    /// The preceding stored ledger, if any
    pub prev: Option<NodeId>,
    /// Transaction entries, descending by index
    pub transactions: Vec<ChainTransaction>,
}

/// A transaction entry within a [`ChainEntry`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainTransaction {
    /// Transaction node handle
    pub node: NodeId,
    /// Ledger sequence the transaction belongs to
    pub seq: u64,
    /// Index within its ledger
    pub index: u32,
}
