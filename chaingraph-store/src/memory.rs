//! In-memory graph store
//!
//! A thread-safe, process-local [`GraphStore`] used by tests and embedded
//! runs. Data lives in a `HashMap` behind `Arc<RwLock>` for interior
//! mutability; `push` holds the write lock for the whole batch, which makes
//! each push atomic by construction.
//!
//! Beyond the trait, the store exposes introspection helpers (node counts,
//! scalar/edge readback) that tests use to assert on the materialized
//! graph.

use crate::batch::{MutationBatch, Object, PushResult, Triple};
use crate::error::{Result, StoreError};
use crate::query::{ChainEntry, ChainTransaction, GraphQuery, QueryResult, TransactionHit};
use crate::store::GraphStore;
use async_trait::async_trait;
use chaingraph_core::vocab::{node_type, pred};
use chaingraph_core::{NodeId, NodeRef, Value};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
struct NodeData {
    scalars: FxHashMap<String, Value>,
    edges: FxHashMap<String, Vec<NodeId>>,
}

#[derive(Default)]
struct Inner {
    nodes: FxHashMap<NodeId, NodeData>,
    /// Upsert-key index: (type tag, external key) -> node
    by_key: FxHashMap<(String, String), NodeId>,
    /// Ledger nodes by sequence
    ledgers_by_seq: FxHashMap<u64, NodeId>,
    next_id: u64,
    closed: bool,
}

impl Inner {
    fn assign_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    fn scalar(&self, node: NodeId, predicate: &str) -> Option<&Value> {
        self.nodes.get(&node)?.scalars.get(predicate)
    }

    fn first_edge(&self, node: NodeId, predicate: &str) -> Option<NodeId> {
        self.nodes
            .get(&node)?
            .edges
            .get(predicate)
            .and_then(|targets| targets.first().copied())
    }

    /// Refresh the secondary indexes for one node after a batch applied
    fn reindex(&mut self, node: NodeId) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        let Some(type_tag) = data.scalars.get(pred::TYPE).and_then(Value::as_str) else {
            return;
        };

        match type_tag {
            node_type::LEDGER => {
                if let Some(seq) = data.scalars.get(pred::SEQ).and_then(Value::as_u64) {
                    self.ledgers_by_seq.insert(seq, node);
                }
            }
            node_type::TRANSACTION | node_type::ACCOUNT => {
                if let Some(key) = data.scalars.get(pred::ID).and_then(Value::as_str) {
                    self.by_key
                        .insert((type_tag.to_string(), key.to_string()), node);
                }
            }
            _ => {}
        }
    }
}

/// Thread-safe in-memory graph store
#[derive(Clone, Default)]
pub struct MemoryGraphStore {
    inner: Arc<RwLock<Inner>>,
}

impl fmt::Debug for MemoryGraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MemoryGraphStore")
            .field("node_count", &inner.nodes.len())
            .field("ledger_count", &inner.ledgers_by_seq.len())
            .field("closed", &inner.closed)
            .finish()
    }
}

impl MemoryGraphStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// Number of nodes carrying the given type tag
    pub fn count_by_type(&self, type_tag: &str) -> usize {
        let inner = self.inner.read();
        inner
            .nodes
            .values()
            .filter(|data| {
                data.scalars
                    .get(pred::TYPE)
                    .and_then(Value::as_str)
                    .is_some_and(|t| t == type_tag)
            })
            .count()
    }

    /// Scalar value stored on a node, if any
    pub fn scalar(&self, node: NodeId, predicate: &str) -> Option<Value> {
        self.inner.read().scalar(node, predicate).cloned()
    }

    /// Edge targets stored on a node, in assertion order
    pub fn edge_targets(&self, node: NodeId, predicate: &str) -> Vec<NodeId> {
        self.inner
            .read()
            .nodes
            .get(&node)
            .and_then(|data| data.edges.get(predicate).cloned())
            .unwrap_or_default()
    }

    /// Upsert-key lookup without going through the query interface
    pub fn node_by_key(&self, type_tag: &str, key: &str) -> Option<NodeId> {
        self.inner
            .read()
            .by_key
            .get(&(type_tag.to_string(), key.to_string()))
            .copied()
    }

    fn resolve(
        subject: &NodeRef,
        assigned: &FxHashMap<String, NodeId>,
    ) -> Result<NodeId> {
        match subject {
            NodeRef::Id(id) => Ok(*id),
            NodeRef::Placeholder(name) => assigned
                .get(name)
                .copied()
                .ok_or_else(|| StoreError::unresolved_placeholder(name.clone())),
        }
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn query(&self, query: GraphQuery) -> Result<QueryResult> {
        let inner = self.inner.read();
        if inner.closed {
            return Err(StoreError::Closed);
        }

        let result = match query {
            GraphQuery::LedgerBySeq { seq } => {
                QueryResult::Node(inner.ledgers_by_seq.get(&seq).copied())
            }
            GraphQuery::TransactionById { id } => {
                let hit = inner
                    .by_key
                    .get(&(node_type::TRANSACTION.to_string(), id))
                    .copied()
                    .map(|node| TransactionHit {
                        node,
                        memo: inner.first_edge(node, pred::MEMO),
                    });
                QueryResult::Transaction(hit)
            }
            GraphQuery::AccountByKey { key } => QueryResult::Node(
                inner
                    .by_key
                    .get(&(node_type::ACCOUNT.to_string(), key))
                    .copied(),
            ),
            GraphQuery::ChainEntry { ledger } => {
                let entry = inner.nodes.get(&ledger).map(|data| {
                    let seq = data
                        .scalars
                        .get(pred::SEQ)
                        .and_then(Value::as_u64)
                        .unwrap_or_default();
                    let mut transactions: Vec<ChainTransaction> = data
                        .edges
                        .get(pred::TRANSACTIONS)
                        .map(|targets| {
                            targets
                                .iter()
                                .filter_map(|&tx| {
                                    Some(ChainTransaction {
                                        node: tx,
                                        seq: inner.scalar(tx, pred::SEQ)?.as_u64()?,
                                        index: inner.scalar(tx, pred::INDEX)?.as_u64()? as u32,
                                    })
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    transactions.sort_by(|a, b| b.index.cmp(&a.index));
                    ChainEntry {
                        node: ledger,
                        seq,
                        prev: inner.first_edge(ledger, pred::PREV),
                        transactions,
                    }
                });
                QueryResult::ChainEntry(entry)
            }
        };

        Ok(result)
    }

    async fn push(&self, batch: MutationBatch) -> Result<PushResult> {
        let mut inner = self.inner.write();
        if inner.closed {
            return Err(StoreError::Closed);
        }

        let triples = batch.into_triples();

        // Validate before mutating so a bad batch applies nothing.
        for triple in &triples {
            for node_ref in [Some(&triple.subject), triple_target(triple)]
                .into_iter()
                .flatten()
            {
                if let NodeRef::Id(id) = node_ref {
                    if !inner.nodes.contains_key(id) {
                        return Err(StoreError::UnknownNode(*id));
                    }
                }
            }
        }

        // Assign identities to placeholders in order of first appearance.
        let mut assigned: FxHashMap<String, NodeId> = FxHashMap::default();
        for triple in &triples {
            for node_ref in [Some(&triple.subject), triple_target(triple)]
                .into_iter()
                .flatten()
            {
                if let NodeRef::Placeholder(name) = node_ref {
                    if !assigned.contains_key(name) {
                        let id = inner.assign_id();
                        assigned.insert(name.clone(), id);
                        inner.nodes.insert(id, NodeData::default());
                    }
                }
            }
        }

        let mut touched: Vec<NodeId> = Vec::new();
        for triple in &triples {
            let subject = Self::resolve(&triple.subject, &assigned)?;
            touched.push(subject);
            let data = inner.nodes.entry(subject).or_default();
            match &triple.object {
                Object::Value(value) => {
                    data.scalars.insert(triple.predicate.clone(), value.clone());
                }
                Object::Node(target_ref) => {
                    let target = Self::resolve(target_ref, &assigned)?;
                    let targets = data.edges.entry(triple.predicate.clone()).or_default();
                    if !targets.contains(&target) {
                        targets.push(target);
                    }
                }
            }
        }

        for node in touched {
            inner.reindex(node);
        }

        Ok(PushResult::new(assigned))
    }

    async fn close(&self) -> Result<()> {
        self.inner.write().closed = true;
        Ok(())
    }
}

fn triple_target(triple: &Triple) -> Option<&NodeRef> {
    match &triple.object {
        Object::Node(target) => Some(target),
        Object::Value(_) => None,
    }
}
