//! Mutation batch builder
//!
//! A [`MutationBatch`] accumulates triple assertions (subject, predicate,
//! value-or-node) to be pushed to the store as one atomic unit. Subjects and
//! edge targets are [`NodeRef`]s, so a batch can freely mix existing nodes
//! with placeholders whose durable identity is only assigned when the push
//! succeeds ([`PushResult::created`]).

use chaingraph_core::{NodeId, NodeRef, Value};
use rustc_hash::FxHashMap;

/// The object position of a triple: a scalar value or an edge target
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    /// Scalar value
    Value(Value),
    /// Directed edge to another node
    Node(NodeRef),
}

/// One triple assertion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Triple {
    /// Subject node
    pub subject: NodeRef,
    /// Predicate name (see `chaingraph_core::vocab::pred`)
    pub predicate: String,
    /// Scalar value or edge target
    pub object: Object,
}

/// An ordered batch of triple assertions, pushed atomically
///
/// Scalar re-assertion overwrites; edge re-assertion is idempotent. The
/// batch preserves assertion order, which the store may rely on for
/// insertion-ordered edge lists (ledger -> transactions).
#[derive(Clone, Debug, Default)]
pub struct MutationBatch {
    triples: Vec<Triple>,
}

impl MutationBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert a scalar value on a node
    pub fn value(&mut self, subject: &NodeRef, predicate: &str, value: impl Into<Value>) {
        self.triples.push(Triple {
            subject: subject.clone(),
            predicate: predicate.to_string(),
            object: Object::Value(value.into()),
        });
    }

    /// Assert a directed edge between two nodes
    pub fn edge(&mut self, subject: &NodeRef, predicate: &str, target: &NodeRef) {
        self.triples.push(Triple {
            subject: subject.clone(),
            predicate: predicate.to_string(),
            object: Object::Node(target.clone()),
        });
    }

    /// Whether the batch holds no assertions
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Number of assertions in the batch
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Borrow the assertions in order
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Consume the batch into its assertions
    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }
}

/// Result of a successful atomic push
///
/// Maps each placeholder name that appeared in the batch to the durable
/// identity the store assigned to it.
#[derive(Clone, Debug, Default)]
pub struct PushResult {
    assigned: FxHashMap<String, NodeId>,
}

impl PushResult {
    /// Build a push result from assigned placeholder identities
    pub fn new(assigned: FxHashMap<String, NodeId>) -> Self {
        Self { assigned }
    }

    /// The identity assigned to a placeholder name, if it appeared
    pub fn created(&self, name: &str) -> Option<NodeId> {
        self.assigned.get(name).copied()
    }

    /// Number of nodes created by the push
    pub fn created_count(&self) -> usize {
        self.assigned.len()
    }
}
