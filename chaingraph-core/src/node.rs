//! Graph node identity
//!
//! A [`NodeId`] is a durable identity assigned by the store. A [`NodeRef`]
//! is what mutation batches carry: either a durable id, or a symbolic
//! placeholder that only becomes durable once the batch it belongs to is
//! pushed atomically. Placeholder names are scoped to a single batch; the
//! same name within one batch always refers to the same pending node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Durable identity of a graph node, assigned by the store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// A node reference usable as a mutation subject or edge target
///
/// `Placeholder` is symbolic until the enclosing batch is pushed; the push
/// result maps each placeholder name to its finalized [`NodeId`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRef {
    /// A node that already exists in the store
    Id(NodeId),
    /// A node to be created by the enclosing mutation batch
    Placeholder(String),
}

impl NodeRef {
    /// Create a placeholder reference with the given batch-local name
    pub fn placeholder(name: impl Into<String>) -> Self {
        NodeRef::Placeholder(name.into())
    }

    /// The durable id, if this reference is already finalized
    pub fn as_id(&self) -> Option<NodeId> {
        match self {
            NodeRef::Id(id) => Some(*id),
            NodeRef::Placeholder(_) => None,
        }
    }

    /// Whether this reference is still symbolic
    pub fn is_placeholder(&self) -> bool {
        matches!(self, NodeRef::Placeholder(_))
    }
}

impl From<NodeId> for NodeRef {
    fn from(id: NodeId) -> Self {
        NodeRef::Id(id)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Id(id) => write!(f, "{}", id),
            NodeRef::Placeholder(name) => write!(f, "_:{}", name),
        }
    }
}
