//! Backward chain resolution
//!
//! Finds the chronologically nearest predecessor of a transaction by
//! walking stored ledgers backward through their `prev` edges. The walk is
//! iterative with an explicit visited set and a hard depth bound, so it
//! terminates even against malformed link data.

use crate::error::Result;
use chaingraph_core::NodeId;
use chaingraph_store::GraphStore;
use rustc_hash::FxHashSet;
use tracing::warn;

/// Maximum number of consecutive zero-transaction ledgers the walk will
/// cross before giving up
pub const MAX_EMPTY_LEDGER_RUN: usize = 20;

/// Outcome of a chain resolution
///
/// Everything but `Found` materializes as a transaction without a `prev`
/// edge; the variants stay distinct so callers and logs can tell a genuine
/// start of history from a bounded or broken walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainResolution {
    /// The nearest strictly-earlier ingested transaction
    Found(NodeId),
    /// The walk reached the start of recorded history
    Genesis,
    /// The depth bound was exhausted before any transaction was found
    DepthExceeded,
    /// A ledger `prev` link loops back onto an already-visited ledger
    CycleDetected,
}

impl ChainResolution {
    /// The predecessor handle, if one was found
    pub fn node(&self) -> Option<NodeId> {
        match self {
            ChainResolution::Found(node) => Some(*node),
            _ => None,
        }
    }
}

/// Iterative backward walker over stored ledgers
#[derive(Debug)]
pub struct ChainResolver<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    max_empty_run: usize,
}

impl<'a, S: GraphStore + ?Sized> ChainResolver<'a, S> {
    /// Create a resolver with the default depth bound
    pub fn new(store: &'a S) -> Self {
        Self::with_depth_bound(store, MAX_EMPTY_LEDGER_RUN)
    }

    /// Create a resolver with an explicit depth bound
    pub fn with_depth_bound(store: &'a S, max_empty_run: usize) -> Self {
        Self {
            store,
            max_empty_run,
        }
    }

    /// Find the nearest strictly-preceding transaction of `(seq, index)`,
    /// starting from the ledger node the transaction belongs to
    ///
    /// On the starting ledger only the transaction at `index - 1` counts;
    /// on ancestor ledgers the greatest-index transaction wins. Ledgers
    /// with no transactions are crossed, up to the depth bound.
    pub async fn resolve(&self, start: NodeId, seq: u64, index: u32) -> Result<ChainResolution> {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut cursor = Some(start);
        let mut inspected = 0usize;

        while let Some(ledger) = cursor {
            if !visited.insert(ledger) {
                warn!(ledger = %ledger, seq, index, "Ledger chain loops, aborting walk");
                return Ok(ChainResolution::CycleDetected);
            }
            if inspected >= self.max_empty_run {
                warn!(
                    seq,
                    index,
                    depth = self.max_empty_run,
                    "Chain walk exhausted depth bound without a predecessor"
                );
                return Ok(ChainResolution::DepthExceeded);
            }
            inspected += 1;

            let Some(entry) = self.store.chain_entry(ledger).await? else {
                return Ok(ChainResolution::Genesis);
            };

            // Entries come descending by index: the first acceptable one is
            // the nearest predecessor.
            for tx in &entry.transactions {
                if tx.seq == seq {
                    if index > 0 && tx.index == index - 1 {
                        return Ok(ChainResolution::Found(tx.node));
                    }
                } else {
                    return Ok(ChainResolution::Found(tx.node));
                }
            }

            cursor = entry.prev;
        }

        Ok(ChainResolution::Genesis)
    }
}
