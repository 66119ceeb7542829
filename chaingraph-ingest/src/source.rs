//! The decoded-ledger collaborator interface
//!
//! The engine never touches the wire format; a [`LedgerSource`] hands it
//! already-decoded [`LedgerRecord`]s by sequence number. Sources are
//! expected to be eventually complete but may be momentarily behind the
//! network (the cursor reports "not yet available") or permanently holed
//! (the cursor skips the gap).

use crate::error::Result;
use async_trait::async_trait;
use chaingraph_core::LedgerRecord;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Debug;
use std::sync::Arc;

/// Read access to the decoded ledger log
#[async_trait]
pub trait LedgerSource: Debug + Send + Sync {
    /// The ledger at the given sequence, if the source holds it
    async fn ledger_at(&self, seq: u64) -> Result<Option<LedgerRecord>>;

    /// The highest sequence the source knows about, if it holds anything
    async fn max_seq(&self) -> Result<Option<u64>>;
}

/// In-memory ledger source for tests and embedded runs
///
/// Holds decoded records in a `BTreeMap` behind `Arc<RwLock>`; cloning
/// shares the underlying log.
#[derive(Clone, Default)]
pub struct MemoryLedgerSource {
    ledgers: Arc<RwLock<BTreeMap<u64, LedgerRecord>>>,
}

impl fmt::Debug for MemoryLedgerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ledgers = self.ledgers.read();
        f.debug_struct("MemoryLedgerSource")
            .field("ledger_count", &ledgers.len())
            .field("max_seq", &ledgers.keys().next_back())
            .finish()
    }
}

impl MemoryLedgerSource {
    /// Create a new empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a decoded ledger to the log, keyed by its sequence
    pub fn insert(&self, ledger: LedgerRecord) {
        self.ledgers.write().insert(ledger.seq, ledger);
    }

    /// Number of ledgers held
    pub fn len(&self) -> usize {
        self.ledgers.read().len()
    }

    /// Whether the source holds no ledgers
    pub fn is_empty(&self) -> bool {
        self.ledgers.read().is_empty()
    }
}

#[async_trait]
impl LedgerSource for MemoryLedgerSource {
    async fn ledger_at(&self, seq: u64) -> Result<Option<LedgerRecord>> {
        Ok(self.ledgers.read().get(&seq).cloned())
    }

    async fn max_seq(&self) -> Result<Option<u64>> {
        Ok(self.ledgers.read().keys().next_back().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaingraph_core::LedgerHeader;

    fn ledger(seq: u64) -> LedgerRecord {
        LedgerRecord {
            seq,
            header: LedgerHeader::default(),
            transactions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_memory_source_lookup() {
        let source = MemoryLedgerSource::new();
        assert_eq!(source.max_seq().await.unwrap(), None);

        source.insert(ledger(3));
        source.insert(ledger(7));

        assert_eq!(source.max_seq().await.unwrap(), Some(7));
        assert_eq!(source.ledger_at(3).await.unwrap().unwrap().seq, 3);
        assert!(source.ledger_at(5).await.unwrap().is_none());
    }
}
