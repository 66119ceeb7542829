//! Ledger and transaction writers
//!
//! Each writer materializes one record as a single atomic mutation batch.
//! Both are idempotent on their upsert key (ledger sequence, transaction
//! external id): re-writing an already-ingested record reuses the stored
//! node and yields the same handle.

use crate::chain::{ChainResolution, ChainResolver};
use crate::error::{IngestError, Result};
use crate::identity::AccountCache;
use chaingraph_core::vocab::{node_type, pred};
use chaingraph_core::{LedgerRecord, NodeId, NodeRef, TransactionRecord};
use chaingraph_store::{GraphStore, MutationBatch};
use tracing::debug;

/// Writes one ledger node per source ledger
///
/// The ledger node carries the header fields and a `prev` edge to the
/// stored ledger at exactly the preceding sequence, which is the backbone
/// the chain resolver walks. The ledger chain is contiguous: if the
/// preceding sequence was never ingested, no `prev` edge is written, so a
/// later-ingested range never grows a false predecessor across the gap.
#[derive(Debug)]
pub struct LedgerWriter<'a, S: GraphStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: GraphStore + ?Sized> LedgerWriter<'a, S> {
    /// Create a writer against the given store
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Materialize the ledger node, reusing an existing one
    ///
    /// Ledger nodes are never mutated after creation; an existing node is
    /// returned untouched.
    pub async fn write(&self, ledger: &LedgerRecord) -> Result<NodeId> {
        if let Some(existing) = self.store.ledger_by_seq(ledger.seq).await? {
            return Ok(existing);
        }

        let prev = match ledger.seq.checked_sub(1) {
            Some(prev_seq) => self.store.ledger_by_seq(prev_seq).await?,
            None => None,
        };

        let mut batch = MutationBatch::new();
        let subject = NodeRef::placeholder(node_type::LEDGER);
        batch.value(&subject, pred::TYPE, node_type::LEDGER);
        batch.value(&subject, pred::SEQ, ledger.seq);
        batch.value(&subject, pred::HASH, ledger.header.hash.as_str());
        batch.value(&subject, pred::PREV_HASH, ledger.header.prev_hash.as_str());
        batch.value(&subject, pred::CLOSE_TIME, ledger.header.close_time);
        if let Some(prev) = prev {
            batch.edge(&subject, pred::PREV, &NodeRef::Id(prev));
        }

        let result = self.store.push(batch).await?;
        result
            .created(node_type::LEDGER)
            .ok_or(IngestError::MissingIdentity(node_type::LEDGER))
    }
}

/// Writes one transaction node per source transaction
///
/// Orchestrates one transaction's materialization: resolves or creates its
/// node, links it to its ledger, its resolved predecessor, its source
/// account (via the shared [`AccountCache`]) and its memo/time-bound
/// attributes, then pushes everything as exactly one atomic batch.
#[derive(Debug)]
pub struct TransactionWriter<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    accounts: &'a AccountCache,
    resolver: ChainResolver<'a, S>,
}

impl<'a, S: GraphStore + ?Sized> TransactionWriter<'a, S> {
    /// Create a writer with the default chain depth bound
    pub fn new(store: &'a S, accounts: &'a AccountCache) -> Self {
        Self {
            store,
            accounts,
            resolver: ChainResolver::new(store),
        }
    }

    /// Create a writer with an explicit chain depth bound
    pub fn with_depth_bound(store: &'a S, accounts: &'a AccountCache, max_empty_run: usize) -> Self {
        Self {
            store,
            accounts,
            resolver: ChainResolver::with_depth_bound(store, max_empty_run),
        }
    }

    /// Materialize one transaction under its ledger node
    ///
    /// Idempotent on the transaction's external id. Push failures surface
    /// to the caller unretried; retry policy belongs to the ingestion loop.
    pub async fn write(&self, tx: &TransactionRecord, ledger: NodeId) -> Result<NodeId> {
        let current = self.store.transaction_by_id(&tx.id).await?;
        let resolution = self
            .resolver
            .resolve(ledger, tx.ledger_seq, tx.index)
            .await?;
        let account = self.accounts.resolve(self.store, &tx.source_account).await?;

        let subject = match &current {
            Some(hit) => NodeRef::Id(hit.node),
            None => NodeRef::placeholder(node_type::TRANSACTION),
        };
        let ledger_ref = NodeRef::Id(ledger);

        let mut batch = MutationBatch::new();
        batch.value(&subject, pred::TYPE, node_type::TRANSACTION);
        batch.value(&subject, pred::ID, tx.id.as_str());
        batch.value(&subject, pred::INDEX, tx.index);
        batch.value(&subject, pred::SEQ, tx.ledger_seq);
        batch.value(&subject, pred::SORT_HANDLE, tx.sort_handle());
        batch.value(&subject, pred::FEE_AMOUNT, tx.fee_amount);
        batch.value(&subject, pred::SOURCE_ACCOUNT_ID, tx.source_account.as_str());

        batch.edge(&ledger_ref, pred::TRANSACTIONS, &subject);
        batch.edge(&subject, pred::LEDGER, &ledger_ref);

        if let ChainResolution::Found(prev) = resolution {
            batch.edge(&subject, pred::PREV, &NodeRef::Id(prev));
        } else {
            debug!(id = %tx.id, resolution = ?resolution, "Transaction has no predecessor");
        }

        if let Some(memo) = &tx.memo {
            let memo_ref = current
                .as_ref()
                .and_then(|hit| hit.memo)
                .map(NodeRef::Id)
                .unwrap_or_else(|| NodeRef::placeholder("memo"));
            batch.value(&memo_ref, pred::TYPE, memo.kind.as_str());
            batch.value(&memo_ref, pred::VALUE, memo.value.as_str());
            batch.edge(&subject, pred::MEMO, &memo_ref);
            batch.edge(&memo_ref, pred::TRANSACTION, &subject);
        }

        if let Some(bounds) = &tx.time_bounds {
            batch.value(&subject, pred::TIME_BOUND_MIN, bounds.min_time);
            batch.value(&subject, pred::TIME_BOUND_MAX, bounds.max_time);
        }

        let account_ref = NodeRef::Id(account);
        batch.edge(&subject, pred::SOURCE_ACCOUNT, &account_ref);
        batch.edge(&account_ref, pred::TRANSACTIONS, &subject);

        let result = self.store.push(batch).await?;
        match current {
            Some(hit) => Ok(hit.node),
            None => result
                .created(node_type::TRANSACTION)
                .ok_or(IngestError::MissingIdentity(node_type::TRANSACTION)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaingraph_core::{
        FeeMeta, LedgerHeader, Memo, MemoKind, TimeBounds, TransactionMeta, Value,
    };
    use chaingraph_store::MemoryGraphStore;

    fn ledger(seq: u64) -> LedgerRecord {
        LedgerRecord {
            seq,
            header: LedgerHeader {
                hash: format!("hash-{seq}"),
                prev_hash: format!("hash-{}", seq.saturating_sub(1)),
                close_time: 1_700_000_000 + seq as i64,
            },
            transactions: Vec::new(),
        }
    }

    fn tx(id: &str, ledger_seq: u64, index: u32) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            ledger_seq,
            index,
            fee_amount: 100,
            source_account: "GACC".to_string(),
            memo: None,
            time_bounds: None,
            fee_meta: FeeMeta::default(),
            meta: TransactionMeta::default(),
        }
    }

    #[tokio::test]
    async fn test_ledger_writer_idempotent() {
        let store = MemoryGraphStore::new();
        let writer = LedgerWriter::new(&store);

        let first = writer.write(&ledger(5)).await.unwrap();
        let second = writer.write(&ledger(5)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count_by_type(node_type::LEDGER), 1);
    }

    #[tokio::test]
    async fn test_ledger_writer_links_contiguous_prev_only() {
        let store = MemoryGraphStore::new();
        let writer = LedgerWriter::new(&store);

        let l5 = writer.write(&ledger(5)).await.unwrap();
        let l6 = writer.write(&ledger(6)).await.unwrap();
        let l9 = writer.write(&ledger(9)).await.unwrap();

        assert!(store.edge_targets(l5, pred::PREV).is_empty());
        assert_eq!(store.edge_targets(l6, pred::PREV), vec![l5]);
        // A hole in the sequence is never bridged.
        assert!(store.edge_targets(l9, pred::PREV).is_empty());
    }

    #[tokio::test]
    async fn test_transaction_writer_base_attributes() {
        let store = MemoryGraphStore::new();
        let accounts = AccountCache::new();
        let ledger_node = LedgerWriter::new(&store).write(&ledger(5)).await.unwrap();

        let writer = TransactionWriter::new(&store, &accounts);
        let record = TransactionRecord {
            memo: Some(Memo {
                kind: MemoKind::Text,
                value: "hello".into(),
            }),
            time_bounds: Some(TimeBounds {
                min_time: 10,
                max_time: 20,
            }),
            ..tx("tx-1", 5, 0)
        };
        let node = writer.write(&record, ledger_node).await.unwrap();

        assert_eq!(
            store.scalar(node, pred::SORT_HANDLE),
            Some(Value::Str("5-0".into()))
        );
        assert_eq!(store.scalar(node, pred::FEE_AMOUNT), Some(Value::UInt(100)));
        assert_eq!(
            store.scalar(node, pred::TIME_BOUND_MAX),
            Some(Value::UInt(20))
        );
        assert_eq!(store.edge_targets(node, pred::LEDGER), vec![ledger_node]);
        assert_eq!(
            store.edge_targets(ledger_node, pred::TRANSACTIONS),
            vec![node]
        );

        // Memo node carries the kind tag and links back.
        let memo_node = store.edge_targets(node, pred::MEMO)[0];
        assert_eq!(
            store.scalar(memo_node, pred::TYPE),
            Some(Value::Str("text".into()))
        );
        assert_eq!(store.edge_targets(memo_node, pred::TRANSACTION), vec![node]);

        // Account resolved and linked both ways.
        let account = store.node_by_key(node_type::ACCOUNT, "GACC").unwrap();
        assert_eq!(store.edge_targets(node, pred::SOURCE_ACCOUNT), vec![account]);
        assert_eq!(store.edge_targets(account, pred::TRANSACTIONS), vec![node]);
    }

    #[tokio::test]
    async fn test_transaction_writer_idempotent() {
        let store = MemoryGraphStore::new();
        let accounts = AccountCache::new();
        let ledger_node = LedgerWriter::new(&store).write(&ledger(5)).await.unwrap();
        let writer = TransactionWriter::new(&store, &accounts);

        let record = TransactionRecord {
            memo: Some(Memo {
                kind: MemoKind::Id,
                value: "42".into(),
            }),
            ..tx("tx-1", 5, 0)
        };
        let first = writer.write(&record, ledger_node).await.unwrap();
        let second = writer.write(&record, ledger_node).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count_by_type(node_type::TRANSACTION), 1);
        // No duplicate ledger, account or memo edges either.
        assert_eq!(store.edge_targets(ledger_node, pred::TRANSACTIONS).len(), 1);
        assert_eq!(store.edge_targets(first, pred::MEMO).len(), 1);
        let account = store.node_by_key(node_type::ACCOUNT, "GACC").unwrap();
        assert_eq!(store.edge_targets(account, pred::TRANSACTIONS).len(), 1);
    }

    #[tokio::test]
    async fn test_prev_chain_within_and_across_ledgers() {
        let store = MemoryGraphStore::new();
        let accounts = AccountCache::new();
        let writer = TransactionWriter::new(&store, &accounts);

        let l5 = LedgerWriter::new(&store).write(&ledger(5)).await.unwrap();
        let t0 = writer.write(&tx("tx-a", 5, 0), l5).await.unwrap();
        let t1 = writer.write(&tx("tx-b", 5, 1), l5).await.unwrap();

        let l6 = LedgerWriter::new(&store).write(&ledger(6)).await.unwrap();
        let t2 = writer.write(&tx("tx-c", 6, 0), l6).await.unwrap();

        assert!(store.edge_targets(t0, pred::PREV).is_empty());
        assert_eq!(store.edge_targets(t1, pred::PREV), vec![t0]);
        assert_eq!(store.edge_targets(t2, pred::PREV), vec![t1]);
    }
}
