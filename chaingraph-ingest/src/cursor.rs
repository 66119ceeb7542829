//! Ledger cursor and ingestion loop
//!
//! The [`Ingestor`] owns the "next sequence to ingest" pointer and drives
//! one full ledger per [`Ingestor::tick`]: change extraction, ledger node
//! upsert, then every transaction in ascending index order. The pointer
//! only advances once the whole ledger has committed, so a failed or
//! aborted tick re-runs the same ledger and the idempotent writers make
//! the retry safe.

use crate::chain::MAX_EMPTY_LEDGER_RUN;
use crate::error::Result;
use crate::fetcher::{ChangeRecord, Fetcher};
use crate::identity::AccountCache;
use crate::source::LedgerSource;
use crate::writer::{LedgerWriter, TransactionWriter};
use chaingraph_core::{LedgerRecord, NodeId};
use chaingraph_store::GraphStore;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// Configuration for an [`Ingestor`]
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Sequence to start from; defaults to the source's highest known
    /// sequence (fall back to 1 on an empty source)
    pub start_seq: Option<u64>,
    /// Chain-walk depth bound (consecutive zero-transaction ledgers)
    pub max_empty_run: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            start_seq: None,
            max_empty_run: MAX_EMPTY_LEDGER_RUN,
        }
    }
}

/// What one tick accomplished
#[derive(Clone, Debug)]
pub enum TickOutcome {
    /// The ledger at the cursor was fully materialized
    Ingested {
        /// Sequence of the ingested ledger
        seq: u64,
        /// The ledger node handle
        ledger: NodeId,
        /// Transaction node handles in index order
        transactions: Vec<NodeId>,
        /// Raw changes extracted for downstream consumers
        changes: Vec<ChangeRecord>,
    },
    /// The cursor found a hole with later ledgers present and jumped over it
    GapSkipped {
        /// Sequence the cursor was at
        from: u64,
        /// Highest known sequence it jumped to
        to: u64,
    },
    /// The source has not produced the next ledger yet; back off and retry
    NotYetAvailable {
        /// Sequence the cursor is waiting for
        seq: u64,
    },
}

/// Sequential ledger-to-graph ingestor
#[derive(Debug)]
pub struct Ingestor<P, S> {
    source: P,
    store: S,
    accounts: Arc<AccountCache>,
    config: IngestConfig,
    next_seq: u64,
}

impl<P: LedgerSource, S: GraphStore> Ingestor<P, S> {
    /// Create an ingestor, resolving the starting sequence
    ///
    /// With no explicit `start_seq` the cursor starts at the source's
    /// highest known sequence, so a fresh process picks up at the head of
    /// the log rather than replaying history.
    pub async fn start(source: P, store: S, config: IngestConfig) -> Result<Self> {
        let next_seq = match config.start_seq {
            Some(seq) => seq,
            None => source.max_seq().await?.unwrap_or(1),
        };
        Ok(Self {
            source,
            store,
            accounts: Arc::new(AccountCache::new()),
            config,
            next_seq,
        })
    }

    /// Share an identity cache with other writers in the process
    pub fn with_accounts(mut self, accounts: Arc<AccountCache>) -> Self {
        self.accounts = accounts;
        self
    }

    /// The sequence the next tick will attempt
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// The shared identity cache
    pub fn accounts(&self) -> &Arc<AccountCache> {
        &self.accounts
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingest the ledger at the cursor, if the source has it
    ///
    /// Transient source or store failures propagate without advancing the
    /// cursor; the caller retries the same tick. Gap skips and
    /// not-yet-available are reported as outcomes, not errors.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let seq = self.next_seq;

        let Some(ledger) = self.source.ledger_at(seq).await? else {
            if let Some(max) = self.source.max_seq().await? {
                // A later ledger exists: the hole will never fill. Jump to
                // the head instead of retrying forever.
                if seq < max {
                    warn!(from = seq, to = max, "Ledger gap detected, skipping forward");
                    self.next_seq = max;
                    return Ok(TickOutcome::GapSkipped { from: seq, to: max });
                }
            }
            debug!(seq, "Next ledger not yet available");
            return Ok(TickOutcome::NotYetAvailable { seq });
        };

        ledger.validate()?;

        let span = info_span!(
            "ingest_ledger",
            seq = ledger.seq,
            transactions = ledger.transactions.len()
        );
        let outcome = self.ingest_ledger(ledger).instrument(span).await?;

        // The whole ledger committed; only now may the cursor move on.
        self.next_seq = seq + 1;
        Ok(outcome)
    }

    async fn ingest_ledger(&self, ledger: LedgerRecord) -> Result<TickOutcome> {
        info!(
            seq = ledger.seq,
            transactions = ledger.transactions.len(),
            "Ingesting ledger"
        );

        let changes = Fetcher::new(&ledger.transactions).fetch();
        let ledger_node = LedgerWriter::new(&self.store).write(&ledger).await?;

        let writer = TransactionWriter::with_depth_bound(
            &self.store,
            &self.accounts,
            self.config.max_empty_run,
        );
        let mut transactions = Vec::with_capacity(ledger.transactions.len());
        // Ascending index order: each write may depend on its in-ledger
        // predecessor already being durable.
        for tx in &ledger.transactions {
            transactions.push(writer.write(tx, ledger_node).await?);
        }

        Ok(TickOutcome::Ingested {
            seq: ledger.seq,
            ledger: ledger_node,
            transactions,
            changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryLedgerSource;
    use chaingraph_core::{FeeMeta, LedgerHeader, TransactionMeta, TransactionRecord};
    use chaingraph_store::MemoryGraphStore;

    fn ledger(seq: u64, tx_count: u32) -> LedgerRecord {
        LedgerRecord {
            seq,
            header: LedgerHeader::default(),
            transactions: (0..tx_count)
                .map(|index| TransactionRecord {
                    id: format!("tx-{seq}-{index}"),
                    ledger_seq: seq,
                    index,
                    fee_amount: 100,
                    source_account: "GACC".to_string(),
                    memo: None,
                    time_bounds: None,
                    fee_meta: FeeMeta::default(),
                    meta: TransactionMeta::default(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_tick_ingests_and_advances() {
        let source = MemoryLedgerSource::new();
        source.insert(ledger(1, 2));
        let store = MemoryGraphStore::new();
        let config = IngestConfig {
            start_seq: Some(1),
            ..IngestConfig::default()
        };
        let mut ingestor = Ingestor::start(source, store, config).await.unwrap();

        let outcome = ingestor.tick().await.unwrap();
        match outcome {
            TickOutcome::Ingested {
                seq, transactions, ..
            } => {
                assert_eq!(seq, 1);
                assert_eq!(transactions.len(), 2);
            }
            other => panic!("expected Ingested, got {other:?}"),
        }
        assert_eq!(ingestor.next_seq(), 2);
    }

    #[tokio::test]
    async fn test_not_yet_available_keeps_pointer() {
        let source = MemoryLedgerSource::new();
        source.insert(ledger(1, 0));
        let store = MemoryGraphStore::new();
        let config = IngestConfig {
            start_seq: Some(2),
            ..IngestConfig::default()
        };
        let mut ingestor = Ingestor::start(source, store, config).await.unwrap();

        let outcome = ingestor.tick().await.unwrap();
        assert!(matches!(outcome, TickOutcome::NotYetAvailable { seq: 2 }));
        assert_eq!(ingestor.next_seq(), 2);
    }

    #[tokio::test]
    async fn test_gap_skips_to_head() {
        let source = MemoryLedgerSource::new();
        for seq in 100..=150 {
            source.insert(ledger(seq, 0));
        }
        let store = MemoryGraphStore::new();
        let config = IngestConfig {
            start_seq: Some(1),
            ..IngestConfig::default()
        };
        let mut ingestor = Ingestor::start(source, store.clone(), config)
            .await
            .unwrap();

        let outcome = ingestor.tick().await.unwrap();
        assert!(matches!(
            outcome,
            TickOutcome::GapSkipped { from: 1, to: 150 }
        ));
        assert_eq!(ingestor.next_seq(), 150);
        // Nothing was written on the skip tick.
        assert_eq!(store.node_count(), 0);
    }

    #[tokio::test]
    async fn test_default_start_is_source_head() {
        let source = MemoryLedgerSource::new();
        source.insert(ledger(41, 0));
        source.insert(ledger(42, 0));
        let store = MemoryGraphStore::new();
        let ingestor = Ingestor::start(source, store, IngestConfig::default())
            .await
            .unwrap();

        assert_eq!(ingestor.next_seq(), 42);
    }
}
