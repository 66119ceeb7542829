//! Raw change extraction
//!
//! Pulls fee-level and operation-level ledger-entry changes out of one
//! ledger's decoded transactions for downstream change-stream consumers.
//! This is a pure extraction step: no graph writes, no reordering relative
//! to each change's (transaction, operation) origin. Fee batches for all
//! transactions come first, then metadata changes, matching the order the
//! changes were applied in the source log.

use chaingraph_core::{EntryChange, TransactionMeta, TransactionRecord};

/// Where a change record was extracted from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeSource {
    /// The transaction's fee metadata
    Fee,
    /// Transaction-level changes (V1 metadata only)
    Transaction,
    /// One operation's changes
    Operation {
        /// Operation position within the transaction
        index: u32,
    },
}

/// One extracted change with its origin
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeRecord {
    /// External id of the originating transaction
    pub tx_id: String,
    /// Index of the originating transaction within its ledger
    pub tx_index: u32,
    /// Which metadata section the change came from
    pub source: ChangeSource,
    /// The raw change
    pub change: EntryChange,
}

/// Extracts change records from one ledger's transactions
#[derive(Debug)]
pub struct Fetcher<'a> {
    transactions: &'a [TransactionRecord],
}

impl<'a> Fetcher<'a> {
    /// Create a fetcher over one ledger's decoded transactions
    pub fn new(transactions: &'a [TransactionRecord]) -> Self {
        Self { transactions }
    }

    /// Extract all change records in origin order
    pub fn fetch(&self) -> Vec<ChangeRecord> {
        let mut records = self.fetch_fees();
        records.extend(self.fetch_changes());
        records
    }

    fn fetch_fees(&self) -> Vec<ChangeRecord> {
        let mut records = Vec::new();
        for tx in self.transactions {
            for change in &tx.fee_meta.changes {
                records.push(ChangeRecord {
                    tx_id: tx.id.clone(),
                    tx_index: tx.index,
                    source: ChangeSource::Fee,
                    change: change.clone(),
                });
            }
        }
        records
    }

    fn fetch_changes(&self) -> Vec<ChangeRecord> {
        let mut records = Vec::new();
        for tx in self.transactions {
            match &tx.meta {
                TransactionMeta::V0 { operations } => {
                    push_operations(&mut records, tx, operations);
                }
                TransactionMeta::V1 {
                    tx_changes,
                    operations,
                } => {
                    for change in tx_changes {
                        records.push(ChangeRecord {
                            tx_id: tx.id.clone(),
                            tx_index: tx.index,
                            source: ChangeSource::Transaction,
                            change: change.clone(),
                        });
                    }
                    push_operations(&mut records, tx, operations);
                }
            }
        }
        records
    }
}

fn push_operations(
    records: &mut Vec<ChangeRecord>,
    tx: &TransactionRecord,
    operations: &[chaingraph_core::OperationMeta],
) {
    for (op_index, op) in operations.iter().enumerate() {
        for change in &op.changes {
            records.push(ChangeRecord {
                tx_id: tx.id.clone(),
                tx_index: tx.index,
                source: ChangeSource::Operation {
                    index: op_index as u32,
                },
                change: change.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaingraph_core::{EntryChangeKind, FeeMeta, OperationMeta};

    fn change(tag: &str) -> EntryChange {
        EntryChange {
            kind: EntryChangeKind::Updated,
            entry: serde_json::json!({ "tag": tag }),
        }
    }

    fn tx_v0(id: &str, index: u32, fee_tags: &[&str], op_tags: &[&[&str]]) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            ledger_seq: 1,
            index,
            fee_amount: 100,
            source_account: "GACC".to_string(),
            memo: None,
            time_bounds: None,
            fee_meta: FeeMeta {
                changes: fee_tags.iter().map(|t| change(t)).collect(),
            },
            meta: TransactionMeta::V0 {
                operations: op_tags
                    .iter()
                    .map(|tags| OperationMeta {
                        changes: tags.iter().map(|t| change(t)).collect(),
                    })
                    .collect(),
            },
        }
    }

    fn tags(records: &[ChangeRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.change.entry["tag"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_fees_precede_meta_changes() {
        let txs = vec![
            tx_v0("a", 0, &["fee-a"], &[&["op-a0"]]),
            tx_v0("b", 1, &["fee-b"], &[&["op-b0"]]),
        ];
        let records = Fetcher::new(&txs).fetch();

        assert_eq!(tags(&records), vec!["fee-a", "fee-b", "op-a0", "op-b0"]);
        assert_eq!(records[0].source, ChangeSource::Fee);
        assert_eq!(records[2].source, ChangeSource::Operation { index: 0 });
    }

    #[test]
    fn test_v1_tx_changes_precede_operations() {
        let mut tx = tx_v0("a", 0, &[], &[]);
        tx.meta = TransactionMeta::V1 {
            tx_changes: vec![change("tx-level")],
            operations: vec![
                OperationMeta {
                    changes: vec![change("op-0")],
                },
                OperationMeta {
                    changes: vec![change("op-1a"), change("op-1b")],
                },
            ],
        };
        let txs = vec![tx];
        let records = Fetcher::new(&txs).fetch();

        assert_eq!(tags(&records), vec!["tx-level", "op-0", "op-1a", "op-1b"]);
        assert_eq!(records[0].source, ChangeSource::Transaction);
        assert_eq!(records[3].source, ChangeSource::Operation { index: 1 });
    }

    #[test]
    fn test_operation_order_preserved_within_transaction() {
        let txs = vec![tx_v0("a", 0, &[], &[&["op-0a", "op-0b"], &["op-1"]])];
        let records = Fetcher::new(&txs).fetch();

        assert_eq!(tags(&records), vec!["op-0a", "op-0b", "op-1"]);
    }

    #[test]
    fn test_empty_transactions_produce_nothing() {
        let txs = vec![tx_v0("a", 0, &[], &[])];
        assert!(Fetcher::new(&txs).fetch().is_empty());
    }
}
