//! Decoded ledger-log records
//!
//! These are the already-parsed shapes handed to the engine by the
//! wire-decoding collaborator. Fee and operation metadata payloads stay
//! opaque (`serde_json::Value`); the engine extracts them for downstream
//! change-stream consumers but never interprets them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header fields of a decoded ledger, opaque to the engine
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerHeader {
    /// Ledger hash
    pub hash: String,
    /// Hash of the preceding ledger in the source log
    pub prev_hash: String,
    /// Close time (unix seconds)
    pub close_time: i64,
}

/// One sequential unit of the source log with its ordered transactions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Monotonic, unique sequence number
    pub seq: u64,
    /// Decoded header fields
    pub header: LedgerHeader,
    /// Transactions in ascending index order
    pub transactions: Vec<TransactionRecord>,
}

impl LedgerRecord {
    /// Check the structural invariants the writers depend on: every
    /// transaction carries this ledger's sequence, and indexes are
    /// contiguous ascending from zero.
    pub fn validate(&self) -> Result<()> {
        for (pos, tx) in self.transactions.iter().enumerate() {
            if tx.ledger_seq != self.seq {
                return Err(Error::invalid_record(format!(
                    "transaction {} carries ledger seq {} inside ledger {}",
                    tx.id, tx.ledger_seq, self.seq
                )));
            }
            if tx.index as usize != pos {
                return Err(Error::invalid_record(format!(
                    "transaction {} has index {} at position {} of ledger {}",
                    tx.id, tx.index, pos, self.seq
                )));
            }
        }
        Ok(())
    }
}

/// One ordered record within a ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// External id, stable and unique across the whole log
    pub id: String,
    /// Sequence of the ledger this transaction belongs to
    pub ledger_seq: u64,
    /// Index within the ledger (0-based, unique per ledger)
    pub index: u32,
    /// Fee amount charged
    pub fee_amount: u64,
    /// Source account identifier
    pub source_account: String,
    /// Optional memo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<Memo>,
    /// Optional validity time bounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_bounds: Option<TimeBounds>,
    /// Fee-level ledger-entry changes
    #[serde(default)]
    pub fee_meta: FeeMeta,
    /// Transaction metadata (operation-level changes)
    pub meta: TransactionMeta,
}

impl TransactionRecord {
    /// Derived total-order key: `"{ledgerSeq}-{index}"`
    pub fn sort_handle(&self) -> String {
        format!("{}-{}", self.ledger_seq, self.index)
    }
}

/// A transaction memo: type tag plus value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    /// Memo kind tag
    pub kind: MemoKind,
    /// Memo payload, already rendered to text by the decoder
    pub value: String,
}

/// Memo kind tags carried by the source log
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoKind {
    /// Free-form text
    Text,
    /// Numeric id
    Id,
    /// Hash reference
    Hash,
    /// Return-hash reference
    Return,
}

impl MemoKind {
    /// The tag stored on the memo node
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoKind::Text => "text",
            MemoKind::Id => "id",
            MemoKind::Hash => "hash",
            MemoKind::Return => "return",
        }
    }
}

impl fmt::Display for MemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validity time bounds (unix seconds, inclusive)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    /// Earliest valid time
    pub min_time: u64,
    /// Latest valid time
    pub max_time: u64,
}

/// Fee-level metadata: the ledger-entry changes applied when the fee was
/// charged, one batch per transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeMeta {
    /// Changes in application order
    pub changes: Vec<EntryChange>,
}

/// Transaction metadata, by format version
///
/// V0 carries per-operation changes only; V1 adds top-level transaction
/// changes ahead of the per-operation ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "version", rename_all = "lowercase")]
pub enum TransactionMeta {
    /// Per-operation changes only
    V0 {
        /// One entry per operation, in operation order
        operations: Vec<OperationMeta>,
    },
    /// Top-level transaction changes plus per-operation changes
    V1 {
        /// Changes applied at the transaction level
        tx_changes: Vec<EntryChange>,
        /// One entry per operation, in operation order
        operations: Vec<OperationMeta>,
    },
}

impl Default for TransactionMeta {
    fn default() -> Self {
        TransactionMeta::V0 {
            operations: Vec::new(),
        }
    }
}

/// Per-operation metadata
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMeta {
    /// Ledger-entry changes applied by this operation, in order
    pub changes: Vec<EntryChange>,
}

/// One raw ledger-entry change record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryChange {
    /// What happened to the entry
    pub kind: EntryChangeKind,
    /// Decoded entry payload, opaque to the engine
    pub entry: serde_json::Value,
}

/// Change kinds for ledger entries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryChangeKind {
    /// Entry created
    Created,
    /// Entry updated
    Updated,
    /// Entry removed
    Removed,
    /// Pre-change snapshot
    State,
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_sort_handle_format() {
        assert_eq!(tx("a", 123, 4).sort_handle(), "123-4");
        assert_eq!(tx("b", 1, 0).sort_handle(), "1-0");
    }

    #[test]
    fn test_validate_accepts_contiguous_indexes() {
        let ledger = LedgerRecord {
            seq: 7,
            header: LedgerHeader::default(),
            transactions: vec![tx("a", 7, 0), tx("b", 7, 1), tx("c", 7, 2)],
        };
        assert!(ledger.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_seq() {
        let ledger = LedgerRecord {
            seq: 7,
            header: LedgerHeader::default(),
            transactions: vec![tx("a", 8, 0)],
        };
        assert!(ledger.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_index_holes() {
        let ledger = LedgerRecord {
            seq: 7,
            header: LedgerHeader::default(),
            transactions: vec![tx("a", 7, 0), tx("b", 7, 2)],
        };
        assert!(ledger.validate().is_err());
    }

    #[test]
    fn test_record_json_roundtrip() {
        let ledger = LedgerRecord {
            seq: 42,
            header: LedgerHeader {
                hash: "abcd".into(),
                prev_hash: "ef01".into(),
                close_time: 1_700_000_000,
            },
            transactions: vec![TransactionRecord {
                memo: Some(Memo {
                    kind: MemoKind::Text,
                    value: "hello".into(),
                }),
                time_bounds: Some(TimeBounds {
                    min_time: 10,
                    max_time: 20,
                }),
                ..tx("a", 42, 0)
            }],
        };
        let json = serde_json::to_string(&ledger).unwrap();
        let back: LedgerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }
}
