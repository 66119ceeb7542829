//! Ledger-to-graph indexing engine
//!
//! Converts an append-only, possibly-gapped sequence of decoded ledgers
//! into a consistent, idempotent graph of linked nodes:
//!
//! - [`Ingestor`] — the cursor/ingestion loop: walks the ledger sequence,
//!   detects and skips gaps, drives the writers one full ledger at a time
//! - [`Fetcher`] — extracts raw fee/operation ledger-entry changes for
//!   downstream change-stream consumers
//! - [`ChainResolver`] — finds each transaction's chronologically nearest
//!   predecessor by a bounded, loop-guarded backward walk
//! - [`LedgerWriter`] / [`TransactionWriter`] — materialize records as
//!   single atomic mutation batches, idempotent on their upsert keys
//! - [`AccountCache`] — process-wide account identity dedup with per-key
//!   serialized creation
//!
//! Ingestion is strictly ledger-sequence ordered; within one ledger,
//! transactions are written in ascending index order and the cursor only
//! advances after the whole ledger has committed.

mod chain;
mod cursor;
mod error;
mod fetcher;
mod identity;
mod source;
mod writer;

pub use chain::{ChainResolution, ChainResolver, MAX_EMPTY_LEDGER_RUN};
pub use cursor::{IngestConfig, Ingestor, TickOutcome};
pub use error::{IngestError, Result};
pub use fetcher::{ChangeRecord, ChangeSource, Fetcher};
pub use identity::AccountCache;
pub use source::{LedgerSource, MemoryLedgerSource};
pub use writer::{LedgerWriter, TransactionWriter};
