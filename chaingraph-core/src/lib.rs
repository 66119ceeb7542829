//! Core types for the chaingraph indexing engine
//!
//! This crate holds everything the ingestion pipeline and the store interface
//! agree on:
//!
//! - Decoded ledger-log records ([`LedgerRecord`], [`TransactionRecord`] and
//!   their metadata payloads) as handed over by the wire-decoding collaborator
//! - Graph node identity ([`NodeId`] for durable identities, [`NodeRef`] for
//!   identities that may still be symbolic placeholders inside a pending
//!   mutation batch)
//! - Scalar values carried on graph triples ([`Value`])
//! - The predicate and node-type vocabulary ([`vocab`])
//!
//! No I/O happens here; the store interface lives in `chaingraph-store` and
//! the engine itself in `chaingraph-ingest`.

mod error;
mod node;
mod record;
mod value;
pub mod vocab;

pub use error::{Error, Result};
pub use node::{NodeId, NodeRef};
pub use record::{
    EntryChange, EntryChangeKind, FeeMeta, LedgerHeader, LedgerRecord, Memo, MemoKind,
    OperationMeta, TimeBounds, TransactionMeta, TransactionRecord,
};
pub use value::Value;
