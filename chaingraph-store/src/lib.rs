//! Graph store interface for the chaingraph indexing engine
//!
//! This crate defines the narrow contract between the ingestion engine and
//! whatever graph backend holds the materialized data:
//!
//! - [`GraphStore`] — parameterized query + atomic mutation push +
//!   connection lifecycle
//! - [`MutationBatch`] / [`PushResult`] — triple assertions with symbolic
//!   placeholder identities, finalized only when a push succeeds
//! - [`GraphQuery`] / [`QueryResult`] — the closed set of query shapes the
//!   engine issues
//! - [`MemoryGraphStore`] — thread-safe in-memory implementation for tests
//!   and embedded runs

mod batch;
mod error;
mod memory;
mod query;
mod store;

pub use batch::{MutationBatch, Object, PushResult, Triple};
pub use error::{Result, StoreError};
pub use memory::MemoryGraphStore;
pub use query::{ChainEntry, ChainTransaction, GraphQuery, QueryResult, TransactionHit};
pub use store::GraphStore;
