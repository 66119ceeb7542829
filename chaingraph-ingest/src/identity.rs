//! Identity cache for externally-referenced accounts
//!
//! Resolves an external account identifier to its graph node, creating the
//! node on first sight. The cache is shared process-wide state: many
//! writers may race on the same unseen key, so creation is serialized per
//! key — a map probe alone is never enough to decide "this key needs a new
//! node".
//!
//! Resolution order: process-wide map, then the store (durable fallback),
//! then a creation push whose placeholder identity is finalized by the
//! store's atomic push. First writer wins; every later resolver of the
//! same key reuses the node.

use crate::error::{IngestError, Result};
use chaingraph_core::vocab::{node_type, pred};
use chaingraph_core::{NodeId, NodeRef};
use chaingraph_store::{GraphStore, MutationBatch};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Process-wide account identity cache
#[derive(Default)]
pub struct AccountCache {
    /// Keys already resolved to durable identities
    resolved: RwLock<FxHashMap<String, NodeId>>,
    /// Per-key creation locks; one entry per distinct key, same cardinality
    /// as `resolved`
    creating: Mutex<FxHashMap<String, Arc<Mutex<()>>>>,
}

impl fmt::Debug for AccountCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCache")
            .field("resolved_count", &self.resolved.read().len())
            .finish()
    }
}

impl AccountCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys resolved so far
    pub fn len(&self) -> usize {
        self.resolved.read().len()
    }

    /// Whether no keys have been resolved yet
    pub fn is_empty(&self) -> bool {
        self.resolved.read().is_empty()
    }

    /// Resolve an external account identifier to its node handle
    ///
    /// Creates the node on first sight; at most one node per key ever
    /// exists, even under concurrent first-sight resolution.
    pub async fn resolve<S>(&self, store: &S, key: &str) -> Result<NodeId>
    where
        S: GraphStore + ?Sized,
    {
        if let Some(id) = self.resolved.read().get(key) {
            return Ok(*id);
        }

        // Serialize creation per key. The outer map lock is held only long
        // enough to fetch or insert the key's lock.
        let key_lock = {
            let mut creating = self.creating.lock().await;
            creating
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = key_lock.lock().await;

        // A racing resolver may have finished while we waited.
        if let Some(id) = self.resolved.read().get(key) {
            return Ok(*id);
        }

        let id = match store.account_by_key(key).await? {
            Some(existing) => existing,
            None => self.create(store, key).await?,
        };

        self.resolved.write().insert(key.to_string(), id);
        Ok(id)
    }

    async fn create<S>(&self, store: &S, key: &str) -> Result<NodeId>
    where
        S: GraphStore + ?Sized,
    {
        let mut batch = MutationBatch::new();
        let account = NodeRef::placeholder(node_type::ACCOUNT);
        batch.value(&account, pred::TYPE, node_type::ACCOUNT);
        batch.value(&account, pred::ID, key);

        let result = store.push(batch).await?;
        let id = result
            .created(node_type::ACCOUNT)
            .ok_or(IngestError::MissingIdentity(node_type::ACCOUNT))?;

        debug!(account = key, node = %id, "Created account node");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaingraph_store::MemoryGraphStore;

    #[tokio::test]
    async fn test_resolve_creates_once_then_reuses() {
        let store = MemoryGraphStore::new();
        let cache = AccountCache::new();

        let first = cache.resolve(&store, "GACC").await.unwrap();
        let second = cache.resolve(&store, "GACC").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count_by_type(node_type::ACCOUNT), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_finds_durable_node() {
        let store = MemoryGraphStore::new();

        // Node written by an earlier process lifetime.
        let mut batch = MutationBatch::new();
        let account = NodeRef::placeholder(node_type::ACCOUNT);
        batch.value(&account, pred::TYPE, node_type::ACCOUNT);
        batch.value(&account, pred::ID, "GACC");
        let durable = store
            .push(batch)
            .await
            .unwrap()
            .created(node_type::ACCOUNT)
            .unwrap();

        let cache = AccountCache::new();
        let resolved = cache.resolve(&store, "GACC").await.unwrap();

        assert_eq!(resolved, durable);
        assert_eq!(store.count_by_type(node_type::ACCOUNT), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_sight_resolves_single_node() {
        let store = MemoryGraphStore::new();
        let cache = Arc::new(AccountCache::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.resolve(&store, "GACC").await.unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.count_by_type(node_type::ACCOUNT), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_get_distinct_nodes() {
        let store = MemoryGraphStore::new();
        let cache = AccountCache::new();

        let a = cache.resolve(&store, "GAAA").await.unwrap();
        let b = cache.resolve(&store, "GBBB").await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.count_by_type(node_type::ACCOUNT), 2);
    }
}
