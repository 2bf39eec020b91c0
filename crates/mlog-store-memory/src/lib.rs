#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! **mlog-store-memory** – in-memory [`BlockStore`] reference implementation.
//!
//! This crate provides a fast, non-persistent backend suitable for tests,
//! examples, and embedders that don't need durability. All data is stored in
//! a `HashMap` guarded by an async `RwLock` and is lost when the process
//! terminates. It is not a production persistence layer — the real,
//! network-backed store is an external collaborator this workspace does not
//! implement.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use mlog_store::{digest, BlockStore, Multihash, StoreError};

/// An in-memory, non-persistent content-addressed blob store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockStore {
    blobs: Arc<RwLock<HashMap<Multihash, Vec<u8>>>>,
    /// Digests that `get` will hang on forever, for exercising the bounded
    /// fetcher's per-block timeout without a real slow network.
    withheld: Arc<RwLock<HashSet<Multihash>>>,
}

impl MemoryBlockStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blobs currently stored.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store currently holds no blobs.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Make `hash` permanently unreachable: `get(hash)` will never resolve.
    ///
    /// Used by fetcher tests to simulate a peer that never responds, so the
    /// per-fetch timeout in the bounded traversal has something real to race
    /// against.
    pub async fn withhold(&self, hash: Multihash) {
        self.withheld.write().await.insert(hash);
    }

    /// Remove a previously stored blob outright (simulates a peer that never
    /// had the block, as opposed to [`withhold`](Self::withhold) which
    /// simulates one that hangs).
    pub async fn forget(&self, hash: &Multihash) {
        self.blobs.write().await.remove(hash);
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn put(&self, bytes: &[u8]) -> Result<Multihash, StoreError> {
        let hash = digest(bytes);
        self.blobs
            .write()
            .await
            .entry(hash)
            .or_insert_with(|| bytes.to_vec());
        Ok(hash)
    }

    async fn get(&self, hash: &Multihash) -> Result<Vec<u8>, StoreError> {
        if self.withheld.read().await.contains(hash) {
            std::future::pending::<()>().await;
        }
        self.blobs
            .read()
            .await
            .get(hash)
            .cloned()
            .ok_or(StoreError::NotFound(*hash))
    }
}
