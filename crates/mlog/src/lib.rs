//! An append-only, Merkle-DAG log designed as a Conflict-free Replicated
//! Data Type (CRDT).
//!
//! Each participant appends entries referencing the current heads (frontier)
//! of its local view. Participants that have diverged can merge (`join`)
//! their logs and obtain identical results regardless of merge order. Entries
//! are content-addressed and persisted through a caller-supplied
//! [`BlockStore`](mlog_store::BlockStore) — this crate owns the DAG model,
//! the deterministic sort, the join semilattice, and the bounded fetcher; it
//! does not own storage, signing, or transport.
//!
//! ```no_run
//! use mlog::prelude::*;
//! use mlog_store_memory::MemoryBlockStore;
//!
//! # async fn run() -> mlog::Result<()> {
//! let store = MemoryBlockStore::new();
//! let log = mlog::create::<String>(Some("feed-a".into()), None, None)?;
//! let log = mlog::append(&store, &log, "hello".to_string()).await?;
//! println!("{log}");
//! # Ok(())
//! # }
//! ```

mod collection;
mod config;
mod entry;
mod error;
mod fetcher;
mod log;
mod ops;

pub use collection::{find_heads, find_parents, find_tail_hashes, find_tails, latest_seq, sort_entries};
pub use config::{FetchConfig, DEFAULT_FETCH_TIMEOUT};
pub use entry::{ChainId, Entry, Payload};
pub use error::{LogError, Result};
pub use fetcher::{bounded_fetch, FetchProgress};
pub use log::Log;
pub use ops::{append, create, expand, from_entry, from_multihash, join, join_all, to_multihash};

/// Re-exports of the types most call sites need, for a single glob import.
pub mod prelude {
    pub use crate::{
        append, create, expand, from_entry, from_multihash, join, join_all, to_multihash, ChainId, Entry,
        FetchConfig, FetchProgress, Log, LogError, Payload, Result,
    };
    pub use mlog_store::{BlockStore, Multihash, StoreError};
}
