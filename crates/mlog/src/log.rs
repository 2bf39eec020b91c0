//! `Log<P>`: a read view over a sorted, deduplicated set of entries plus the
//! chain's current head digests.

use std::fmt;

use serde::{Deserialize, Serialize};

use mlog_store::Multihash;

use crate::collection::sort_entries;
use crate::entry::{ChainId, Entry, Payload};
use crate::error::{LogError, Result};

/// The on-store wire image of a log: `{id, heads}`. Entries themselves are
/// addressed individually in the block store; a log's own image is just a
/// named pointer at its current frontier.
#[derive(Serialize, Deserialize)]
struct LogImage {
    id: ChainId,
    heads: Vec<String>,
}

/// A materialized, totally-ordered view of one chain's entries.
///
/// `Log` is a value, not a handle: joining two logs or appending to one
/// produces a new `Log` rather than mutating in place, matching the
/// append-only, no-tombstone semantics of the underlying CRDT.
#[derive(Clone, Debug)]
pub struct Log<P: Payload> {
    id: ChainId,
    items: Vec<Entry<P>>,
    heads: Vec<Multihash>,
}

impl<P: Payload> Log<P> {
    /// Build a log from an already-deduplicated entry set, sorting it into
    /// the deterministic total order and recomputing heads from scratch.
    pub(crate) fn from_entries(id: impl Into<ChainId>, entries: Vec<Entry<P>>) -> Self {
        let items = sort_entries(&entries);
        let heads = crate::collection::find_heads(&items).iter().map(Entry::hash).collect();
        Self {
            id: id.into(),
            items,
            heads,
        }
    }

    /// The chain identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All entries, in deterministic total order.
    pub fn items(&self) -> &[Entry<P>] {
        &self.items
    }

    /// Digests of the entries with no known child — the chain's current
    /// frontier, i.e. where the next `append` would attach.
    pub fn heads(&self) -> &[Multihash] {
        &self.heads
    }

    /// Look up a single entry by digest.
    pub fn get(&self, hash: Multihash) -> Option<&Entry<P>> {
        self.items.iter().find(|e| e.hash() == hash)
    }

    /// Override this log's `heads` with a caller-trusted set instead of the
    /// one derived from `items` by [`from_entries`](Self::from_entries).
    ///
    /// Used when reconstructing a log from a persisted `{id, heads}` image,
    /// where the heads are the source of truth and `items` may only be a
    /// partial, fetcher-bounded view of the chain behind them.
    pub(crate) fn with_heads(mut self, heads: Vec<Multihash>) -> Self {
        self.heads = heads;
        self
    }

    /// Keep only the most causally-recent `size` entries (a suffix of the
    /// sorted sequence), recomputing `heads` over what remains.
    pub(crate) fn truncate_to_suffix(self, size: usize) -> Self {
        if self.items.len() <= size {
            return self;
        }
        let start = self.items.len() - size;
        let items: Vec<Entry<P>> = self.items[start..].to_vec();
        let heads = crate::collection::find_heads(&items).iter().map(Entry::hash).collect();
        Self {
            id: self.id,
            items,
            heads,
        }
    }

    /// The log's `{id, heads}` wire image, ready to persist or hand to a peer
    /// so they can resume traversal from the current frontier.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let image = LogImage {
            id: self.id.clone(),
            heads: self.heads.iter().map(Multihash::to_base58).collect(),
        };
        Ok(serde_json::to_value(image)?)
    }

    /// The log's `{id, heads}` wire image, canonically encoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let image = LogImage {
            id: self.id.clone(),
            heads: self.heads.iter().map(Multihash::to_base58).collect(),
        };
        Ok(serde_json::to_vec(&image)?)
    }

    /// Parse a previously-serialized `{id, heads}` image.
    pub(crate) fn parse_image(bytes: &[u8]) -> Result<(ChainId, Vec<Multihash>)> {
        let image: LogImage = serde_json::from_slice(bytes).map_err(|_| LogError::NotALog)?;
        let heads = image
            .heads
            .iter()
            .map(|s| s.parse::<Multihash>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok((image.id, heads))
    }
}

impl<P: Payload + fmt::Display> fmt::Display for Log<P> {
    /// Render the log newest-first as an indented tree, e.g.:
    ///
    /// ```text
    /// five
    /// └─four
    ///   └─three
    ///     └─two
    ///       └─one
    /// ```
    ///
    /// This mirrors position in the reverse-sorted item list rather than each
    /// entry's true ancestor-chain depth (see [`find_parents`
    /// ](crate::find_parents)) — for a single linear chain the two coincide,
    /// but the rendering is defined in terms of display position, not causal
    /// depth, so it stays well-formed for logs with concurrent branches too.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.items.iter().rev().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if i == 0 {
                write!(f, "{entry}")?;
            } else {
                write!(f, "{}└─{entry}", "  ".repeat(i - 1))?;
            }
        }
        Ok(())
    }
}
