//! Bounded traversal of a (possibly remote, possibly lossy) block store.
//!
//! `bounded_fetch` walks a DAG breadth-first from an initial set of digests,
//! racing every block fetch against [`FetchConfig::timeout`] and degrading
//! gracefully when a block is slow or missing rather than failing the whole
//! traversal. A caller piecing together history from an unreliable peer
//! cares more about "how much did we get" than "did we get everything".

use std::collections::{HashSet, VecDeque};

use mlog_store::{BlockStore, Multihash, StoreError};

use crate::config::FetchConfig;
use crate::entry::{Entry, Payload};
use crate::error::Result;

/// Progress reported to an optional caller-supplied callback as entries are
/// resolved.
///
/// Invoked exactly once per successfully fetched entry, in BFS order.
#[derive(Clone, Debug)]
pub struct FetchProgress<P: Payload> {
    /// Digest of the entry just resolved.
    pub hash: Multihash,
    /// The entry just resolved.
    pub entry: Entry<P>,
    /// The entry whose `next` enqueued this digest, or `None` for a seed.
    pub parent: Option<Entry<P>>,
    /// BFS depth of the entry just resolved, relative to the seed digests
    /// (which are depth 0).
    pub depth: usize,
}

/// Breadth-first, count-bounded fetch starting from `seeds`.
///
/// All seeds share one queue, one seen-cache, and one result budget, so a
/// slow or deep branch under one seed cannot starve the others before they
/// are even touched. `exclude` pre-populates the seen-cache with digests the
/// caller already has, so they are never re-fetched.
///
/// Stops once `max_entries` entries have been resolved or the frontier is
/// exhausted, whichever comes first. A block that times out or comes back
/// `NotFound` is skipped silently — its subtree is simply not explored — but
/// a malformed block (one that fails to parse as an [`Entry`]) or any other
/// backend error aborts the whole traversal, since those indicate the store
/// itself is misbehaving rather than merely being slow or incomplete.
pub async fn bounded_fetch<S, P>(
    store: &S,
    seeds: Vec<Multihash>,
    exclude: &HashSet<Multihash>,
    max_entries: usize,
    config: FetchConfig,
    mut on_progress: impl FnMut(FetchProgress<P>),
) -> Result<Vec<Entry<P>>>
where
    S: BlockStore + ?Sized,
    P: Payload,
{
    let mut queue: VecDeque<(Multihash, Option<Entry<P>>, usize)> =
        seeds.into_iter().map(|h| (h, None, 0)).collect();

    let mut seen: HashSet<Multihash> = exclude.clone();
    let mut result: Vec<Entry<P>> = Vec::new();

    tracing::debug!(queue_len = queue.len(), max_entries, "starting bounded fetch");

    while !queue.is_empty() && result.len() < max_entries {
        let (hash, parent, depth) = queue.pop_front().expect("queue checked non-empty above");
        if !seen.insert(hash) {
            continue;
        }

        tracing::debug!(%hash, depth, queue_len = queue.len(), "fetching block");

        let fetched = tokio::time::timeout(config.timeout, store.get(&hash)).await;
        let bytes = match fetched {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(StoreError::NotFound(_))) => {
                tracing::debug!(%hash, depth, "block not found, skipping subtree");
                continue;
            }
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => {
                tracing::debug!(%hash, depth, timeout = ?config.timeout, "block fetch timed out, skipping subtree");
                continue;
            }
        };

        let entry = Entry::<P>::from_bytes(hash, &bytes)?;
        for next_hash in entry.next() {
            queue.push_back((*next_hash, Some(entry.clone()), depth + 1));
        }

        tracing::debug!(%hash, depth, resolved = result.len() + 1, "block resolved");

        on_progress(FetchProgress {
            hash,
            entry: entry.clone(),
            parent,
            depth,
        });
        result.push(entry);
    }

    Ok(result)
}
