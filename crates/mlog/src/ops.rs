//! Log-level operations: `create`, `append`, `join`, `join_all`, `expand`,
//! `from_entry`, `from_multihash`, `to_multihash`.
//!
//! Pure operations (`create`, `join`, `join_all`) never touch the store and
//! never suspend; everything else performs I/O through a [`BlockStore`] and
//! is `async`.

use std::collections::{HashMap, HashSet};

use mlog_store::{BlockStore, Multihash};

use crate::collection::{find_heads, find_tail_hashes, latest_seq};
use crate::config::FetchConfig;
use crate::entry::{ChainId, Entry, Payload};
use crate::error::{LogError, Result};
use crate::fetcher::{bounded_fetch, FetchProgress};
use crate::log::Log;

/// Build a log from a caller-assembled entry set.
///
/// `id` defaults to a fresh random value when not given. `heads`, when not
/// given, is computed from `entries` via [`find_heads`]; when given, it is
/// trusted as-is rather than recomputed, so callers reconstructing a log
/// from a previously-persisted `{id, heads}` image can hand back its exact
/// frontier instead of losing branch information at the sort boundary.
pub fn create<P: Payload>(
    id: Option<ChainId>,
    entries: Option<Vec<Entry<P>>>,
    heads: Option<Vec<Multihash>>,
) -> Result<Log<P>> {
    let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let entries = entries.unwrap_or_default();

    let log = Log::from_entries(id, entries);
    match heads {
        Some(explicit) => Ok(log.with_heads(explicit)),
        None => Ok(log),
    }
}

/// Append a new entry carrying `payload` to `log`'s current heads.
///
/// The new entry's `seq` is one past the highest `seq` in `log`; its `next`
/// is exactly `log.heads()`, so it causally follows every branch currently
/// open on this chain.
pub async fn append<S, P>(store: &S, log: &Log<P>, payload: P) -> Result<Log<P>>
where
    S: BlockStore + ?Sized,
    P: Payload,
{
    let seq = (latest_seq(log.items()) + 1) as u64;
    let entry = Entry::create(store, log.id().to_string(), seq, payload, log.heads().to_vec()).await?;

    tracing::debug!(id = %log.id(), hash = %entry.hash(), seq, "appended entry");

    let mut items = log.items().to_vec();
    items.push(entry);
    Ok(Log::from_entries(log.id().to_string(), items))
}

/// Merge two logs into one, deduplicating by hash and re-sorting.
///
/// The pair is ordered by ascending `id` before merging so that `join(a, b)`
/// and `join(b, a)` build from the identical union; the result's `id`
/// defaults to the first (lexicographically smaller-`id`) log's `id` unless
/// `id` overrides it. When `size` trims the merged set, `heads` is
/// recomputed over the kept entries — see the note on this in
/// [`crate`](crate)'s module documentation for why that choice (rather than
/// preserving possibly-dangling original heads) was made.
pub fn join<P: Payload>(a: &Log<P>, b: &Log<P>, size: Option<usize>, id: Option<ChainId>) -> Log<P> {
    let (first, second) = if a.id() <= b.id() { (a, b) } else { (b, a) };
    let result_id = id.unwrap_or_else(|| first.id().to_string());

    let mut by_hash: HashMap<Multihash, Entry<P>> = HashMap::new();
    for entry in first.items().iter().chain(second.items().iter()) {
        by_hash.entry(entry.hash()).or_insert_with(|| entry.clone());
    }

    let merged: Vec<Entry<P>> = by_hash.into_values().collect();
    let mut log = Log::from_entries(result_id, merged);

    if let Some(size) = size {
        log = log.truncate_to_suffix(size);
    }

    log
}

/// Left fold of [`join`] over `logs`.
///
/// `logs` must contain at least one log; an empty slice returns
/// `InvalidArgument` rather than panicking.
pub fn join_all<P: Payload>(logs: &[Log<P>], size: Option<usize>) -> Result<Log<P>> {
    let mut iter = logs.iter();
    let first = iter
        .next()
        .ok_or_else(|| LogError::InvalidArgument("join_all requires at least one log".into()))?;
    let mut acc = first.clone();
    for log in iter {
        acc = join(&acc, log, size, None);
    }
    Ok(acc)
}

/// Fetch up to `length` additional entries filling in `log`'s missing
/// parents, merge them in, and cap the result to `log.items().len() +
/// length` total entries (or leave it uncapped when `length` is negative).
pub async fn expand<S, P>(
    store: &S,
    log: &Log<P>,
    length: i64,
    on_progress: impl FnMut(FetchProgress<P>),
) -> Result<Log<P>>
where
    S: BlockStore + ?Sized,
    P: Payload,
{
    let tails = find_tail_hashes(log.items());
    tracing::debug!(id = %log.id(), tails = tails.len(), length, "expanding log");
    if tails.is_empty() {
        return Ok(log.clone());
    }

    let budget = if length < 0 {
        usize::MAX
    } else {
        (length as usize).saturating_mul(tails.len()).max(1)
    };

    let already_known: HashSet<Multihash> = log.items().iter().map(Entry::hash).collect();
    let seeds: Vec<Multihash> = tails.into_iter().collect();
    let fetched = bounded_fetch(store, seeds, &already_known, budget, FetchConfig::default(), on_progress).await?;

    let mut merged = log.items().to_vec();
    merged.extend(fetched);
    let merged = Log::from_entries(log.id().to_string(), merged);

    let cap = if length < 0 {
        None
    } else {
        Some(log.items().len() + length as usize)
    };

    Ok(match cap {
        Some(cap) => merged.truncate_to_suffix(cap),
        None => merged,
    })
}

/// Build a log by fetching the ancestors of the given entries.
///
/// `entries` must already be hydrated [`Entry`] values, not hashes — passing
/// an empty set is an `InvalidArgument`. The log's `id` is taken from the
/// first entry. `exclude` seeds the fetcher's seen-set so already-known
/// digests are not re-fetched.
pub async fn from_entry<S, P>(
    store: &S,
    entries: Vec<Entry<P>>,
    length: i64,
    exclude: Option<HashSet<Multihash>>,
    on_progress: impl FnMut(FetchProgress<P>),
) -> Result<Log<P>>
where
    S: BlockStore + ?Sized,
    P: Payload,
{
    let first = entries
        .first()
        .ok_or_else(|| LogError::InvalidArgument("from_entry requires at least one entry".into()))?;
    let id = first.id().to_string();

    tracing::debug!(id = %id, entries = entries.len(), length, "building log from entries");

    let excluded = exclude.unwrap_or_default();
    let budget = if length < 0 {
        usize::MAX
    } else {
        (length as usize).saturating_sub(entries.len())
    };

    let seeds: Vec<Multihash> = entries.iter().flat_map(|e| e.next().iter().copied()).collect();
    let fetched = bounded_fetch(store, seeds, &excluded, budget, FetchConfig::default(), on_progress).await?;

    let mut all = entries;
    all.extend(fetched);
    Ok(Log::from_entries(id, all))
}

/// Build a log from a previously-persisted `{id, heads}` image.
pub async fn from_multihash<S, P>(
    store: &S,
    hash: Multihash,
    length: i64,
    exclude: Option<HashSet<Multihash>>,
    on_progress: impl FnMut(FetchProgress<P>),
) -> Result<Log<P>>
where
    S: BlockStore + ?Sized,
    P: Payload,
{
    tracing::debug!(%hash, length, "loading log from multihash");
    let bytes = store.get(&hash).await?;
    let (id, heads) = Log::<P>::parse_image(&bytes)?;

    let excluded = exclude.unwrap_or_default();
    let budget = if length < 0 { usize::MAX } else { length as usize };

    let fetched = bounded_fetch(store, heads.clone(), &excluded, budget, FetchConfig::default(), on_progress).await?;

    Ok(Log::from_entries(id, fetched).with_heads(heads))
}

/// Persist `log`'s `{id, heads}` image and return its digest.
pub async fn to_multihash<S, P>(store: &S, log: &Log<P>) -> Result<Multihash>
where
    S: BlockStore + ?Sized,
    P: Payload,
{
    if log.items().is_empty() || log.heads().is_empty() {
        return Err(LogError::EmptyLog);
    }
    let bytes = log.to_bytes()?;
    let hash = store.put(&bytes).await?;
    tracing::debug!(id = %log.id(), %hash, "persisted log image");
    Ok(hash)
}
