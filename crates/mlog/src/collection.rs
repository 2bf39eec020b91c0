//! Pure, I/O-free operations over slices of [`Entry`] — heads, tails, parent
//! chains, and the deterministic total-ordering sort that is the heart of
//! this crate's CRDT guarantees.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use mlog_store::Multihash;

use crate::entry::{Entry, Payload};

/// Ascending `(id, seq)` key used to tie-break concurrent chains everywhere
/// in this module. Centralized here so every sort site uses the same rule —
/// the CRDT's determinism depends on that.
fn order_key<P: Payload>(e: &Entry<P>) -> (&str, u64) {
    (e.id(), e.seq())
}

/// Entries in `entries` that no other entry in `entries` references via
/// `next`. Ordered ascending by `(id, hash)`.
pub fn find_heads<P: Payload>(entries: &[Entry<P>]) -> Vec<Entry<P>> {
    let referenced: HashSet<Multihash> = entries.iter().flat_map(|e| e.next().iter().copied()).collect();
    let mut heads: Vec<Entry<P>> = entries
        .iter()
        .filter(|e| !referenced.contains(&e.hash()))
        .cloned()
        .collect();
    heads.sort_by(|a, b| (a.id(), a.hash()).cmp(&(b.id(), b.hash())));
    heads
}

/// Entries in `entries` whose `next` references at least one digest absent
/// from `entries`, plus entries with an empty `next`. These seed the sort in
/// §4.3 as the roots of the (possibly partial) DAG under consideration.
pub fn find_tails<P: Payload>(entries: &[Entry<P>]) -> Vec<Entry<P>> {
    let known: HashSet<Multihash> = entries.iter().map(|e| e.hash()).collect();
    entries
        .iter()
        .filter(|e| e.next().is_empty() || e.next().iter().any(|h| !known.contains(h)))
        .cloned()
        .collect()
}

/// Digests referenced by some entry's `next` but not themselves the hash of
/// any entry in `entries` — the missing-parent frontier.
pub fn find_tail_hashes<P: Payload>(entries: &[Entry<P>]) -> BTreeSet<Multihash> {
    let known: HashSet<Multihash> = entries.iter().map(|e| e.hash()).collect();
    entries
        .iter()
        .flat_map(|e| e.next().iter().copied())
        .filter(|h| !known.contains(h))
        .collect()
}

/// The full set of ancestors of `entry` reachable within `entries` by
/// repeatedly following `next` pointers, ordered ascending by `seq`.
///
/// Used to introspect a DAG's depth; the log's own [`to_string`
/// rendering][crate::Log::render] does not use this (see that function's
/// docs for why), but it is useful on its own for diagnostics and tests.
pub fn find_parents<P: Payload>(entry: &Entry<P>, entries: &[Entry<P>]) -> Vec<Entry<P>> {
    let index: HashMap<Multihash, &Entry<P>> = entries.iter().map(|e| (e.hash(), e)).collect();
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut frontier: Vec<Multihash> = entry.next().to_vec();

    while let Some(hash) = frontier.pop() {
        if !seen.insert(hash) {
            continue;
        }
        if let Some(parent) = index.get(&hash) {
            chain.push((*parent).clone());
            frontier.extend(parent.next().iter().copied());
        }
    }

    chain.sort_by_key(|e| e.seq());
    chain
}

/// The maximum `seq` observed in `entries`, or `-1` if empty.
pub fn latest_seq<P: Payload>(entries: &[Entry<P>]) -> i64 {
    entries.iter().map(|e| e.seq() as i64).max().unwrap_or(-1)
}

/// Deterministically flatten the partial order formed by `entries` into a
/// single total order.
///
/// Entries are requeued behind any still-pending parent or lower-`seq`
/// sibling so that causal order and `(id, seq)` interleaving both hold.
/// The output depends only on the entry set, never on `entries`'s incoming
/// order, so re-sorting an already-sorted set is a no-op.
pub fn sort_entries<P: Payload>(entries: &[Entry<P>]) -> Vec<Entry<P>> {
    if entries.is_empty() {
        return Vec::new();
    }

    let index: HashMap<Multihash, Entry<P>> = entries.iter().map(|e| (e.hash(), e.clone())).collect();

    let mut tails = find_tails(entries);
    tails.sort_by(|a, b| order_key(a).cmp(&order_key(b)));

    let mut queue: VecDeque<Multihash> = tails.iter().map(|e| e.hash()).collect();
    let mut processed: HashSet<Multihash> = HashSet::new();
    let mut result: Vec<Entry<P>> = Vec::with_capacity(entries.len());

    while let Some(hash) = queue.pop_front() {
        if processed.contains(&hash) {
            continue;
        }
        let entry = index
            .get(&hash)
            .expect("queue only ever holds digests present in the input set")
            .clone();

        let pending_parent_pos = entry
            .next()
            .iter()
            .filter_map(|parent_hash| queue.iter().position(|h| h == parent_hash))
            .max();
        if let Some(pos) = pending_parent_pos {
            queue.insert(pos + 1, hash);
            continue;
        }

        let pending_sibling_pos = queue
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                index
                    .get(h)
                    .map(|sibling| sibling.id() == entry.id() && sibling.seq() < entry.seq())
                    .unwrap_or(false)
            })
            .map(|(pos, _)| pos)
            .max();
        if let Some(pos) = pending_sibling_pos {
            queue.insert(pos + 1, hash);
            continue;
        }

        processed.insert(hash);

        let mut children: Vec<&Entry<P>> = entries.iter().filter(|c| c.has_child(&entry)).collect();
        children.sort_by(|a, b| order_key(a).cmp(&order_key(b)));
        for child in children {
            queue.push_back(child.hash());
        }

        result.push(entry);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlog_store_memory::MemoryBlockStore;

    async fn chain(store: &MemoryBlockStore, id: &str, len: u64) -> Vec<Entry<String>> {
        let mut entries = Vec::new();
        let mut next = Vec::new();
        for seq in 0..len {
            let e = Entry::create(store, id, seq, format!("{id}{seq}"), next.clone())
                .await
                .unwrap();
            next = vec![e.hash()];
            entries.push(e);
        }
        entries
    }

    #[tokio::test]
    async fn find_heads_of_single_chain_is_the_last_entry() {
        let store = MemoryBlockStore::new();
        let entries = chain(&store, "A", 5).await;
        let heads = find_heads(&entries);
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].hash(), entries[4].hash());
    }

    #[tokio::test]
    async fn find_tails_of_single_chain_is_the_first_entry() {
        let store = MemoryBlockStore::new();
        let entries = chain(&store, "A", 5).await;
        let tails = find_tails(&entries);
        assert_eq!(tails.len(), 1);
        assert_eq!(tails[0].hash(), entries[0].hash());
    }

    #[tokio::test]
    async fn latest_seq_of_empty_set_is_negative_one() {
        let entries: Vec<Entry<String>> = Vec::new();
        assert_eq!(latest_seq(&entries), -1);
    }

    #[tokio::test]
    async fn sort_is_idempotent() {
        let store = MemoryBlockStore::new();
        let entries = chain(&store, "A", 10).await;
        let once = sort_entries(&entries);
        let twice = sort_entries(&once);
        assert_eq!(
            once.iter().map(Entry::hash).collect::<Vec<_>>(),
            twice.iter().map(Entry::hash).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn sort_is_invariant_to_input_order() {
        let store = MemoryBlockStore::new();
        let mut entries = chain(&store, "A", 10).await;
        let forward = sort_entries(&entries);
        entries.reverse();
        let reversed_input = sort_entries(&entries);
        assert_eq!(
            forward.iter().map(Entry::hash).collect::<Vec<_>>(),
            reversed_input.iter().map(Entry::hash).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn sort_interleaves_concurrent_chains_by_ascending_id() {
        let store = MemoryBlockStore::new();
        let mut entries = chain(&store, "A", 3).await;
        entries.extend(chain(&store, "B", 3).await);
        let sorted = sort_entries(&entries);
        let ids: Vec<&str> = sorted.iter().map(Entry::id).collect();
        assert_eq!(ids, vec!["A", "B", "A", "B", "A", "B"]);
    }

    #[tokio::test]
    async fn sort_preserves_causal_order_within_a_chain() {
        let store = MemoryBlockStore::new();
        let entries = chain(&store, "A", 5).await;
        let sorted = sort_entries(&entries);
        let seqs: Vec<u64> = sorted.iter().map(Entry::seq).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
    }
}
