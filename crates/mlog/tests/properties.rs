//! Property-based tests for the universally-quantified laws SPEC_FULL.md
//! demands of the sort algorithm and the join semilattice: "for any
//! permutation" and "for any logs a, b, c". Async setup runs through
//! `tokio_test::block_on` inside each synchronous `proptest!` case, pairing
//! the two the same way a property test that needs real I/O does elsewhere
//! in this workspace.

use mlog::prelude::*;
use mlog::sort_entries;
use mlog_store_memory::MemoryBlockStore;
use proptest::prelude::*;

async fn build_chain(store: &MemoryBlockStore, id: &str, len: u64) -> Log<String> {
    let mut log = create::<String>(Some(id.to_string()), None, None).unwrap();
    for seq in 0..len {
        log = append(store, &log, format!("{id}{seq}")).await.unwrap();
    }
    log
}

/// Reorder `items` by sorting alongside arbitrary `weights` — a cheap way to
/// get an arbitrary permutation out of proptest without a dedicated shuffle
/// strategy.
fn permute<T: Clone>(items: &[T], weights: &[usize]) -> Vec<T> {
    let mut paired: Vec<(usize, T)> = weights.iter().copied().zip(items.iter().cloned()).collect();
    paired.sort_by_key(|(w, _)| *w);
    paired.into_iter().map(|(_, item)| item).collect()
}

proptest! {
    #[test]
    fn sort_is_invariant_to_any_permutation(weights in proptest::collection::vec(0usize..1000, 1..12)) {
        let log = tokio_test::block_on(async {
            let store = MemoryBlockStore::new();
            build_chain(&store, "A", weights.len() as u64).await
        });
        let entries = log.items().to_vec();

        let canonical = sort_entries(&entries);
        let shuffled = permute(&entries, &weights);
        let resorted = sort_entries(&shuffled);

        prop_assert_eq!(
            canonical.iter().map(Entry::hash).collect::<Vec<_>>(),
            resorted.iter().map(Entry::hash).collect::<Vec<_>>()
        );
    }

    #[test]
    fn sort_is_idempotent_for_any_chain_length(len in 0u64..15) {
        let log = tokio_test::block_on(async {
            let store = MemoryBlockStore::new();
            build_chain(&store, "A", len).await
        });
        let once = sort_entries(log.items());
        let twice = sort_entries(&once);
        prop_assert_eq!(
            once.iter().map(Entry::hash).collect::<Vec<_>>(),
            twice.iter().map(Entry::hash).collect::<Vec<_>>()
        );
    }

    #[test]
    fn join_is_commutative_for_any_pair_of_logs(la in 0u64..8, lb in 0u64..8) {
        let (a, b) = tokio_test::block_on(async {
            let store = MemoryBlockStore::new();
            let a = build_chain(&store, "A", la).await;
            let b = build_chain(&store, "B", lb).await;
            (a, b)
        });

        let ab = join(&a, &b, None, None);
        let ba = join(&b, &a, None, None);

        prop_assert_eq!(
            ab.items().iter().map(Entry::hash).collect::<Vec<_>>(),
            ba.items().iter().map(Entry::hash).collect::<Vec<_>>()
        );
    }

    #[test]
    fn join_is_associative_for_any_three_logs(la in 0u64..6, lb in 0u64..6, lc in 0u64..6) {
        let (a, b, c) = tokio_test::block_on(async {
            let store = MemoryBlockStore::new();
            let a = build_chain(&store, "A", la).await;
            let b = build_chain(&store, "B", lb).await;
            let c = build_chain(&store, "C", lc).await;
            (a, b, c)
        });

        let left = join(&join(&a, &b, None, None), &c, None, None);
        let right = join(&a, &join(&b, &c, None, None), None, None);

        prop_assert_eq!(
            left.items().iter().map(Entry::hash).collect::<Vec<_>>(),
            right.items().iter().map(Entry::hash).collect::<Vec<_>>()
        );
    }

    #[test]
    fn join_is_idempotent_for_any_pair_of_logs(la in 0u64..8, lb in 0u64..8) {
        let (a, b) = tokio_test::block_on(async {
            let store = MemoryBlockStore::new();
            let a = build_chain(&store, "A", la).await;
            let b = build_chain(&store, "B", lb).await;
            (a, b)
        });

        let merged = join(&a, &b, None, None);
        let self_joined = join(&merged, &merged, None, None);

        prop_assert_eq!(
            merged.items().iter().map(Entry::hash).collect::<Vec<_>>(),
            self_joined.items().iter().map(Entry::hash).collect::<Vec<_>>()
        );
    }
}
