//! End-to-end scenarios exercising the CRDT guarantees across the public
//! API surface, using an in-memory block store as the fixture.

use std::collections::HashSet;

use mlog::prelude::*;
use mlog_store_memory::MemoryBlockStore;

async fn build_chain(store: &MemoryBlockStore, id: &str, len: u64) -> Log<String> {
    let mut log = create::<String>(Some(id.to_string()), None, None).unwrap();
    for seq in 0..len {
        log = append(store, &log, format!("{id}{seq}")).await.unwrap();
    }
    log
}

#[tokio::test]
async fn empty_log_has_no_items_and_no_heads() {
    let log = create::<String>(None, None, None).unwrap();
    assert!(log.items().is_empty());
    assert!(log.heads().is_empty());
}

#[tokio::test]
async fn single_entry_log_is_its_own_head() {
    let store = MemoryBlockStore::new();
    let log = build_chain(&store, "A", 1).await;
    assert_eq!(log.items().len(), 1);
    assert_eq!(log.heads(), &[log.items()[0].hash()]);
}

#[tokio::test]
async fn hundred_entry_chain_stays_in_seq_order() {
    let store = MemoryBlockStore::new();
    let log = build_chain(&store, "A", 100).await;
    assert_eq!(log.items().len(), 100);
    let seqs: Vec<u64> = log.items().iter().map(Entry::seq).collect();
    let expected: Vec<u64> = (0..100).collect();
    assert_eq!(seqs, expected);
}

#[tokio::test]
async fn three_chain_log_references_previous_heads() {
    let store = MemoryBlockStore::new();
    let a = build_chain(&store, "A", 2).await;

    let b_entry = Entry::create(&store, "B", 0, "B0".to_string(), a.heads().to_vec())
        .await
        .unwrap();
    let b = create(Some("B".to_string()), Some(vec![b_entry]), None).unwrap();

    let c_entry = Entry::create(&store, "C", 0, "C0".to_string(), b.heads().to_vec())
        .await
        .unwrap();
    let c = create(Some("C".to_string()), Some(vec![c_entry]), None).unwrap();

    let joined = join_all(&[a, b, c], None).unwrap();
    assert_eq!(joined.items().len(), 4);
}

#[tokio::test]
async fn size_capped_join_keeps_causally_recent_suffix() {
    let store = MemoryBlockStore::new();
    let a = build_chain(&store, "A", 5).await;
    let b = build_chain(&store, "B", 5).await;
    let full = join(&a, &b, None, None);
    let capped = join(&a, &b, Some(4), None);

    assert_eq!(capped.items().len(), 4);
    let full_hashes: Vec<Multihash> = full.items().iter().map(Entry::hash).collect();
    let capped_hashes: Vec<Multihash> = capped.items().iter().map(Entry::hash).collect();
    assert_eq!(&capped_hashes[..], &full_hashes[full_hashes.len() - 4..]);
}

#[tokio::test]
async fn round_trip_through_to_multihash_and_from_multihash_preserves_items() {
    let store = MemoryBlockStore::new();
    let log = build_chain(&store, "A", 10).await;
    let hash = to_multihash(&store, &log).await.unwrap();
    let reconstructed: Log<String> = from_multihash(&store, hash, -1, None, |_| {}).await.unwrap();

    let original_hashes: Vec<Multihash> = log.items().iter().map(Entry::hash).collect();
    let reconstructed_hashes: Vec<Multihash> = reconstructed.items().iter().map(Entry::hash).collect();
    assert_eq!(original_hashes, reconstructed_hashes);
}

#[tokio::test]
async fn from_multihash_with_bounded_length_returns_tail_of_requested_size() {
    let store = MemoryBlockStore::new();
    let log = build_chain(&store, "A", 30).await;
    let hash = to_multihash(&store, &log).await.unwrap();
    let reconstructed: Log<String> = from_multihash(&store, hash, 12, None, |_| {}).await.unwrap();
    assert_eq!(reconstructed.items().len(), 12);
}

#[tokio::test]
async fn progress_callback_fires_once_per_item_in_reverse_causal_order() {
    let store = MemoryBlockStore::new();
    let log = build_chain(&store, "A", 8).await;
    let hash = to_multihash(&store, &log).await.unwrap();

    let mut depths = Vec::new();
    let _reconstructed: Log<String> = from_multihash(&store, hash, -1, None, |p| depths.push(p.depth))
        .await
        .unwrap();

    assert_eq!(depths.len(), 8);
    assert!(depths.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn join_excludes_nothing_when_logs_share_no_entries() {
    let store = MemoryBlockStore::new();
    let a = build_chain(&store, "A", 3).await;
    let b = build_chain(&store, "B", 3).await;
    let joined = join(&a, &b, None, None);
    assert_eq!(joined.items().len(), 6);
    let excluded: HashSet<Multihash> = HashSet::new();
    assert!(excluded.is_empty());
}
