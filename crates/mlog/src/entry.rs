//! The immutable DAG record: `{id, seq, payload, next, hash}`.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use mlog_store::{BlockStore, Multihash};

use crate::error::{LogError, Result};

/// Marker trait for anything that can ride as an entry payload.
///
/// Automatically implemented for any type satisfying the bounds — this
/// exists only so call sites don't have to spell out the full `where`
/// clause on every function.
pub trait Payload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}
impl<T> Payload for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// The chain identifier an [`Entry`] or [`Log`](crate::Log) belongs to.
pub type ChainId = String;

/// An immutable record in the Merkle-DAG log.
///
/// Entries are never mutated after construction; every field but `hash` is
/// supplied at creation time, and `hash` is assigned once the entry's
/// canonical image has been written to the block store.
#[derive(Clone, Debug)]
pub struct Entry<P: Payload> {
    id: ChainId,
    seq: u64,
    payload: P,
    next: Vec<Multihash>,
    hash: Multihash,
}

/// The on-store wire image of an entry: `{id, seq, payload, next}`.
///
/// Field order is fixed by this struct's declaration order, which is what
/// makes the JSON encoding canonical — `serde_json` serializes struct fields
/// in declaration order, not alphabetically.
#[derive(Serialize, Deserialize)]
struct EntryImage<P> {
    id: ChainId,
    seq: u64,
    payload: P,
    next: Vec<String>,
}

impl<P: Payload> Entry<P> {
    /// Validate inputs, persist the canonical image, and return the entry
    /// with its digest populated.
    ///
    /// `next` is taken as given: callers hand in a plain sequence of parent
    /// digests, already typed as `Multihash`, so there is nothing here to
    /// normalize or strip.
    pub async fn create<S: BlockStore + ?Sized>(
        store: &S,
        id: impl Into<ChainId>,
        seq: u64,
        payload: P,
        next: Vec<Multihash>,
    ) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(LogError::InvalidArgument("entry id must not be empty".into()));
        }

        let image = EntryImage {
            id: id.clone(),
            seq,
            payload: payload.clone(),
            next: next.iter().map(Multihash::to_base58).collect(),
        };
        let bytes = serde_json::to_vec(&image)?;
        let hash = store.put(&bytes).await?;

        tracing::debug!(id = %id, seq, hash = %hash, "entry created");

        Ok(Self {
            id,
            seq,
            payload,
            next,
            hash,
        })
    }

    /// Fetch the image at `hash` and parse it into an entry.
    pub async fn from_hash<S: BlockStore + ?Sized>(store: &S, hash: Multihash) -> Result<Self> {
        let bytes = store.get(&hash).await?;
        Self::from_bytes(hash, &bytes)
    }

    /// Parse a previously-fetched image, assigning it `hash` as its digest.
    ///
    /// Split out from [`from_hash`](Self::from_hash) so the bounded fetcher
    /// can parse bytes it already raced against a timeout to obtain.
    pub(crate) fn from_bytes(hash: Multihash, bytes: &[u8]) -> Result<Self> {
        let image: EntryImage<P> = serde_json::from_slice(bytes)?;
        let next = image
            .next
            .iter()
            .map(|s| s.parse::<Multihash>())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            id: image.id,
            seq: image.seq,
            payload: image.payload,
            next,
            hash,
        })
    }

    /// The chain identifier this entry belongs to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The entry's position within its chain (0 for the first entry).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The entry's payload.
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// The digests of this entry's immediate causal parents.
    pub fn next(&self) -> &[Multihash] {
        &self.next
    }

    /// This entry's content digest.
    pub fn hash(&self) -> Multihash {
        self.hash
    }

    /// `true` iff `other`'s digest appears in `self.next` — i.e. `self` was
    /// created causally after `other` and references it directly as a
    /// parent.
    pub fn has_child(&self, other: &Entry<P>) -> bool {
        self.next.contains(&other.hash)
    }
}

impl<P: Payload> PartialEq for Entry<P> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}
impl<P: Payload> Eq for Entry<P> {}

impl<P: Payload + fmt::Display> fmt::Display for Entry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload)
    }
}
