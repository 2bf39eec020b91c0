#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! **mlog-store** – the content-addressed block-store contract used by `mlog`.
//!
//! This crate defines the boundary between the Merkle-DAG log core and whatever
//! durable, possibly-networked storage an embedder chooses to run behind it. It
//! deliberately ships no concrete backend of its own — see `mlog-store-memory`
//! for the one reference implementation this workspace provides for tests and
//! small embedders.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

//─────────────────────────────
//  Multihash
//─────────────────────────────

/// Number of bytes in a digest produced by this crate's reference hasher.
pub const DIGEST_LEN: usize = 32;

/// The content-address of a blob stored in a [`BlockStore`].
///
/// Wraps a 32-byte digest. The wire/string form is base58 (matching common
/// content-addressing conventions); ordering is defined over the raw bytes so
/// that comparisons are stable regardless of string-encoding quirks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Multihash([u8; DIGEST_LEN]);

impl Multihash {
    /// Wrap a raw digest.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// View the digest as a byte slice.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Render as the base58 string used at the external interface.
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }
}

impl fmt::Display for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl fmt::Debug for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multihash({})", self.to_base58())
    }
}

impl FromStr for Multihash {
    type Err = InvalidHash;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|_| InvalidHash(s.to_string()))?;
        let bytes: [u8; DIGEST_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| InvalidHash(s.to_string()))?;
        Ok(Self(bytes))
    }
}

/// The string did not decode into a well-formed [`Multihash`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid multihash: {0}")]
pub struct InvalidHash(pub String);

/// Compute the reference digest of `bytes`.
///
/// `mlog-store` itself does not mandate a hash function — the contract only
/// requires that `put` be deterministic and content-addressed — but it ships
/// this Blake3-based helper so backends (and tests) don't each reinvent it.
pub fn digest(bytes: &[u8]) -> Multihash {
    Multihash(*blake3::hash(bytes).as_bytes())
}

//─────────────────────────────
//  Block-store contract
//─────────────────────────────

/// Errors a [`BlockStore`] backend can surface.
///
/// This is the "underlying" error the core crate's own `LogError::StoreError`
/// wraps; backends are free to add their own richer error types internally and
/// fold them down to one of these variants at the trait boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// No blob is stored under the requested digest.
    #[error("no blob stored under digest {0}")]
    NotFound(Multihash),
    /// The backend failed for a reason opaque to this contract (disk I/O,
    /// network failure, corruption, ...).
    #[error("block store backend error: {0}")]
    Backend(String),
}

/// Content-addressed blob store.
///
/// Implementations store opaque byte blobs keyed by the digest `put` assigns
/// them. The trait is async because real backends (disk, network) suspend;
/// the in-memory reference implementation in `mlog-store-memory` never
/// actually awaits anything.
///
/// # Absence semantics
///
/// [`get`](BlockStore::get) returning [`StoreError::NotFound`] is an expected,
/// routine outcome — not-yet-replicated or not-yet-fetched blobs are normal in
/// a partially-synced DAG. Callers that want "absence is fine" semantics
/// (the bounded fetcher) match on this variant explicitly rather than
/// treating every error as fatal.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Store `bytes` and return the digest they were stored under.
    ///
    /// Writes are idempotent: storing identical bytes twice returns the same
    /// digest and must not be treated as an error.
    async fn put(&self, bytes: &[u8]) -> Result<Multihash, StoreError>;

    /// Retrieve the bytes previously stored under `hash`.
    async fn get(&self, hash: &Multihash) -> Result<Vec<u8>, StoreError>;

    /// Check whether `hash` is currently stored, without retrieving it.
    async fn has(&self, hash: &Multihash) -> Result<bool, StoreError> {
        match self.get(hash).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
