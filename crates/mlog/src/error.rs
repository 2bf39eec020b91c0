//! Error types for the Merkle-DAG log.
//!
//! This module defines every error condition the public API can surface, in
//! three groups: precondition errors (raised synchronously, before any I/O),
//! format errors (raised while hydrating bytes fetched from the store), and
//! transient I/O errors (raised by the store itself).

use thiserror::Error;

/// Result type alias used throughout this crate.
pub type Result<T> = std::result::Result<T, LogError>;

/// Errors surfaced at the `mlog` public API boundary.
#[derive(Debug, Error)]
pub enum LogError {
    /// An operation that requires a block store was called without one.
    #[error("store not defined")]
    StoreNotDefined,

    /// An operation that requires a log was called without one.
    #[error("log not defined")]
    LogNotDefined,

    /// An argument failed validation before any I/O was attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A string did not parse into a well-formed digest.
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    /// Bytes fetched from the store did not match the expected `{id, heads}`
    /// log schema.
    #[error("value is not a log")]
    NotALog,

    /// An operation that requires a non-empty log (e.g. `to_multihash`) was
    /// given one with no items or no heads.
    #[error("log is empty")]
    EmptyLog,

    /// Bytes fetched from the store did not parse as the expected entry or
    /// log schema.
    #[error("failed to parse stored value: {0}")]
    ParseError(String),

    /// The block store reported a non-recoverable backend error.
    #[error("block store error: {0}")]
    Store(#[from] mlog_store::StoreError),
}

impl From<serde_json::Error> for LogError {
    fn from(err: serde_json::Error) -> Self {
        LogError::ParseError(err.to_string())
    }
}

impl From<mlog_store::InvalidHash> for LogError {
    fn from(err: mlog_store::InvalidHash) -> Self {
        LogError::ParseError(err.to_string())
    }
}
