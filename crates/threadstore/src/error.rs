//! Error types for threadstore operations.

use std::fmt;

use thiserror::Error;
use threadstore_types::PeerId;

/// Which symmetric key a validation failure refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymmetricKeyKind {
    Read,
    Follow,
}

impl fmt::Display for SymmetricKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Follow => f.write_str("follow"),
        }
    }
}

/// Input rejected by a mutating call. The call had no effect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The peer id was not derived from the supplied public key.
    #[error("peer id {peer} does not match public key")]
    PublicKeyMismatch { peer: PeerId },

    /// The peer id was not derived from the supplied private key.
    #[error("peer id {peer} does not match private key")]
    PrivateKeyMismatch { peer: PeerId },

    /// A read or follow key with no bytes.
    #[error("{kind} key for {peer} is empty")]
    EmptyKey { kind: SymmetricKeyKind, peer: PeerId },

    /// Metadata keys must be non-empty.
    #[error("metadata key is empty")]
    EmptyMetaKey,
}

/// Errors that can occur during threadstore operations.
///
/// Misses are not errors: lookups return `Option` instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThreadstoreError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Errors loading a [`ThreadstoreConfig`](crate::ThreadstoreConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Convenience type alias for threadstore operations.
pub type Result<T> = std::result::Result<T, ThreadstoreError>;
