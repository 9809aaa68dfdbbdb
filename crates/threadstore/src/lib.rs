//! Interfaces of the threadstore.
//!
//! A threadstore is the local, in-process data store behind one node of a
//! threaded-log replication system. Per thread it holds the key material of
//! the participating logs, the addresses those logs can be reached at, and
//! free-form bookkeeping metadata.
//!
//! # Architecture
//!
//! - **Key book** — (thread, peer) → public/private/read/follow keys. Peer ids
//!   are verified against the keys they are stored with.
//! - **Address book** — (thread, peer) → addresses with expiry, plus live
//!   [`AddrStream`] subscriptions that deliver newly learned addresses.
//! - **Metadata book** — thread → (key → [`MetaValue`]), last write wins.
//! - **Threadstore** — the three books together, with aggregate queries.
//!
//! # Modules
//!
//! - [`error`] — Error types for book operations and configuration
//! - [`traits`] — The [`KeyBook`], [`AddrBook`], [`MetadataBook`], and
//!   [`Threadstore`] traits
//! - [`stream`] — [`AddrStream`], the consumer end of an address subscription
//! - [`cancel`] — [`CancelHandle`]/[`CancelSignal`] for ending subscriptions
//! - [`config`] — [`ThreadstoreConfig`] and the TTL refresh policy
//! - [`ttl`] — Well-known address TTLs
//! - [`info`] — [`ThreadInfo`] summaries

pub mod cancel;
pub mod config;
pub mod error;
pub mod info;
pub mod stream;
pub mod traits;
pub mod ttl;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use config::{ThreadstoreConfig, TtlRefresh};
pub use error::{ConfigError, Result, SymmetricKeyKind, ThreadstoreError, ValidationError};
pub use info::ThreadInfo;
pub use stream::AddrStream;
pub use traits::{AddrBook, KeyBook, MetadataBook, Threadstore};

pub use threadstore_crypto::{PrivateKey, PublicKey, SymmetricKey};
pub use threadstore_types::{Clock, Expiry, MetaValue, Multiaddr, PeerId, ThreadId};
