//! The book traits making up a threadstore.
//!
//! Any backend (in-memory, on-disk) implements these to back one node of a
//! threaded-log replication system.

use std::collections::BTreeSet;
use std::time::Duration;

use threadstore_crypto::{PrivateKey, PublicKey, SymmetricKey};
use threadstore_types::{MetaValue, Multiaddr, PeerId, ThreadId};

use crate::cancel::CancelSignal;
use crate::error::Result;
use crate::info::ThreadInfo;
use crate::stream::AddrStream;

/// Key material of the logs in each thread.
///
/// Implementations must be thread-safe and must reject any key whose peer id
/// binding does not verify. Lookups never fail; a miss is `None`.
pub trait KeyBook: Send + Sync {
    /// The public key of `peer` in `thread`.
    ///
    /// When nothing is stored but the peer id embeds its key, the embedded
    /// key is returned and remembered.
    fn pub_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<PublicKey>;

    /// Store `key` for `peer`, replacing any previous public key.
    ///
    /// Fails if `peer` was not derived from `key`.
    fn add_pub_key(&self, thread: &ThreadId, peer: &PeerId, key: PublicKey) -> Result<()>;

    /// The private key of `peer` in `thread`.
    fn priv_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<PrivateKey>;

    /// Store `key` for `peer`, replacing any previous private key.
    ///
    /// Fails if `peer` was not derived from `key`'s public half.
    fn add_priv_key(&self, thread: &ThreadId, peer: &PeerId, key: PrivateKey) -> Result<()>;

    /// The read key of `peer` in `thread`.
    fn read_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<SymmetricKey>;

    /// Store a read key. Fails if `key` is empty.
    fn add_read_key(&self, thread: &ThreadId, peer: &PeerId, key: SymmetricKey) -> Result<()>;

    /// The follow key of `peer` in `thread`.
    fn follow_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<SymmetricKey>;

    /// Store a follow key. Fails if `key` is empty.
    fn add_follow_key(&self, thread: &ThreadId, peer: &PeerId, key: SymmetricKey) -> Result<()>;

    /// Peers with a public or private key in `thread`, sorted and deduplicated.
    fn logs_with_keys(&self, thread: &ThreadId) -> Vec<PeerId>;

    /// Threads with any key material, sorted and deduplicated.
    fn threads_from_keys(&self) -> Vec<ThreadId>;
}

/// Addresses of the logs in each thread, with expiry and live subscriptions.
pub trait AddrBook: Send + Sync {
    /// Add or refresh one address. See [`AddrBook::add_addrs`].
    fn add_addr(&self, thread: &ThreadId, peer: &PeerId, addr: Multiaddr, ttl: Duration) {
        self.add_addrs(thread, peer, std::slice::from_ref(&addr), ttl);
    }

    /// Add or refresh addresses, each expiring `ttl` from now.
    ///
    /// Must never wait on subscribers: delivery to open [`AddrStream`]s is
    /// asynchronous.
    fn add_addrs(&self, thread: &ThreadId, peer: &PeerId, addrs: &[Multiaddr], ttl: Duration);

    /// Snapshot of the unexpired addresses of `peer` in `thread`.
    fn addrs(&self, thread: &ThreadId, peer: &PeerId) -> Vec<Multiaddr>;

    /// Subscribe to the addresses of `peer` in `thread`.
    ///
    /// The stream first yields every unexpired address, then each newly
    /// added one exactly once, until `cancel` fires. Called outside a Tokio
    /// runtime, the stream has already ended.
    fn addr_stream(&self, cancel: CancelSignal, thread: &ThreadId, peer: &PeerId) -> AddrStream;

    /// Peers with unexpired addresses in `thread`, sorted.
    fn logs_with_addrs(&self, thread: &ThreadId) -> Vec<PeerId>;

    /// Threads with any unexpired address, sorted.
    fn threads_from_addrs(&self) -> Vec<ThreadId>;
}

/// Free-form per-thread bookkeeping. The store never interprets values.
pub trait MetadataBook: Send + Sync {
    /// Associate `value` with `key` in `thread`. The last write wins.
    ///
    /// Fails if `key` is empty.
    fn put_meta(&self, thread: &ThreadId, key: &str, value: MetaValue) -> Result<()>;

    /// The value stored under `key` in `thread`.
    fn get_meta(&self, thread: &ThreadId, key: &str) -> Option<MetaValue>;

    /// Threads with any metadata, sorted.
    fn threads_from_meta(&self) -> Vec<ThreadId>;
}

/// The full store: all three books plus aggregate queries.
///
/// Aggregates join the books without a common lock, so a concurrent writer
/// may be observed in one book and not yet in another.
pub trait Threadstore: KeyBook + AddrBook + MetadataBook {
    /// Every thread known to any book.
    fn threads(&self) -> Vec<ThreadId> {
        let mut threads: BTreeSet<ThreadId> = self.threads_from_keys().into_iter().collect();
        threads.extend(self.threads_from_addrs());
        threads.extend(self.threads_from_meta());
        threads.into_iter().collect()
    }

    /// The logs of `thread`, from both key material and addresses.
    fn thread_info(&self, thread: &ThreadId) -> ThreadInfo {
        let mut logs: BTreeSet<PeerId> = self.logs_with_keys(thread).into_iter().collect();
        logs.extend(self.logs_with_addrs(thread));
        ThreadInfo {
            id: *thread,
            logs: logs.into_iter().collect(),
        }
    }

    /// End every open address subscription.
    fn close(&self);
}
