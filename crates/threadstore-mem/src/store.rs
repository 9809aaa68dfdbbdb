use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use threadstore::{
    AddrBook, AddrStream, CancelSignal, KeyBook, MetadataBook, Result, Threadstore,
    ThreadstoreConfig,
};
use threadstore_crypto::{PrivateKey, PublicKey, SymmetricKey};
use threadstore_types::{Clock, MetaValue, Multiaddr, PeerId, SystemClock, ThreadId};

use crate::addrbook::MemoryAddrBook;
use crate::keybook::MemoryKeyBook;
use crate::metadata::MemoryMetadataBook;

/// In-memory [`Threadstore`]: the three memory books behind one value.
///
/// Holds no lock of its own; each call goes to exactly one book, and the
/// aggregate queries join the books one after the other.
#[derive(Debug)]
pub struct MemoryThreadstore {
    keys: MemoryKeyBook,
    addrs: MemoryAddrBook,
    meta: MemoryMetadataBook,
}

impl MemoryThreadstore {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ThreadstoreConfig::default())
    }

    /// Create an empty store on the system clock.
    pub fn with_config(config: ThreadstoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an empty store with an explicit clock for address expiry.
    pub fn with_clock(config: ThreadstoreConfig, clock: Arc<dyn Clock>) -> Self {
        info!(ttl_refresh = ?config.ttl_refresh, "memory threadstore created");
        Self {
            keys: MemoryKeyBook::new(),
            addrs: MemoryAddrBook::with_clock(clock, config.ttl_refresh),
            meta: MemoryMetadataBook::new(),
        }
    }

    pub fn key_book(&self) -> &MemoryKeyBook {
        &self.keys
    }

    pub fn addr_book(&self) -> &MemoryAddrBook {
        &self.addrs
    }

    pub fn metadata_book(&self) -> &MemoryMetadataBook {
        &self.meta
    }
}

impl Default for MemoryThreadstore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBook for MemoryThreadstore {
    fn pub_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<PublicKey> {
        self.keys.pub_key(thread, peer)
    }

    fn add_pub_key(&self, thread: &ThreadId, peer: &PeerId, key: PublicKey) -> Result<()> {
        self.keys.add_pub_key(thread, peer, key)
    }

    fn priv_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<PrivateKey> {
        self.keys.priv_key(thread, peer)
    }

    fn add_priv_key(&self, thread: &ThreadId, peer: &PeerId, key: PrivateKey) -> Result<()> {
        self.keys.add_priv_key(thread, peer, key)
    }

    fn read_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<SymmetricKey> {
        self.keys.read_key(thread, peer)
    }

    fn add_read_key(&self, thread: &ThreadId, peer: &PeerId, key: SymmetricKey) -> Result<()> {
        self.keys.add_read_key(thread, peer, key)
    }

    fn follow_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<SymmetricKey> {
        self.keys.follow_key(thread, peer)
    }

    fn add_follow_key(&self, thread: &ThreadId, peer: &PeerId, key: SymmetricKey) -> Result<()> {
        self.keys.add_follow_key(thread, peer, key)
    }

    fn logs_with_keys(&self, thread: &ThreadId) -> Vec<PeerId> {
        self.keys.logs_with_keys(thread)
    }

    fn threads_from_keys(&self) -> Vec<ThreadId> {
        self.keys.threads_from_keys()
    }
}

impl AddrBook for MemoryThreadstore {
    fn add_addrs(&self, thread: &ThreadId, peer: &PeerId, addrs: &[Multiaddr], ttl: Duration) {
        self.addrs.add_addrs(thread, peer, addrs, ttl)
    }

    fn addrs(&self, thread: &ThreadId, peer: &PeerId) -> Vec<Multiaddr> {
        self.addrs.addrs(thread, peer)
    }

    fn addr_stream(&self, cancel: CancelSignal, thread: &ThreadId, peer: &PeerId) -> AddrStream {
        self.addrs.addr_stream(cancel, thread, peer)
    }

    fn logs_with_addrs(&self, thread: &ThreadId) -> Vec<PeerId> {
        self.addrs.logs_with_addrs(thread)
    }

    fn threads_from_addrs(&self) -> Vec<ThreadId> {
        self.addrs.threads_from_addrs()
    }
}

impl MetadataBook for MemoryThreadstore {
    fn put_meta(&self, thread: &ThreadId, key: &str, value: MetaValue) -> Result<()> {
        self.meta.put_meta(thread, key, value)
    }

    fn get_meta(&self, thread: &ThreadId, key: &str) -> Option<MetaValue> {
        self.meta.get_meta(thread, key)
    }

    fn threads_from_meta(&self) -> Vec<ThreadId> {
        self.meta.threads_from_meta()
    }
}

impl Threadstore for MemoryThreadstore {
    fn close(&self) {
        self.addrs.close();
        info!("memory threadstore closed");
    }
}
