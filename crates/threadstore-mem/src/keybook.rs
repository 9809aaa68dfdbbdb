//! In-memory key book.
//!
//! [`MemoryKeyBook`] keeps one `BTreeMap` per key kind, keyed by
//! (thread, peer), all behind a single `RwLock`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use threadstore::{KeyBook, Result, SymmetricKeyKind, ValidationError};
use threadstore_crypto::{PrivateKey, PublicKey, SymmetricKey};
use threadstore_types::{PeerId, ThreadId};

use crate::log_key::{log_key, thread_range, LogKey};

#[derive(Default)]
struct KeyState {
    pub_keys: BTreeMap<LogKey, PublicKey>,
    priv_keys: BTreeMap<LogKey, PrivateKey>,
    read_keys: BTreeMap<LogKey, SymmetricKey>,
    follow_keys: BTreeMap<LogKey, SymmetricKey>,
}

impl KeyState {
    fn symmetric(&mut self, kind: SymmetricKeyKind) -> &mut BTreeMap<LogKey, SymmetricKey> {
        match kind {
            SymmetricKeyKind::Read => &mut self.read_keys,
            SymmetricKeyKind::Follow => &mut self.follow_keys,
        }
    }
}

/// An in-memory implementation of [`KeyBook`].
#[derive(Default)]
pub struct MemoryKeyBook {
    state: RwLock<KeyState>,
}

impl MemoryKeyBook {
    /// Create a new empty key book.
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation is a single map insert, so a poisoned lock still
    // guards consistent state.
    fn read(&self) -> RwLockReadGuard<'_, KeyState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, KeyState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn add_symmetric(
        &self,
        kind: SymmetricKeyKind,
        thread: &ThreadId,
        peer: &PeerId,
        key: SymmetricKey,
    ) -> Result<()> {
        if key.is_empty() {
            return Err(ValidationError::EmptyKey {
                kind,
                peer: peer.clone(),
            }
            .into());
        }
        self.write()
            .symmetric(kind)
            .insert(log_key(thread, peer), key);
        debug!(thread = %thread, peer = %peer, %kind, "stored symmetric key");
        Ok(())
    }
}

impl KeyBook for MemoryKeyBook {
    fn pub_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<PublicKey> {
        let key = log_key(thread, peer);
        if let Some(pk) = self.read().pub_keys.get(&key) {
            return Some(pk.clone());
        }

        // Inline peer ids carry their key; remember it once recovered.
        let derived = PublicKey::from_peer_id(peer).ok()?;
        let pk = self
            .write()
            .pub_keys
            .entry(key)
            .or_insert(derived)
            .clone();
        debug!(thread = %thread, peer = %peer, "cached public key recovered from peer id");
        Some(pk)
    }

    fn add_pub_key(&self, thread: &ThreadId, peer: &PeerId, key: PublicKey) -> Result<()> {
        if !key.matches_peer(peer) {
            warn!(thread = %thread, peer = %peer, "rejected public key not matching peer id");
            return Err(ValidationError::PublicKeyMismatch { peer: peer.clone() }.into());
        }
        self.write().pub_keys.insert(log_key(thread, peer), key);
        debug!(thread = %thread, peer = %peer, "stored public key");
        Ok(())
    }

    fn priv_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<PrivateKey> {
        self.read().priv_keys.get(&log_key(thread, peer)).cloned()
    }

    fn add_priv_key(&self, thread: &ThreadId, peer: &PeerId, key: PrivateKey) -> Result<()> {
        if !key.matches_peer(peer) {
            warn!(thread = %thread, peer = %peer, "rejected private key not matching peer id");
            return Err(ValidationError::PrivateKeyMismatch { peer: peer.clone() }.into());
        }
        self.write().priv_keys.insert(log_key(thread, peer), key);
        debug!(thread = %thread, peer = %peer, "stored private key");
        Ok(())
    }

    fn read_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<SymmetricKey> {
        self.read().read_keys.get(&log_key(thread, peer)).cloned()
    }

    fn add_read_key(&self, thread: &ThreadId, peer: &PeerId, key: SymmetricKey) -> Result<()> {
        self.add_symmetric(SymmetricKeyKind::Read, thread, peer, key)
    }

    fn follow_key(&self, thread: &ThreadId, peer: &PeerId) -> Option<SymmetricKey> {
        self.read().follow_keys.get(&log_key(thread, peer)).cloned()
    }

    fn add_follow_key(&self, thread: &ThreadId, peer: &PeerId, key: SymmetricKey) -> Result<()> {
        self.add_symmetric(SymmetricKeyKind::Follow, thread, peer, key)
    }

    fn logs_with_keys(&self, thread: &ThreadId) -> Vec<PeerId> {
        let state = self.read();
        let range = thread_range(thread);
        let peers: BTreeSet<PeerId> = state
            .pub_keys
            .range(range.clone())
            .map(|((_, peer), _)| peer.clone())
            .chain(state.priv_keys.range(range).map(|((_, peer), _)| peer.clone()))
            .collect();
        peers.into_iter().collect()
    }

    fn threads_from_keys(&self) -> Vec<ThreadId> {
        let state = self.read();
        let threads: BTreeSet<ThreadId> = state
            .pub_keys
            .keys()
            .chain(state.priv_keys.keys())
            .chain(state.read_keys.keys())
            .chain(state.follow_keys.keys())
            .map(|(thread, _)| *thread)
            .collect();
        threads.into_iter().collect()
    }
}

impl std::fmt::Debug for MemoryKeyBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("MemoryKeyBook")
            .field("pub_keys", &state.pub_keys.len())
            .field("priv_keys", &state.priv_keys.len())
            .field("read_keys", &state.read_keys.len())
            .field("follow_keys", &state.follow_keys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use proptest::prelude::*;
    use threadstore::ThreadstoreError;

    use super::*;

    fn thread_id(n: u8) -> ThreadId {
        ThreadId::from_raw([n; 32])
    }

    #[test]
    fn add_and_get_pub_key() {
        let kb = MemoryKeyBook::new();
        let t = thread_id(1);
        let pk = PrivateKey::generate().public_key();
        let p = pk.to_digest_peer_id();

        assert!(kb.pub_key(&t, &p).is_none());
        kb.add_pub_key(&t, &p, pk.clone()).unwrap();
        assert_eq!(kb.pub_key(&t, &p), Some(pk));
    }

    #[test]
    fn pub_key_rejected_for_foreign_peer() {
        let kb = MemoryKeyBook::new();
        let t = thread_id(1);
        let pk = PrivateKey::generate().public_key();
        let other = PrivateKey::generate().public_key().to_peer_id();

        let err = kb.add_pub_key(&t, &other, pk).unwrap_err();
        assert_eq!(
            err,
            ThreadstoreError::Validation(ValidationError::PublicKeyMismatch { peer: other.clone() })
        );
        assert!(kb.logs_with_keys(&t).is_empty());
        assert!(kb.threads_from_keys().is_empty());
    }

    #[test]
    fn pub_key_recovered_from_inline_peer_and_cached() {
        let kb = MemoryKeyBook::new();
        let t = thread_id(1);
        let pk = PrivateKey::generate().public_key();
        let p = pk.to_peer_id();

        assert!(kb.logs_with_keys(&t).is_empty());
        assert_eq!(kb.pub_key(&t, &p), Some(pk));
        assert_eq!(kb.logs_with_keys(&t), vec![p]);
    }

    #[test]
    fn pub_key_not_recovered_from_digest_peer() {
        let kb = MemoryKeyBook::new();
        let t = thread_id(1);
        let p = PrivateKey::generate().public_key().to_digest_peer_id();
        assert!(kb.pub_key(&t, &p).is_none());
        assert!(kb.logs_with_keys(&t).is_empty());
    }

    #[test]
    fn later_pub_key_write_replaces_earlier() {
        let kb = MemoryKeyBook::new();
        let t = thread_id(1);
        let pk = PrivateKey::generate().public_key();
        let p = pk.to_peer_id();
        kb.add_pub_key(&t, &p, pk.clone()).unwrap();
        kb.add_pub_key(&t, &p, pk.clone()).unwrap();
        assert_eq!(kb.logs_with_keys(&t), vec![p.clone()]);
        assert_eq!(kb.pub_key(&t, &p), Some(pk));
    }

    #[test]
    fn add_and_get_priv_key() {
        let kb = MemoryKeyBook::new();
        let t = thread_id(2);
        let sk = PrivateKey::generate();
        let p = sk.public_key().to_peer_id();

        assert!(kb.priv_key(&t, &p).is_none());
        kb.add_priv_key(&t, &p, sk.clone()).unwrap();
        assert_eq!(kb.priv_key(&t, &p), Some(sk));
    }

    #[test]
    fn priv_key_rejected_for_foreign_peer() {
        let kb = MemoryKeyBook::new();
        let t = thread_id(2);
        let p = PeerId::from_label("testlog");
        let err = kb.add_priv_key(&t, &p, PrivateKey::generate()).unwrap_err();
        assert!(matches!(
            err,
            ThreadstoreError::Validation(ValidationError::PrivateKeyMismatch { .. })
        ));
        assert!(kb.priv_key(&t, &p).is_none());
    }

    #[test]
    fn read_and_follow_keys() {
        let kb = MemoryKeyBook::new();
        let t = thread_id(3);
        let p = PeerId::from_label("testlog");
        let rk = SymmetricKey::generate();
        let fk = SymmetricKey::generate();

        assert!(kb.read_key(&t, &p).is_none());
        assert!(kb.follow_key(&t, &p).is_none());
        kb.add_read_key(&t, &p, rk.clone()).unwrap();
        kb.add_follow_key(&t, &p, fk.clone()).unwrap();
        assert_eq!(kb.read_key(&t, &p), Some(rk));
        assert_eq!(kb.follow_key(&t, &p), Some(fk));

        // Symmetric keys alone do not make a log show up in logs_with_keys,
        // but the thread is known.
        assert!(kb.logs_with_keys(&t).is_empty());
        assert_eq!(kb.threads_from_keys(), vec![t]);
    }

    #[test]
    fn empty_symmetric_keys_are_rejected() {
        let kb = MemoryKeyBook::new();
        let t = thread_id(3);
        let p = PeerId::from_label("testlog");

        let err = kb
            .add_read_key(&t, &p, SymmetricKey::from_bytes(Vec::new()))
            .unwrap_err();
        assert_eq!(
            err,
            ThreadstoreError::Validation(ValidationError::EmptyKey {
                kind: SymmetricKeyKind::Read,
                peer: p.clone(),
            })
        );
        let err = kb
            .add_follow_key(&t, &p, SymmetricKey::from_bytes(Vec::new()))
            .unwrap_err();
        assert!(err.to_string().contains("follow key"));
        assert!(kb.threads_from_keys().is_empty());
    }

    #[test]
    fn logs_with_keys_is_deduplicated_and_scoped_to_thread() {
        let kb = MemoryKeyBook::new();
        let t1 = thread_id(1);
        let t2 = thread_id(2);

        let a = PrivateKey::generate();
        let b = PrivateKey::generate();
        let pa = a.public_key().to_peer_id();
        let pb = b.public_key().to_digest_peer_id();

        kb.add_pub_key(&t1, &pa, a.public_key()).unwrap();
        kb.add_priv_key(&t1, &pa, a.clone()).unwrap();
        kb.add_priv_key(&t1, &pb, b.clone()).unwrap();
        kb.add_pub_key(&t2, &pb, b.public_key()).unwrap();

        let mut expected = vec![pa.clone(), pb.clone()];
        expected.sort();
        assert_eq!(kb.logs_with_keys(&t1), expected);
        assert_eq!(kb.logs_with_keys(&t2), vec![pb]);
        assert_eq!(kb.threads_from_keys(), vec![t1, t2]);
    }

    #[test]
    fn concurrent_writers_and_readers() {
        let kb = Arc::new(MemoryKeyBook::new());
        let t = thread_id(9);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let kb = Arc::clone(&kb);
                thread::spawn(move || {
                    let sk = PrivateKey::generate();
                    let p = sk.public_key().to_peer_id();
                    for _ in 0..25 {
                        kb.add_priv_key(&t, &p, sk.clone()).unwrap();
                        kb.add_pub_key(&t, &p, sk.public_key()).unwrap();
                        assert!(kb.logs_with_keys(&t).contains(&p));
                    }
                    p
                })
            })
            .collect();

        let mut peers: Vec<PeerId> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        peers.sort();
        assert_eq!(kb.logs_with_keys(&t), peers);
    }

    #[test]
    fn debug_format() {
        let kb = MemoryKeyBook::new();
        let debug = format!("{kb:?}");
        assert!(debug.contains("MemoryKeyBook"));
        assert!(debug.contains("pub_keys"));
    }

    proptest! {
        #[test]
        fn add_pub_key_binding(seed in any::<[u8; 32]>(), other in any::<[u8; 32]>(), inline in any::<bool>()) {
            let kb = MemoryKeyBook::new();
            let t = thread_id(7);
            let pk = PrivateKey::from_bytes(seed).public_key();
            let owner = PrivateKey::from_bytes(other).public_key();
            let p = if inline { owner.to_peer_id() } else { owner.to_digest_peer_id() };

            let result = kb.add_pub_key(&t, &p, pk.clone());
            if pk == owner {
                prop_assert!(result.is_ok());
                prop_assert_eq!(kb.pub_key(&t, &p), Some(pk));
            } else {
                prop_assert!(result.is_err());
                prop_assert!(kb.logs_with_keys(&t).is_empty());
            }
        }
    }
}
