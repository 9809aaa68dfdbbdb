//! In-memory address book.
//!
//! [`MemoryAddrBook`] keeps the addresses of every (thread, peer) pair, each
//! with its own expiry. Expiry is lazy: expired entries stay in memory and
//! are skipped by every read until [`MemoryAddrBook::prune_expired`] drops
//! them. Live subscriptions are served by a separate registry with its own
//! lock, so publishing never holds the address lock.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use threadstore::{AddrBook, AddrStream, CancelSignal, TtlRefresh};
use threadstore_types::{Clock, Expiry, Multiaddr, PeerId, SystemClock, ThreadId};

use crate::addr_sub::SubscriptionManager;
use crate::log_key::{log_key, thread_range, LogKey};

#[derive(Clone, Copy, Debug)]
struct AddrEntry {
    expiry: Expiry,
    /// Insertion sequence, so snapshots come back in discovery order.
    seq: u64,
}

#[derive(Default)]
struct AddrState {
    logs: BTreeMap<LogKey, HashMap<Multiaddr, AddrEntry>>,
    next_seq: u64,
}

/// An in-memory implementation of [`AddrBook`].
pub struct MemoryAddrBook {
    clock: Arc<dyn Clock>,
    ttl_refresh: TtlRefresh,
    state: RwLock<AddrState>,
    subscriptions: Arc<SubscriptionManager>,
}

impl MemoryAddrBook {
    /// Create an empty address book on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), TtlRefresh::default())
    }

    /// Create an empty address book with an explicit clock and refresh policy.
    pub fn with_clock(clock: Arc<dyn Clock>, ttl_refresh: TtlRefresh) -> Self {
        Self {
            clock,
            ttl_refresh,
            state: RwLock::new(AddrState::default()),
            subscriptions: Arc::new(SubscriptionManager::default()),
        }
    }

    // Mutations never leave an entry half-written, so a poisoned lock still
    // guards consistent state.
    fn read(&self) -> RwLockReadGuard<'_, AddrState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AddrState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn live_addrs(state: &AddrState, key: &LogKey, now: Instant) -> Vec<Multiaddr> {
        let Some(entries) = state.logs.get(key) else {
            return Vec::new();
        };
        let mut live: Vec<(&Multiaddr, &AddrEntry)> = entries
            .iter()
            .filter(|(_, entry)| !entry.expiry.is_expired(now))
            .collect();
        live.sort_by_key(|(_, entry)| entry.seq);
        live.into_iter().map(|(addr, _)| addr.clone()).collect()
    }

    /// The expiry currently recorded for `addr`, if it is live.
    pub fn expiry(&self, thread: &ThreadId, peer: &PeerId, addr: &Multiaddr) -> Option<Expiry> {
        let now = self.clock.now();
        self.read()
            .logs
            .get(&log_key(thread, peer))?
            .get(addr)
            .map(|entry| entry.expiry)
            .filter(|expiry| !expiry.is_expired(now))
    }

    /// Drop expired entries from memory. Returns how many were dropped.
    ///
    /// Reads already skip expired entries, so this changes nothing a caller
    /// can observe other than memory use.
    pub fn prune_expired(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.write();
        let mut dropped = 0;
        state.logs.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|_, entry| !entry.expiry.is_expired(now));
            dropped += before - entries.len();
            !entries.is_empty()
        });
        if dropped > 0 {
            debug!(dropped, "pruned expired addresses");
        }
        dropped
    }

    /// Number of open subscriptions on `peer` in `thread`.
    pub fn subscriber_count(&self, thread: &ThreadId, peer: &PeerId) -> usize {
        self.subscriptions.subscriber_count(&log_key(thread, peer))
    }

    /// End every open subscription. Later subscriptions end immediately.
    pub fn close(&self) {
        self.subscriptions.close();
    }
}

impl Default for MemoryAddrBook {
    fn default() -> Self {
        Self::new()
    }
}

impl AddrBook for MemoryAddrBook {
    fn add_addrs(&self, thread: &ThreadId, peer: &PeerId, addrs: &[Multiaddr], ttl: Duration) {
        // A zero ttl would store addresses that are already expired.
        if ttl.is_zero() || addrs.is_empty() {
            return;
        }

        let now = self.clock.now();
        let expiry = Expiry::after(now, ttl);
        let key = log_key(thread, peer);
        let mut fresh = Vec::new();
        {
            let mut guard = self.write();
            let state = &mut *guard;
            let entries = state.logs.entry(key.clone()).or_default();
            for addr in addrs {
                if let Some(entry) = entries
                    .get_mut(addr)
                    .filter(|entry| !entry.expiry.is_expired(now))
                {
                    entry.expiry = self.ttl_refresh.resolve(entry.expiry, expiry);
                    continue;
                }
                // New, or expired and now revived.
                let seq = state.next_seq;
                state.next_seq += 1;
                entries.insert(addr.clone(), AddrEntry { expiry, seq });
                fresh.push(addr.clone());
            }
        }

        debug!(
            thread = %thread,
            peer = %peer,
            added = fresh.len(),
            refreshed = addrs.len() - fresh.len(),
            ?ttl,
            "stored addresses"
        );
        if !fresh.is_empty() {
            self.subscriptions.broadcast(&key, &fresh);
        }
    }

    fn addrs(&self, thread: &ThreadId, peer: &PeerId) -> Vec<Multiaddr> {
        let now = self.clock.now();
        Self::live_addrs(&self.read(), &log_key(thread, peer), now)
    }

    fn addr_stream(&self, cancel: CancelSignal, thread: &ThreadId, peer: &PeerId) -> AddrStream {
        let key = log_key(thread, peer);
        self.subscriptions
            .subscribe(cancel, key.clone(), || self.addrs(thread, peer))
    }

    fn logs_with_addrs(&self, thread: &ThreadId) -> Vec<PeerId> {
        let now = self.clock.now();
        self.read()
            .logs
            .range(thread_range(thread))
            .filter(|(_, entries)| entries.values().any(|e| !e.expiry.is_expired(now)))
            .map(|((_, peer), _)| peer.clone())
            .collect()
    }

    fn threads_from_addrs(&self) -> Vec<ThreadId> {
        let now = self.clock.now();
        let threads: BTreeSet<ThreadId> = self
            .read()
            .logs
            .iter()
            .filter(|(_, entries)| entries.values().any(|e| !e.expiry.is_expired(now)))
            .map(|((thread, _), _)| *thread)
            .collect();
        threads.into_iter().collect()
    }
}

impl std::fmt::Debug for MemoryAddrBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        let addr_count: usize = state.logs.values().map(HashMap::len).sum();
        f.debug_struct("MemoryAddrBook")
            .field("logs", &state.logs.len())
            .field("addrs", &addr_count)
            .field("ttl_refresh", &self.ttl_refresh)
            .finish()
    }
}
