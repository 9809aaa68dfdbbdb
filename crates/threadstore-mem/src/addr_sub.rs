//! Address subscription registry.
//!
//! Every open [`AddrStream`] has an entry here: the sending end of its
//! private inbound queue, keyed by (thread, peer) and subscription id. The
//! writer path only pushes onto those unbounded queues, so it never waits on
//! a consumer. Each subscription runs its own delivery task which owns the
//! set of addresses already handed out, drops repeats, and forwards the rest
//! to the consumer. Cancellation ends the task, which removes the registry
//! entry and frees the queue and the delivered set.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use threadstore::{AddrStream, CancelSignal};
use threadstore_types::Multiaddr;

use crate::log_key::LogKey;

type SubscriptionId = u64;

#[derive(Default)]
struct Registry {
    subscribers: HashMap<LogKey, HashMap<SubscriptionId, mpsc::UnboundedSender<Multiaddr>>>,
    next_id: SubscriptionId,
    closed: bool,
}

/// Fan-out of newly learned addresses to open subscriptions.
#[derive(Default)]
pub(crate) struct SubscriptionManager {
    registry: Mutex<Registry>,
}

impl SubscriptionManager {
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a subscription for `key`.
    ///
    /// `snapshot` is taken while the registry is locked, so an address added
    /// concurrently is either in the snapshot or broadcast to this
    /// subscription afterwards (possibly both; the delivery task drops the
    /// repeat). The delivery task runs on the caller's Tokio runtime; without
    /// one the returned stream has already ended.
    pub(crate) fn subscribe(
        self: &Arc<Self>,
        cancel: CancelSignal,
        key: LogKey,
        snapshot: impl FnOnce() -> Vec<Multiaddr>,
    ) -> AddrStream {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                thread = %key.0,
                peer = %key.1,
                "address subscription requested outside a Tokio runtime"
            );
            return AddrStream::new(out_rx, cancel);
        };
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let id = {
            let mut registry = self.lock();
            if registry.closed {
                // Dropping `out_tx` ends the stream straight away.
                return AddrStream::new(out_rx, cancel);
            }
            for addr in snapshot() {
                // The receiver is alive until the task below exits.
                let _ = inbound_tx.send(addr);
            }
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .subscribers
                .entry(key.clone())
                .or_default()
                .insert(id, inbound_tx);
            id
        };

        debug!(thread = %key.0, peer = %key.1, subscription = id, "address subscription opened");
        runtime.spawn(deliver(
            Arc::clone(self),
            key,
            id,
            inbound_rx,
            out_tx,
            cancel.clone(),
        ));
        AddrStream::new(out_rx, cancel)
    }

    /// Queue `addrs` for every subscription on `key`. Never blocks.
    pub(crate) fn broadcast(&self, key: &LogKey, addrs: &[Multiaddr]) {
        let registry = self.lock();
        let Some(subscribers) = registry.subscribers.get(key) else {
            return;
        };
        for tx in subscribers.values() {
            for addr in addrs {
                // A closed queue belongs to a task that is tearing down.
                let _ = tx.send(addr.clone());
            }
        }
    }

    /// Number of open subscriptions on `key`.
    pub(crate) fn subscriber_count(&self, key: &LogKey) -> usize {
        self.lock().subscribers.get(key).map_or(0, HashMap::len)
    }

    /// End every subscription and refuse new ones.
    pub(crate) fn close(&self) {
        let mut registry = self.lock();
        registry.closed = true;
        // Dropping the inbound senders lets each delivery task drain and exit.
        let count: usize = registry.subscribers.values().map(HashMap::len).sum();
        registry.subscribers.clear();
        debug!(subscriptions = count, "address subscriptions closed");
    }

    fn remove(&self, key: &LogKey, id: SubscriptionId) {
        let mut registry = self.lock();
        if let Some(subscribers) = registry.subscribers.get_mut(key) {
            subscribers.remove(&id);
            if subscribers.is_empty() {
                registry.subscribers.remove(key);
            }
        }
    }
}

/// Delivery task of one subscription.
async fn deliver(
    manager: Arc<SubscriptionManager>,
    key: LogKey,
    id: SubscriptionId,
    mut inbound: mpsc::UnboundedReceiver<Multiaddr>,
    out: mpsc::UnboundedSender<Multiaddr>,
    mut cancel: CancelSignal,
) {
    let mut delivered: HashSet<Multiaddr> = HashSet::new();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = out.closed() => break,
            next = inbound.recv() => match next {
                Some(addr) => {
                    if delivered.insert(addr.clone()) && out.send(addr).is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    manager.remove(&key, id);
    debug!(
        thread = %key.0,
        peer = %key.1,
        subscription = id,
        delivered = delivered.len(),
        "address subscription torn down"
    );
}
