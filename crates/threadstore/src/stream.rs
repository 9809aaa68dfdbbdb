//! The consumer end of an address subscription.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use threadstore_types::Multiaddr;
use tokio::sync::mpsc;

use crate::cancel::CancelSignal;

/// Live sequence of addresses for one (thread, peer) pair.
///
/// Yields the addresses known when the subscription was opened, then each
/// newly learned address once. Ends when the subscription's [`CancelSignal`]
/// fires; nothing is yielded after that, even if deliveries were already
/// queued.
///
/// Usable both as a [`Stream`] and through [`AddrStream::recv`].
#[derive(Debug)]
pub struct AddrStream {
    rx: mpsc::UnboundedReceiver<Multiaddr>,
    cancel: CancelSignal,
}

impl AddrStream {
    /// Wrap the receiving end of a subscription's delivery queue.
    ///
    /// Book implementations call this; the sender side belongs to the
    /// subscription's delivery task, which drops it on teardown.
    pub fn new(rx: mpsc::UnboundedReceiver<Multiaddr>, cancel: CancelSignal) -> Self {
        Self { rx, cancel }
    }

    /// Receive the next address, or `None` once the subscription has ended.
    pub async fn recv(&mut self) -> Option<Multiaddr> {
        if self.cancel.is_cancelled() {
            self.rx.close();
            return None;
        }
        let next = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            next = self.rx.recv() => next,
        };
        if next.is_none() {
            self.rx.close();
        }
        next
    }

    /// Take an already-delivered address without waiting.
    pub fn try_recv(&mut self) -> Option<Multiaddr> {
        if self.cancel.is_cancelled() {
            self.rx.close();
            return None;
        }
        self.rx.try_recv().ok()
    }

    /// Returns `true` once the subscription's cancel signal has fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Stream for AddrStream {
    type Item = Multiaddr;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Multiaddr>> {
        let this = self.get_mut();
        if this.cancel.is_cancelled() {
            this.rx.close();
            return Poll::Ready(None);
        }
        // The delivery task drops its sender on cancellation, which wakes
        // this receiver.
        this.rx.poll_recv(cx)
    }
}
