use std::ops::RangeInclusive;

use threadstore_types::{PeerId, ThreadId};

/// Composite map key identifying one log within one thread.
pub(crate) type LogKey = (ThreadId, PeerId);

pub(crate) fn log_key(thread: &ThreadId, peer: &PeerId) -> LogKey {
    (*thread, peer.clone())
}

/// Every possible [`LogKey`] of `thread`, for `BTreeMap::range`.
///
/// Relies on the derived `PeerId` ordering: variants in declaration order,
/// then bytes.
pub(crate) fn thread_range(thread: &ThreadId) -> RangeInclusive<LogKey> {
    (*thread, PeerId::Inline([0x00; 32]))..=(*thread, PeerId::Digest([0xff; 32]))
}
