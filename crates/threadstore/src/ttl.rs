//! Well-known address TTLs.
//!
//! Any TTL too large to add to the current instant is treated as permanent;
//! [`PERMANENT_ADDR_TTL`] is the canonical spelling of that.

use std::time::Duration;

/// Short-lived addresses, e.g. learned from an unverified source.
pub const TEMP_ADDR_TTL: Duration = Duration::from_secs(2 * 60);

/// Addresses handed out by a provider or discovery record.
pub const PROVIDER_ADDR_TTL: Duration = Duration::from_secs(30 * 60);

/// Addresses of a peer we were recently connected to.
pub const RECENTLY_CONNECTED_ADDR_TTL: Duration = Duration::from_secs(10 * 60);

/// Our own addresses as observed by other peers.
pub const OWN_OBSERVED_ADDR_TTL: Duration = Duration::from_secs(30 * 60);

/// Addresses that never expire.
pub const PERMANENT_ADDR_TTL: Duration = Duration::MAX;

/// Addresses of a currently connected peer; permanent for as long as the
/// connection lasts, but distinguishable from [`PERMANENT_ADDR_TTL`].
pub const CONNECTED_ADDR_TTL: Duration = Duration::MAX.saturating_sub(Duration::from_nanos(1));
