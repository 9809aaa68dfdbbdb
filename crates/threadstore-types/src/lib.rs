//! Foundation types for the threadstore.
//!
//! This crate provides the identifier, address, temporal, and value types
//! shared by every other threadstore crate.
//!
//! # Key Types
//!
//! - [`ThreadId`] — Opaque identifier of a replicated log group
//! - [`PeerId`] — Identifier of a single log, bound to its public key
//! - [`Multiaddr`] — Self-describing network address (`/ip4/1.2.3.4/tcp/80`)
//! - [`Expiry`] — Absolute expiry instant, or never
//! - [`Clock`] — Source of "now" for expiry computation
//! - [`MetaValue`] — Opaque per-thread metadata value

pub mod addr;
pub mod error;
pub mod identity;
pub mod meta;
pub mod temporal;

pub use addr::{Multiaddr, Protocol};
pub use error::TypeError;
pub use identity::{PeerId, ThreadId};
pub use meta::MetaValue;
pub use temporal::{Clock, Expiry, ManualClock, SystemClock};
