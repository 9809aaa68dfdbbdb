//! In-memory threadstore.
//!
//! Every book keeps its state in ordinary maps behind one lock per book.
//! Nothing is persisted; data is lost when the store is dropped.
//!
//! - [`MemoryKeyBook`] — log keys, verified against peer ids on write
//! - [`MemoryAddrBook`] — addresses with lazy expiry and live subscriptions
//! - [`MemoryMetadataBook`] — per-thread metadata
//! - [`MemoryThreadstore`] — all three together
//!
//! Address subscriptions spawn a Tokio task each on the caller's runtime.
//! [`AddrBook::addr_stream`](threadstore::AddrBook::addr_stream) called
//! outside a runtime logs a warning and returns an already-ended stream.

mod addr_sub;
pub mod addrbook;
pub mod keybook;
mod log_key;
pub mod metadata;
pub mod store;

pub use crate::addrbook::MemoryAddrBook;
pub use crate::keybook::MemoryKeyBook;
pub use crate::metadata::MemoryMetadataBook;
pub use crate::store::MemoryThreadstore;
