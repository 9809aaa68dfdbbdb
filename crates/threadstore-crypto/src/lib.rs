//! Key material for the threadstore.
//!
//! Provides Ed25519 log keys with their peer id binding, and the raw
//! symmetric read/follow keys of a thread.
//!
//! Log keys are ed25519-dalek keys; nothing here is hand-rolled.

pub mod keys;

pub use keys::{KeyError, PrivateKey, PublicKey, SymmetricKey};
