use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

const PEER_DIGEST_DOMAIN: &[u8] = b"threadstore-peer-v1:";
const PEER_LABEL_DOMAIN: &[u8] = b"threadstore-label-v1:";

/// Multicodec-style tag for a peer id carrying its public key inline.
const TAG_INLINE: u8 = 0x00;
/// Multicodec-style tag for a BLAKE3 digest peer id.
const TAG_DIGEST: u8 = 0x1e;

/// Opaque identifier of a thread (a replicated log group).
///
/// Thread ids carry no structure the store relies on; they are compared,
/// hashed, and ordered by their raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreadId {
    bytes: [u8; 32],
}

impl ThreadId {
    /// Generate a fresh random thread id.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self { bytes }
    }

    /// Create from raw bytes.
    pub fn from_raw(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("th:{}", hex::encode(&self.bytes[..4]))
    }

    /// Parse from a hex string (64 hex characters, optional `th:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("th:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self { bytes })
    }
}

impl fmt::Debug for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ThreadId({})", self.short_id())
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

/// Identifier of a single log within a thread.
///
/// A peer id is bound to an Ed25519 public key in one of two ways:
///
/// - [`PeerId::Inline`] carries the 32-byte public key itself, so the key can
///   be recovered from the id alone.
/// - [`PeerId::Digest`] carries a domain-separated BLAKE3 digest of the key;
///   the key must be learned out of band but can still be verified.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeerId {
    /// The public key, embedded verbatim.
    Inline([u8; 32]),
    /// BLAKE3 digest of the public key.
    Digest([u8; 32]),
}

impl PeerId {
    /// Peer id embedding `public_key` inline.
    pub fn inline(public_key: [u8; 32]) -> Self {
        Self::Inline(public_key)
    }

    /// Peer id holding only the digest of `public_key`.
    pub fn digest_of(public_key: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(PEER_DIGEST_DOMAIN);
        hasher.update(public_key);
        Self::Digest(*hasher.finalize().as_bytes())
    }

    /// Deterministic peer id for fixtures and tests.
    ///
    /// Label ids live in a separate hash domain, so no public key will ever
    /// match them.
    pub fn from_label(label: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(PEER_LABEL_DOMAIN);
        hasher.update(label.as_bytes());
        Self::Digest(*hasher.finalize().as_bytes())
    }

    /// Returns `true` if this id was derived from `public_key`.
    pub fn matches_public_key_bytes(&self, public_key: &[u8; 32]) -> bool {
        match self {
            Self::Inline(embedded) => embedded == public_key,
            Self::Digest(_) => *self == Self::digest_of(public_key),
        }
    }

    /// The embedded public key bytes, if this is an inline id.
    pub fn inline_key(&self) -> Option<&[u8; 32]> {
        match self {
            Self::Inline(embedded) => Some(embedded),
            Self::Digest(_) => None,
        }
    }

    /// Tagged byte encoding: one tag byte followed by 32 bytes.
    pub fn to_bytes(&self) -> [u8; 33] {
        let (tag, body) = match self {
            Self::Inline(b) => (TAG_INLINE, b),
            Self::Digest(b) => (TAG_DIGEST, b),
        };
        let mut out = [0u8; 33];
        out[0] = tag;
        out[1..].copy_from_slice(body);
        out
    }

    /// Decode the tagged byte encoding produced by [`PeerId::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() != 33 {
            return Err(TypeError::InvalidLength {
                expected: 33,
                actual: bytes.len(),
            });
        }
        let mut body = [0u8; 32];
        body.copy_from_slice(&bytes[1..]);
        match bytes[0] {
            TAG_INLINE => Ok(Self::Inline(body)),
            TAG_DIGEST => Ok(Self::Digest(body)),
            other => Err(TypeError::InvalidPeerId(format!("unknown tag {other:#04x}"))),
        }
    }

    /// Full hex encoding of the tagged bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse the hex encoding produced by [`PeerId::to_hex`].
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Short identifier (first 8 hex characters of the body).
    pub fn short_id(&self) -> String {
        let body = match self {
            Self::Inline(b) | Self::Digest(b) => b,
        };
        format!("log:{}", hex::encode(&body[..4]))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(_) => write!(f, "PeerId::Inline({})", self.short_id()),
            Self::Digest(_) => write!(f, "PeerId::Digest({})", self.short_id()),
        }
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_thread_ids_are_unique() {
        assert_ne!(ThreadId::random(), ThreadId::random());
    }

    #[test]
    fn thread_hex_roundtrip_with_prefix() {
        let id = ThreadId::from_raw([9; 32]);
        let parsed = ThreadId::from_hex(&format!("th:{}", id.to_hex())).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn thread_from_hex_rejects_short_input() {
        let err = ThreadId::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn thread_short_id_format() {
        let id = ThreadId::from_raw([0xab; 32]);
        assert_eq!(id.short_id(), "th:abababab");
    }

    #[test]
    fn inline_peer_matches_its_key_only() {
        let id = PeerId::inline([3; 32]);
        assert!(id.matches_public_key_bytes(&[3; 32]));
        assert!(!id.matches_public_key_bytes(&[4; 32]));
        assert_eq!(id.inline_key(), Some(&[3; 32]));
    }

    #[test]
    fn digest_peer_matches_its_key_only() {
        let id = PeerId::digest_of(&[5; 32]);
        assert!(id.matches_public_key_bytes(&[5; 32]));
        assert!(!id.matches_public_key_bytes(&[6; 32]));
        assert!(id.inline_key().is_none());
    }

    #[test]
    fn label_ids_are_deterministic_and_distinct() {
        assert_eq!(PeerId::from_label("testlog"), PeerId::from_label("testlog"));
        assert_ne!(PeerId::from_label("a"), PeerId::from_label("b"));
    }

    #[test]
    fn peer_hex_roundtrip() {
        for id in [PeerId::inline([1; 32]), PeerId::digest_of(&[1; 32])] {
            assert_eq!(PeerId::from_hex(&id.to_hex()).unwrap(), id);
        }
    }

    #[test]
    fn peer_from_bytes_rejects_unknown_tag() {
        let mut bytes = PeerId::inline([1; 32]).to_bytes();
        bytes[0] = 0x7f;
        assert!(matches!(
            PeerId::from_bytes(&bytes),
            Err(TypeError::InvalidPeerId(_))
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let id = PeerId::digest_of(&[8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: PeerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
