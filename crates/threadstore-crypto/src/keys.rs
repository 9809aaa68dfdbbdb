use threadstore_types::PeerId;

/// Ed25519 private key of a log.
#[derive(Clone)]
pub struct PrivateKey(ed25519_dalek::SigningKey);

/// Ed25519 public key of a log.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

/// Raw symmetric key (a thread's read key or follow key).
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey(Vec<u8>);

impl PrivateKey {
    /// Generate a new random private key.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create from a raw 32-byte secret.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&bytes))
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Returns `true` if `peer` was derived from this key's public half.
    pub fn matches_peer(&self, peer: &PeerId) -> bool {
        self.public_key().matches_peer(peer)
    }

    /// Raw secret key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for PrivateKey {}

impl PublicKey {
    /// Peer id embedding this key inline, so the key is recoverable from it.
    pub fn to_peer_id(&self) -> PeerId {
        PeerId::inline(self.0.to_bytes())
    }

    /// Peer id holding only a digest of this key.
    pub fn to_digest_peer_id(&self) -> PeerId {
        PeerId::digest_of(&self.0.to_bytes())
    }

    /// Returns `true` if `peer` was derived from this key.
    pub fn matches_peer(&self, peer: &PeerId) -> bool {
        peer.matches_public_key_bytes(&self.0.to_bytes())
    }

    /// Recover the public key embedded in an inline peer id.
    pub fn from_peer_id(peer: &PeerId) -> Result<Self, KeyError> {
        let bytes = peer.inline_key().ok_or(KeyError::NotExtractable)?;
        Self::from_bytes(*bytes)
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Create from a raw 32-byte public key.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        let key =
            ed25519_dalek::VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidKey)?;
        Ok(Self(key))
    }
}

impl SymmetricKey {
    /// Length of generated keys.
    pub const LEN: usize = 32;

    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; Self::LEN];
        rand::Rng::fill(&mut rand::thread_rng(), bytes.as_mut_slice());
        Self(bytes)
    }

    /// Wrap raw key bytes. Emptiness is checked where the key is stored.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey(<redacted>)")
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0.to_bytes()))
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey(<redacted, {} bytes>)", self.0.len())
    }
}

/// Errors from key operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid key")]
    InvalidKey,
    #[error("peer id does not embed a public key")]
    NotExtractable,
}
