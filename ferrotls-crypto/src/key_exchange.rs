//! Ephemeral key exchange algorithms.

use crate::Result;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Named key-exchange groups supported by ferrotls.
///
/// The enum values double as the wire `NamedGroup` identifiers carried in the
/// supported_groups and key_share extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyExchangeAlgorithm {
    /// secp256r1 (P-256, NIST curve)
    Secp256r1,
    /// secp384r1 (P-384, NIST curve)
    Secp384r1,
    /// secp521r1 (P-521, NIST curve)
    Secp521r1,
}

impl KeyExchangeAlgorithm {
    /// Get the public key size in bytes for this group.
    ///
    /// Public shares are uncompressed SEC1 points.
    pub const fn public_key_size(self) -> usize {
        match self {
            KeyExchangeAlgorithm::Secp256r1 => 65,
            KeyExchangeAlgorithm::Secp384r1 => 97,
            KeyExchangeAlgorithm::Secp521r1 => 133,
        }
    }

    /// Get the shared secret size in bytes.
    pub const fn shared_secret_size(self) -> usize {
        match self {
            KeyExchangeAlgorithm::Secp256r1 => 32,
            KeyExchangeAlgorithm::Secp384r1 => 48,
            KeyExchangeAlgorithm::Secp521r1 => 66,
        }
    }

    /// Get the IANA supported_groups codepoint.
    pub const fn iana_codepoint(self) -> u16 {
        match self {
            KeyExchangeAlgorithm::Secp256r1 => 0x0017,
            KeyExchangeAlgorithm::Secp384r1 => 0x0018,
            KeyExchangeAlgorithm::Secp521r1 => 0x0019,
        }
    }

    /// Convert to wire format (u16).
    pub const fn to_u16(self) -> u16 {
        self.iana_codepoint()
    }

    /// Convert from wire format (u16).
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0017 => Some(KeyExchangeAlgorithm::Secp256r1),
            0x0018 => Some(KeyExchangeAlgorithm::Secp384r1),
            0x0019 => Some(KeyExchangeAlgorithm::Secp521r1),
            _ => None,
        }
    }

    /// Get the group name.
    pub const fn name(self) -> &'static str {
        match self {
            KeyExchangeAlgorithm::Secp256r1 => "secp256r1",
            KeyExchangeAlgorithm::Secp384r1 => "secp384r1",
            KeyExchangeAlgorithm::Secp521r1 => "secp521r1",
        }
    }
}

/// Private key for key exchange.
///
/// Wraps the private scalar and zeroizes it on drop. Ephemeral keys are
/// generated fresh per handshake and must never be reused across connections.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bytes", &"<redacted>")
            .finish()
    }
}

impl PrivateKey {
    /// Create a new private key from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the private key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Public key for key exchange.
#[derive(Debug, Clone)]
pub struct PublicKey {
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Create a new public key from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the public key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Convert to owned bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Shared secret from key exchange.
///
/// Zeroized when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("bytes", &"<redacted>")
            .finish()
    }
}

impl SharedSecret {
    /// Create a new shared secret from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the shared secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Key exchange trait.
///
/// # Example (ECDHE)
///
/// ```rust,no_run
/// use ferrotls_crypto::KeyExchange;
///
/// fn key_exchange_example(kex: &dyn KeyExchange, peer_public_key: &[u8]) {
///     let (private_key, public_key) = kex.generate_keypair().unwrap();
///     let shared_secret = kex.exchange(&private_key, peer_public_key).unwrap();
/// }
/// ```
pub trait KeyExchange: Send + Sync {
    /// Generate an ephemeral key pair.
    ///
    /// # Security
    ///
    /// The private key MUST be generated using a CSPRNG and MUST be
    /// zeroized when dropped.
    fn generate_keypair(&self) -> Result<(PrivateKey, PublicKey)>;

    /// Perform key exchange against a peer's public share.
    ///
    /// # Errors
    ///
    /// - `InvalidPublicKey` if the peer share is malformed for the group
    ///   (wrong length, not on curve)
    /// - `KeyExchangeFailed` for other errors
    fn exchange(&self, private_key: &PrivateKey, peer_public_key: &[u8]) -> Result<SharedSecret>;

    /// Get the group this key exchange implements.
    fn algorithm(&self) -> KeyExchangeAlgorithm;

    /// Get the expected public key size in bytes.
    fn public_key_size(&self) -> usize {
        self.algorithm().public_key_size()
    }
}
