//! # ferrotls Cryptographic Provider Interface
//!
//! This crate defines the cryptographic abstraction layer for ferrotls.
//! It provides trait-based interfaces that allow pluggable cryptographic
//! backends; the protocol engine in `ferrotls-core` only ever composes
//! primitives through these traits.
//!
//! ## Architecture
//!
//! ```text
//! CryptoProvider (main trait)
//! ├── Aead (AEAD ciphers: AES-GCM)
//! ├── Hash (SHA-256, SHA-384, SHA-512)
//! ├── Hmac (HMAC with various hash functions)
//! ├── Kdf (HKDF)
//! ├── Random (CSPRNG)
//! └── KeyExchange (ECDHE over the NIST curves)
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

pub mod aead;
pub mod error;
pub mod hash;
pub mod hmac;
pub mod kdf;
pub mod key_exchange;
pub mod random;

pub use aead::{Aead, AeadAlgorithm};
pub use error::{Error, Result};
pub use hash::{Hash, HashAlgorithm};
pub use hmac::Hmac;
pub use kdf::{Kdf, KdfAlgorithm};
pub use key_exchange::{KeyExchange, KeyExchangeAlgorithm, PrivateKey, PublicKey, SharedSecret};
pub use random::Random;

/// The main cryptographic provider trait.
///
/// Implementations of this trait provide all cryptographic operations needed
/// by the handshake engine. The trait is object-safe so it can be passed as
/// `&dyn CryptoProvider` through the protocol layers.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`.
pub trait CryptoProvider: Send + Sync + 'static {
    /// Get an AEAD cipher instance.
    ///
    /// Returns an error if the algorithm is not supported.
    fn aead(&self, algorithm: AeadAlgorithm) -> Result<Box<dyn Aead>>;

    /// Get a hash function instance.
    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>>;

    /// Get an HMAC instance keyed with `key`.
    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>>;

    /// Get a KDF (Key Derivation Function) instance.
    fn kdf(&self, algorithm: KdfAlgorithm) -> Result<Box<dyn Kdf>>;

    /// Get the random number generator.
    fn random(&self) -> &dyn Random;

    /// Get a key exchange instance for a named group.
    ///
    /// Returns an error if the group is not supported.
    fn key_exchange(&self, algorithm: KeyExchangeAlgorithm) -> Result<Box<dyn KeyExchange>>;

    /// Check if the provider supports a specific key exchange group.
    fn supports_key_exchange(&self, algorithm: KeyExchangeAlgorithm) -> bool {
        self.key_exchange(algorithm).is_ok()
    }

    /// Check if the provider supports a specific AEAD algorithm.
    fn supports_aead(&self, algorithm: AeadAlgorithm) -> bool {
        self.aead(algorithm).is_ok()
    }
}
