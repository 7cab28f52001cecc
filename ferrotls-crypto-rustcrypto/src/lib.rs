//! # RustCrypto-based Cryptography Provider for ferrotls
//!
//! This crate implements the `ferrotls-crypto` provider interface on top of
//! the RustCrypto ecosystem:
//!
//! - **AEAD**: AES-128-GCM, AES-256-GCM (`aes-gcm`)
//! - **Hash**: SHA-256, SHA-384, SHA-512 (`sha2`)
//! - **HMAC**: with SHA-256/384/512 (`hmac`)
//! - **KDF**: HKDF-Extract / HKDF-Expand (`hkdf`)
//! - **Key Exchange**: ECDH over P-256, P-384, P-521 (`p256`, `p384`, `p521`)
//! - **RNG**: OS entropy (`rand_core::OsRng`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use ferrotls_crypto::CryptoProvider;
//! use ferrotls_crypto_rustcrypto::RustCryptoProvider;
//!
//! let provider = RustCryptoProvider::new();
//! let hash = provider.hash(ferrotls_crypto::HashAlgorithm::Sha256).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

use ferrotls_crypto::{
    Aead, AeadAlgorithm, CryptoProvider, Hash, HashAlgorithm, Hmac, Kdf, KdfAlgorithm,
    KeyExchange, KeyExchangeAlgorithm, Random, Result,
};

pub mod aead;
pub mod hash;
pub mod hkdf;
pub mod hmac;
pub mod kex;
pub mod random;

use random::OsRandom;

/// Cryptography provider backed by RustCrypto implementations.
///
/// # Thread Safety
///
/// This provider is `Send + Sync` and can be safely shared across threads.
#[derive(Debug, Default)]
pub struct RustCryptoProvider {
    random: OsRandom,
}

impl RustCryptoProvider {
    /// Create a new provider.
    pub fn new() -> Self {
        Self { random: OsRandom }
    }
}

impl CryptoProvider for RustCryptoProvider {
    fn aead(&self, algorithm: AeadAlgorithm) -> Result<Box<dyn Aead>> {
        aead::create_aead(algorithm)
    }

    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
        hash::create_hash(algorithm)
    }

    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
        hmac::create_hmac(algorithm, key)
    }

    fn kdf(&self, algorithm: KdfAlgorithm) -> Result<Box<dyn Kdf>> {
        hkdf::create_kdf(algorithm)
    }

    fn random(&self) -> &dyn Random {
        &self.random
    }

    fn key_exchange(&self, algorithm: KeyExchangeAlgorithm) -> Result<Box<dyn KeyExchange>> {
        kex::create_key_exchange(algorithm)
    }
}
