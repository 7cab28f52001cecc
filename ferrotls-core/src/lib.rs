//! # ferrotls Core
//!
//! A minimal TLS-1.3-style handshake engine: extension negotiation,
//! ephemeral ECDHE key agreement, a transcript-bound two-phase key schedule,
//! Finished verification, and record-layer rekeying at the two phase
//! transitions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      ferrotls-core (this crate)         │
//! │  ┌──────────────────────────────────┐   │
//! │  │   Handshake Drivers              │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Crypto Context (key schedule)  │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Messages / Extensions          │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Record + Handshake Layers      │   │
//! │  └──────────────────────────────────┘   │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │    ferrotls-crypto (trait interface)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The protocol is synchronous and blocking: each driver executes an ordered
//! sequence of reads and writes, and any failure aborts the handshake,
//! leaving the connection without a usable crypto context. Certificate-based
//! peer authentication is an explicit extension point
//! ([`auth::Authenticator`]), unfilled in this profile.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]

// Re-export crypto interface
pub use ferrotls_crypto;

pub mod auth;
pub mod cipher;
pub mod connection;
pub mod crypto_context;
pub mod error;
pub mod extension_types;
pub mod extensions;
pub mod handshake;
pub mod handshake_io;
pub mod key_share;
pub mod messages;
pub mod protocol;
pub mod record;
pub mod transcript;

pub use cipher::CipherSuite;
pub use connection::Connection;
pub use error::{Error, Result};
pub use handshake::{ClientHandshake, HandshakePhase, RekeyPolicy, ServerHandshake};

use cipher::DEFAULT_CIPHER_SUITES;
use ferrotls_crypto::KeyExchangeAlgorithm;
use protocol::{HashAlgorithmId, SignatureAlgorithmId, SignatureAndHashAlgorithm};

/// Handshake configuration.
///
/// An explicit value passed into each driver; there are no process-wide
/// settings. Construct via [`HandshakeConfig::builder`].
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    /// Server name the client requests (SNI).
    pub server_name: String,

    /// Supported cipher suites, in preference order.
    pub cipher_suites: Vec<CipherSuite>,

    /// Supported key-exchange groups, in preference order.
    pub groups: Vec<KeyExchangeAlgorithm>,

    /// Offered signature algorithm pairs.
    pub signature_algorithms: Vec<SignatureAndHashAlgorithm>,

    /// Which derived key sets rekeying installs per direction.
    pub rekey_policy: RekeyPolicy,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            server_name: "example.com".to_string(),
            cipher_suites: DEFAULT_CIPHER_SUITES.to_vec(),
            groups: vec![
                KeyExchangeAlgorithm::Secp256r1,
                KeyExchangeAlgorithm::Secp384r1,
                KeyExchangeAlgorithm::Secp521r1,
            ],
            signature_algorithms: vec![
                SignatureAndHashAlgorithm::new(
                    HashAlgorithmId::Sha256,
                    SignatureAlgorithmId::Rsa,
                ),
                SignatureAndHashAlgorithm::new(
                    HashAlgorithmId::Sha384,
                    SignatureAlgorithmId::Ecdsa,
                ),
            ],
            rekey_policy: RekeyPolicy::default(),
        }
    }
}

impl HandshakeConfig {
    /// Create a new configuration builder.
    pub fn builder() -> HandshakeConfigBuilder {
        HandshakeConfigBuilder::default()
    }
}

/// Builder for [`HandshakeConfig`].
#[derive(Debug, Default)]
pub struct HandshakeConfigBuilder {
    config: HandshakeConfig,
}

impl HandshakeConfigBuilder {
    /// Set the server name (SNI).
    pub fn with_server_name(mut self, name: &str) -> Self {
        self.config.server_name = name.to_string();
        self
    }

    /// Set the cipher suite preference list.
    pub fn with_cipher_suites(mut self, suites: &[CipherSuite]) -> Self {
        self.config.cipher_suites = suites.to_vec();
        self
    }

    /// Set the supported group preference list.
    pub fn with_groups(mut self, groups: &[KeyExchangeAlgorithm]) -> Self {
        self.config.groups = groups.to_vec();
        self
    }

    /// Set the signature algorithm pairs.
    pub fn with_signature_algorithms(mut self, algorithms: &[SignatureAndHashAlgorithm]) -> Self {
        self.config.signature_algorithms = algorithms.to_vec();
        self
    }

    /// Set the rekey policy. Both peers must use the same policy.
    pub fn with_rekey_policy(mut self, policy: RekeyPolicy) -> Self {
        self.config.rekey_policy = policy;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<HandshakeConfig> {
        if self.config.cipher_suites.is_empty() {
            return Err(Error::InvalidConfig("No cipher suites specified".into()));
        }
        if self.config.groups.is_empty() {
            return Err(Error::InvalidConfig("No key-exchange groups specified".into()));
        }
        if self.config.server_name.is_empty() {
            return Err(Error::InvalidConfig("Empty server name".into()));
        }

        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HandshakeConfig::default();
        assert_eq!(config.cipher_suites, DEFAULT_CIPHER_SUITES.to_vec());
        assert_eq!(config.groups.len(), 3);
        assert_eq!(config.rekey_policy, RekeyPolicy::SharedServerWrite);
    }

    #[test]
    fn test_config_builder() {
        let config = HandshakeConfig::builder()
            .with_server_name("tls.example.net")
            .with_groups(&[KeyExchangeAlgorithm::Secp384r1])
            .with_rekey_policy(RekeyPolicy::PerDirection)
            .build()
            .unwrap();

        assert_eq!(config.server_name, "tls.example.net");
        assert_eq!(config.groups, vec![KeyExchangeAlgorithm::Secp384r1]);
        assert_eq!(config.rekey_policy, RekeyPolicy::PerDirection);
    }

    #[test]
    fn test_config_validation() {
        assert!(HandshakeConfig::builder().with_cipher_suites(&[]).build().is_err());
        assert!(HandshakeConfig::builder().with_groups(&[]).build().is_err());
        assert!(HandshakeConfig::builder().with_server_name("").build().is_err());
    }
}
