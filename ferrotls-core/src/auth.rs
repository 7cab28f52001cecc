//! Peer-identity authentication extension point.
//!
//! The Finished exchange authenticates the key exchange and the transcript,
//! but not the peer's identity. Identity proof (a Certificate /
//! CertificateVerify exchange, in full TLS) is a capability this trait
//! models so a future increment can fill it; the default implementation is
//! the explicit absence of one.

use crate::error::Result;
use crate::handshake_io::HandshakeMessage;
use ferrotls_crypto::CryptoProvider;

/// Produces and verifies identity proofs bound to the handshake transcript.
pub trait Authenticator: Send + Sync {
    /// Handshake messages carrying the local identity proof, to be sent
    /// after the hellos and before Finished.
    fn identity_messages(
        &self,
        provider: &dyn CryptoProvider,
        transcript_hash: &[u8],
    ) -> Result<Vec<HandshakeMessage>>;

    /// Verify the peer's identity proof messages against the transcript.
    fn verify_identity(
        &self,
        provider: &dyn CryptoProvider,
        messages: &[HandshakeMessage],
        transcript_hash: &[u8],
    ) -> Result<()>;
}

/// The no-op authenticator: sends no identity proof and accepts any peer.
///
/// Peer messages still enter the transcript, so they are covered by the
/// Finished exchange, but nothing validates them cryptographically.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuthenticator;

impl Authenticator for NullAuthenticator {
    fn identity_messages(
        &self,
        _provider: &dyn CryptoProvider,
        _transcript_hash: &[u8],
    ) -> Result<Vec<HandshakeMessage>> {
        Ok(Vec::new())
    }

    fn verify_identity(
        &self,
        _provider: &dyn CryptoProvider,
        _messages: &[HandshakeMessage],
        _transcript_hash: &[u8],
    ) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrotls_crypto_rustcrypto::RustCryptoProvider;

    #[test]
    fn test_null_authenticator() {
        let provider = RustCryptoProvider::new();
        let auth = NullAuthenticator;

        assert!(auth.identity_messages(&provider, &[0u8; 32]).unwrap().is_empty());
        assert!(auth.verify_identity(&provider, &[], &[0u8; 32]).is_ok());
    }
}
