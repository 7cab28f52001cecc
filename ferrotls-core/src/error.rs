//! Error types for the handshake engine.
//!
//! Every failure is terminal for the handshake attempt: there is no retry
//! logic anywhere in this crate. A connection either completes a full
//! handshake and gains a usable crypto context, or it gains none.

use core::fmt;

/// Result type for handshake operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur during a handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Read/write failure on the underlying stream.
    Transport(String),

    /// Malformed wire structure.
    Decode(String),

    /// A required ClientHello extension is absent.
    MissingExtension(&'static str),

    /// None of the peer's offered cipher suites is locally supported.
    NoAcceptableSuite,

    /// Key agreement failed: no mutually supported group, a malformed peer
    /// share, or the peer selected a group that was never offered.
    KeyAgreement(String),

    /// Ephemeral key generation failed.
    KeyGeneration(String),

    /// Finished verify-data mismatch. A fatal authentication failure.
    Verification(String),

    /// The negotiated cipher suite's primitive families are not available
    /// from the configured provider.
    UnsupportedSuite(String),

    /// A message of an unexpected type arrived.
    UnexpectedMessage(String),

    /// Invalid local configuration.
    InvalidConfig(String),

    /// Cryptographic primitive failure.
    Crypto(String),

    /// Internal invariant violated (state-machine misuse).
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(msg) => write!(f, "Transport error: {}", msg),
            Error::Decode(msg) => write!(f, "Decode error: {}", msg),
            Error::MissingExtension(name) => {
                write!(f, "Missing required extension: {}", name)
            },
            Error::NoAcceptableSuite => write!(f, "No acceptable cipher suites"),
            Error::KeyAgreement(msg) => write!(f, "Key agreement failed: {}", msg),
            Error::KeyGeneration(msg) => write!(f, "Key generation failed: {}", msg),
            Error::Verification(msg) => write!(f, "Verification failed: {}", msg),
            Error::UnsupportedSuite(msg) => write!(f, "Unsupported cipher suite: {}", msg),
            Error::UnexpectedMessage(msg) => write!(f, "Unexpected message: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Crypto(msg) => write!(f, "Cryptographic error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<ferrotls_crypto::Error> for Error {
    fn from(e: ferrotls_crypto::Error) -> Self {
        Error::Crypto(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::MissingExtension("key_share");
        assert_eq!(err.to_string(), "Missing required extension: key_share");

        let err = Error::Verification("server Finished failed to verify".into());
        assert!(err.to_string().contains("server Finished"));
    }

    #[test]
    fn test_crypto_error_conversion() {
        let err: Error = ferrotls_crypto::Error::InvalidPublicKey.into();
        assert!(matches!(err, Error::Crypto(_)));
    }
}
