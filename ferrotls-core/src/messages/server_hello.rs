//! ServerHello message.

use crate::cipher::CipherSuite;
use crate::error::{Error, Result};
use crate::extensions::Extensions;
use crate::messages::HandshakeBody;
use crate::protocol::{HandshakeType, ProtocolVersion};
use bytes::{Buf, BufMut, BytesMut};

/// ServerHello message.
///
/// Carries the server's single selected cipher suite and its extensions
/// (the key_share extension with exactly one entry, in this profile).
/// Treated as immutable once sent or received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// Random bytes (32 bytes)
    pub random: [u8; 32],

    /// Selected cipher suite
    pub cipher_suite: CipherSuite,

    /// Extensions
    pub extensions: Extensions,
}

impl ServerHello {
    /// Create a new ServerHello.
    pub fn new(random: [u8; 32], cipher_suite: CipherSuite) -> Self {
        Self {
            random,
            cipher_suite,
            extensions: Extensions::new(),
        }
    }

    /// Set the extensions.
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }
}

impl HandshakeBody for ServerHello {
    const TYPE: HandshakeType = HandshakeType::ServerHello;

    fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::new();

        // Legacy version
        buf.put_u16(ProtocolVersion::Tls12.to_u16());

        // Random
        buf.put_slice(&self.random);

        // Legacy session ID echo (empty)
        buf.put_u8(0);

        // Selected cipher suite
        buf.put_u16(self.cipher_suite.to_u16());

        // Legacy compression method (null)
        buf.put_u8(0);

        // Extensions
        buf.put_slice(&self.extensions.encode());

        Ok(buf.to_vec())
    }

    fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 40 {
            // 2 (version) + 32 (random) + 1 (sid_len) + 2 (suite) + 1 (cm) + 2 (ext_len)
            return Err(Error::Decode("ServerHello too short".into()));
        }

        // Legacy version
        let version_raw = data.get_u16();
        ProtocolVersion::from_u16(version_raw)
            .ok_or_else(|| Error::Decode("Invalid legacy version".into()))?;

        // Random
        let mut random = [0u8; 32];
        data.copy_to_slice(&mut random);

        // Legacy session ID echo
        let session_id_len = data.get_u8() as usize;
        if session_id_len > 32 || data.len() < session_id_len {
            return Err(Error::Decode("Invalid session ID echo".into()));
        }
        data.advance(session_id_len);

        // Selected cipher suite; a single value, and it must be recognized
        if data.len() < 2 {
            return Err(Error::Decode("Missing cipher suite".into()));
        }
        let suite_raw = data.get_u16();
        let cipher_suite = CipherSuite::from_u16(suite_raw)
            .ok_or_else(|| Error::Decode(format!("Unknown cipher suite: {:#06x}", suite_raw)))?;

        // Legacy compression method
        if data.is_empty() {
            return Err(Error::Decode("Missing compression method".into()));
        }
        data.advance(1);

        // Extensions
        let extensions = Extensions::decode(data)?;

        Ok(Self {
            random,
            cipher_suite,
            extensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension_types::{KeyShareEntry, TypedExtension};
    use ferrotls_crypto::KeyExchangeAlgorithm;

    #[test]
    fn test_server_hello_encode_decode() {
        let random = [0x24u8; 32];
        let mut hello = ServerHello::new(random, CipherSuite::EcdheEcdsaWithAes128GcmSha256);
        hello
            .extensions
            .add_typed(TypedExtension::KeyShare(vec![KeyShareEntry {
                group: KeyExchangeAlgorithm::Secp384r1,
                key_exchange: vec![4; 97],
            }]))
            .unwrap();

        let encoded = hello.encode().unwrap();
        let decoded = ServerHello::decode(&encoded).unwrap();

        assert_eq!(decoded.random, random);
        assert_eq!(
            decoded.cipher_suite,
            CipherSuite::EcdheEcdsaWithAes128GcmSha256
        );
        let shares = decoded.extensions.get_key_share().unwrap().unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].group, KeyExchangeAlgorithm::Secp384r1);
    }

    #[test]
    fn test_server_hello_unknown_suite_fails() {
        let hello = ServerHello::new([0u8; 32], CipherSuite::EcdheRsaWithAes128GcmSha256);
        let mut encoded = hello.encode().unwrap();

        // Suite sits after version (2) + random (32) + sid_len (1)
        encoded[35] = 0x13;
        encoded[36] = 0x99;

        assert!(ServerHello::decode(&encoded).is_err());
    }
}
