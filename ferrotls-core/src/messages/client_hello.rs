//! ClientHello message.

use crate::cipher::CipherSuite;
use crate::error::{Error, Result};
use crate::extensions::Extensions;
use crate::messages::HandshakeBody;
use crate::protocol::{HandshakeType, ProtocolVersion};
use bytes::{Buf, BufMut, BytesMut};

/// ClientHello message.
///
/// Carries the client's ordered cipher-suite preference list and its
/// extensions. The legacy version, session id, and compression fields are
/// handled internally. Treated as immutable once sent or received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// Random bytes (32 bytes)
    pub random: [u8; 32],

    /// Cipher suites offered by the client, in preference order
    pub cipher_suites: Vec<CipherSuite>,

    /// Extensions
    pub extensions: Extensions,
}

impl ClientHello {
    /// Create a new ClientHello.
    pub fn new(random: [u8; 32], cipher_suites: Vec<CipherSuite>) -> Self {
        Self {
            random,
            cipher_suites,
            extensions: Extensions::new(),
        }
    }

    /// Set the extensions.
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }
}

impl HandshakeBody for ClientHello {
    const TYPE: HandshakeType = HandshakeType::ClientHello;

    fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::new();

        // Legacy version (always 0x0303 on the wire)
        buf.put_u16(ProtocolVersion::Tls12.to_u16());

        // Random (32 bytes)
        buf.put_slice(&self.random);

        // Legacy session ID (empty)
        buf.put_u8(0);

        // Cipher suites (length + data)
        let cipher_suites_len = self.cipher_suites.len() * 2;
        if self.cipher_suites.is_empty() || cipher_suites_len > 65534 {
            return Err(Error::Decode("Invalid cipher suite count".into()));
        }
        buf.put_u16(cipher_suites_len as u16);
        for suite in &self.cipher_suites {
            buf.put_u16(suite.to_u16());
        }

        // Legacy compression methods (null only)
        buf.put_u8(1);
        buf.put_u8(0);

        // Extensions
        buf.put_slice(&self.extensions.encode());

        Ok(buf.to_vec())
    }

    fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 41 {
            // 2 (version) + 32 (random) + 1 (sid_len) + 2 (cs_len) + 2 (cm) + 2 (ext_len)
            return Err(Error::Decode("ClientHello too short".into()));
        }

        // Legacy version
        let version_raw = data.get_u16();
        ProtocolVersion::from_u16(version_raw)
            .ok_or_else(|| Error::Decode("Invalid legacy version".into()))?;

        // Random
        let mut random = [0u8; 32];
        data.copy_to_slice(&mut random);

        // Legacy session ID
        let session_id_len = data.get_u8() as usize;
        if session_id_len > 32 {
            return Err(Error::Decode("Session ID too long".into()));
        }
        if data.len() < session_id_len {
            return Err(Error::Decode("Incomplete session ID".into()));
        }
        data.advance(session_id_len);

        // Cipher suites
        if data.len() < 2 {
            return Err(Error::Decode("Missing cipher suites length".into()));
        }
        let cipher_suites_len = data.get_u16() as usize;
        if cipher_suites_len % 2 != 0 || cipher_suites_len < 2 {
            return Err(Error::Decode("Invalid cipher suites length".into()));
        }
        if data.len() < cipher_suites_len {
            return Err(Error::Decode("Incomplete cipher suites".into()));
        }
        let mut cipher_suites = Vec::new();
        for _ in 0..(cipher_suites_len / 2) {
            let suite_raw = data.get_u16();
            if let Some(suite) = CipherSuite::from_u16(suite_raw) {
                cipher_suites.push(suite);
            }
            // Unknown cipher suites are silently ignored
        }

        // Legacy compression methods
        if data.is_empty() {
            return Err(Error::Decode("Missing compression methods length".into()));
        }
        let compression_len = data.get_u8() as usize;
        if compression_len == 0 || data.len() < compression_len {
            return Err(Error::Decode("Invalid compression methods".into()));
        }
        data.advance(compression_len);

        // Extensions
        let extensions = Extensions::decode(data)?;

        Ok(Self {
            random,
            cipher_suites,
            extensions,
        })
    }
}
