//! Record layer: framing, protection, and rekeying for one direction.
//!
//! A [`RecordLayer`] wraps one half of a reliable byte stream. It starts out
//! unkeyed (plaintext records) and is switched to a symmetric key set by
//! [`RecordLayer::rekey`] at the two handshake transition points. Protected
//! records use the TLS 1.3 construction: the true content type moves inside
//! the ciphertext, the nonce is the static IV XORed with the record sequence
//! number, and the outer header is the additional authenticated data.

use crate::cipher::CipherSuite;
use crate::error::{Error, Result};
use crate::protocol::{ContentType, ProtocolVersion};
use ferrotls_crypto::{Aead, CryptoProvider};
use std::io::{Read, Write};
use zeroize::Zeroizing;

/// Maximum plaintext fragment size.
pub const MAX_FRAGMENT_SIZE: usize = 16384;

/// Record header size (type + version + length).
pub const RECORD_HEADER_SIZE: usize = 5;

/// A plaintext record.
#[derive(Debug, Clone)]
pub struct TlsPlaintext {
    /// Content type
    pub content_type: ContentType,

    /// Fragment data
    pub fragment: Vec<u8>,
}

impl TlsPlaintext {
    /// Create a new plaintext record.
    pub fn new(content_type: ContentType, fragment: Vec<u8>) -> Self {
        Self {
            content_type,
            fragment,
        }
    }
}

/// Active protection state for one direction.
struct Protection {
    suite: CipherSuite,
    aead: Box<dyn Aead>,
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
    sequence_number: u64,
}

impl Protection {
    /// Per-record nonce: sequence number XORed into the tail of the IV.
    fn next_nonce(&self) -> Vec<u8> {
        let mut nonce = self.iv.to_vec();
        let seq_bytes = self.sequence_number.to_be_bytes();
        let iv_len = nonce.len();
        for (i, &byte) in seq_bytes.iter().enumerate() {
            nonce[iv_len - 8 + i] ^= byte;
        }
        nonce
    }

    fn bump_sequence(&mut self) -> Result<()> {
        self.sequence_number = self
            .sequence_number
            .checked_add(1)
            .ok_or_else(|| Error::Internal("Record sequence number overflow".into()))?;
        Ok(())
    }
}

/// One direction of a connection's record transport.
pub struct RecordLayer<S> {
    stream: S,
    protection: Option<Protection>,
}

impl<S> std::fmt::Debug for RecordLayer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordLayer")
            .field("keyed", &self.protection.is_some())
            .finish()
    }
}

impl<S> RecordLayer<S> {
    /// Create a new, unkeyed record layer over a stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            protection: None,
        }
    }

    /// Whether this channel has been rekeyed at least once.
    pub fn is_keyed(&self) -> bool {
        self.protection.is_some()
    }

    /// Consume the layer and return the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Switch the active symmetric key set for this channel.
    ///
    /// Fails if the key or IV length does not match what the suite requires.
    /// The record sequence number restarts at zero under the new keys.
    pub fn rekey(
        &mut self,
        provider: &dyn CryptoProvider,
        suite: CipherSuite,
        key: &[u8],
        iv: &[u8],
    ) -> Result<()> {
        if key.len() != suite.key_length() {
            return Err(Error::InvalidConfig(format!(
                "Rekey with {}-byte key, suite {} requires {}",
                key.len(),
                suite.name(),
                suite.key_length()
            )));
        }
        if iv.len() != suite.iv_length() {
            return Err(Error::InvalidConfig(format!(
                "Rekey with {}-byte IV, suite {} requires {}",
                iv.len(),
                suite.name(),
                suite.iv_length()
            )));
        }

        let aead = provider
            .aead(suite.aead_algorithm())
            .map_err(|e| Error::UnsupportedSuite(format!("{}: {}", suite.name(), e)))?;

        self.protection = Some(Protection {
            suite,
            aead,
            key: Zeroizing::new(key.to_vec()),
            iv: Zeroizing::new(iv.to_vec()),
            sequence_number: 0,
        });

        Ok(())
    }
}

fn record_header(content_type: ContentType, len: usize) -> [u8; RECORD_HEADER_SIZE] {
    let version = ProtocolVersion::Tls12.to_u16().to_be_bytes();
    let len = (len as u16).to_be_bytes();
    [content_type.to_u8(), version[0], version[1], len[0], len[1]]
}

impl<S: Write> RecordLayer<S> {
    /// Write one record, protecting it if this channel is keyed.
    pub fn write_record(&mut self, content_type: ContentType, fragment: &[u8]) -> Result<()> {
        if fragment.len() > MAX_FRAGMENT_SIZE {
            return Err(Error::Internal("Fragment too large".into()));
        }

        let (header, payload) = match self.protection.as_mut() {
            None => (record_header(content_type, fragment.len()), fragment.to_vec()),
            Some(protection) => {
                // Inner plaintext: fragment || true content type
                let mut inner = Vec::with_capacity(fragment.len() + 1);
                inner.extend_from_slice(fragment);
                inner.push(content_type.to_u8());

                let tag_size = protection.suite.aead_algorithm().tag_size();
                let header =
                    record_header(ContentType::ApplicationData, inner.len() + tag_size);
                let nonce = protection.next_nonce();
                let ciphertext =
                    protection.aead.seal(&protection.key, &nonce, &header, &inner)?;
                protection.bump_sequence()?;

                (header, ciphertext)
            },
        };

        self.stream
            .write_all(&header)
            .and_then(|_| self.stream.write_all(&payload))
            .and_then(|_| self.stream.flush())
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

impl<S: Read> RecordLayer<S> {
    /// Read one record, unprotecting it if this channel is keyed.
    pub fn read_record(&mut self) -> Result<TlsPlaintext> {
        let mut header = [0u8; RECORD_HEADER_SIZE];
        self.stream
            .read_exact(&mut header)
            .map_err(|e| Error::Transport(e.to_string()))?;

        let wire_type = ContentType::from_u8(header[0])
            .ok_or_else(|| Error::Decode(format!("Invalid content type: {}", header[0])))?;
        let version_raw = u16::from_be_bytes([header[1], header[2]]);
        ProtocolVersion::from_u16(version_raw)
            .ok_or_else(|| Error::Decode("Invalid record version".into()))?;
        let length = u16::from_be_bytes([header[3], header[4]]) as usize;
        if length > MAX_FRAGMENT_SIZE + 256 {
            return Err(Error::Decode("Record overflow".into()));
        }

        let mut payload = vec![0u8; length];
        self.stream
            .read_exact(&mut payload)
            .map_err(|e| Error::Transport(e.to_string()))?;

        match self.protection.as_mut() {
            None => Ok(TlsPlaintext::new(wire_type, payload)),
            Some(protection) => {
                let nonce = protection.next_nonce();
                let inner = protection
                    .aead
                    .open(&protection.key, &nonce, &header, &payload)
                    .map_err(|_| Error::Decode("Record decryption failed".into()))?;
                protection.bump_sequence()?;

                // True content type is the last non-zero byte
                let mut end = inner.len();
                while end > 0 && inner[end - 1] == 0 {
                    end -= 1;
                }
                if end == 0 {
                    return Err(Error::Decode("Protected record without content type".into()));
                }
                let content_type = ContentType::from_u8(inner[end - 1]).ok_or_else(|| {
                    Error::Decode(format!("Invalid inner content type: {}", inner[end - 1]))
                })?;

                Ok(TlsPlaintext::new(content_type, inner[..end - 1].to_vec()))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrotls_crypto_rustcrypto::RustCryptoProvider;
    use std::io::Cursor;

    const SUITE: CipherSuite = CipherSuite::EcdheEcdsaWithAes128GcmSha256;

    #[test]
    fn test_plaintext_roundtrip() {
        let mut writer = RecordLayer::new(Vec::new());
        writer.write_record(ContentType::Handshake, b"hello").unwrap();

        let wire = writer.stream.clone();
        assert_eq!(wire[0], 22);

        let mut reader = RecordLayer::new(Cursor::new(wire));
        let record = reader.read_record().unwrap();
        assert_eq!(record.content_type, ContentType::Handshake);
        assert_eq!(record.fragment, b"hello");
    }

    #[test]
    fn test_rekey_validates_lengths() {
        let provider = RustCryptoProvider::new();
        let mut layer = RecordLayer::new(Vec::<u8>::new());

        assert!(layer.rekey(&provider, SUITE, &[0u8; 15], &[0u8; 12]).is_err());
        assert!(layer.rekey(&provider, SUITE, &[0u8; 16], &[0u8; 11]).is_err());
        assert!(layer.rekey(&provider, SUITE, &[0u8; 16], &[0u8; 12]).is_ok());
        assert!(layer.is_keyed());
    }

    #[test]
    fn test_protected_roundtrip() {
        let provider = RustCryptoProvider::new();
        let key = [0x42u8; 16];
        let iv = [0x24u8; 12];

        let mut writer = RecordLayer::new(Vec::new());
        writer.rekey(&provider, SUITE, &key, &iv).unwrap();
        writer.write_record(ContentType::Handshake, b"finished message").unwrap();
        writer.write_record(ContentType::ApplicationData, b"payload").unwrap();

        let wire = writer.stream.clone();
        // Outer type of a protected record is ApplicationData
        assert_eq!(wire[0], 23);
        // And the plaintext is not on the wire
        assert!(!wire.windows(8).any(|w| w == b"finished"));

        let mut reader = RecordLayer::new(Cursor::new(wire));
        reader.rekey(&provider, SUITE, &key, &iv).unwrap();

        let first = reader.read_record().unwrap();
        assert_eq!(first.content_type, ContentType::Handshake);
        assert_eq!(first.fragment, b"finished message");

        let second = reader.read_record().unwrap();
        assert_eq!(second.content_type, ContentType::ApplicationData);
        assert_eq!(second.fragment, b"payload");
    }

    #[test]
    fn test_wrong_key_fails() {
        let provider = RustCryptoProvider::new();

        let mut writer = RecordLayer::new(Vec::new());
        writer.rekey(&provider, SUITE, &[1u8; 16], &[1u8; 12]).unwrap();
        writer.write_record(ContentType::Handshake, b"secret").unwrap();

        let mut reader = RecordLayer::new(Cursor::new(writer.stream.clone()));
        reader.rekey(&provider, SUITE, &[2u8; 16], &[1u8; 12]).unwrap();
        assert!(reader.read_record().is_err());
    }

    #[test]
    fn test_rekey_mid_stream_switches_keys() {
        let provider = RustCryptoProvider::new();

        let mut writer = RecordLayer::new(Vec::new());
        writer.write_record(ContentType::Handshake, b"clear").unwrap();
        writer.rekey(&provider, SUITE, &[7u8; 16], &[7u8; 12]).unwrap();
        writer.write_record(ContentType::Handshake, b"sealed").unwrap();

        let mut reader = RecordLayer::new(Cursor::new(writer.stream.clone()));
        assert_eq!(reader.read_record().unwrap().fragment, b"clear");
        reader.rekey(&provider, SUITE, &[7u8; 16], &[7u8; 12]).unwrap();
        assert_eq!(reader.read_record().unwrap().fragment, b"sealed");
    }
}
