//! Handshake message framing over the record layer.
//!
//! Handshake messages carry a 4-byte header (type + 24-bit length) and may be
//! split across records or coalesced into one; the reader buffers record
//! fragments until a whole message is available.

use crate::error::{Error, Result};
use crate::messages::HandshakeBody;
use crate::protocol::{ContentType, HandshakeType};
use crate::record::RecordLayer;
use bytes::{Buf, BufMut, BytesMut};
use std::io::{Read, Write};

/// A raw handshake message: a type tag and its body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    /// Message type
    pub msg_type: HandshakeType,

    /// Message body (without the 4-byte header)
    pub payload: Vec<u8>,
}

impl HandshakeMessage {
    /// Create a new handshake message.
    pub fn new(msg_type: HandshakeType, payload: Vec<u8>) -> Self {
        Self { msg_type, payload }
    }

    /// Encode the handshake message with its 4-byte header.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let len = self.payload.len();
        if len > 0x00FF_FFFF {
            return Err(Error::Decode("Handshake message too large".into()));
        }

        let mut buf = BytesMut::with_capacity(4 + len);
        buf.put_u8(self.msg_type.to_u8());
        buf.put_u8(((len >> 16) & 0xFF) as u8);
        buf.put_u8(((len >> 8) & 0xFF) as u8);
        buf.put_u8((len & 0xFF) as u8);
        buf.put_slice(&self.payload);

        Ok(buf.to_vec())
    }

    /// Decode a handshake message from bytes.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::Decode("Handshake message too short".into()));
        }

        let msg_type_raw = data.get_u8();
        let msg_type = HandshakeType::from_u8(msg_type_raw)
            .ok_or_else(|| Error::Decode(format!("Unknown handshake type: {}", msg_type_raw)))?;

        let len_high = data.get_u8() as usize;
        let len_mid = data.get_u8() as usize;
        let len_low = data.get_u8() as usize;
        let length = (len_high << 16) | (len_mid << 8) | len_low;

        if data.len() < length {
            return Err(Error::Decode("Incomplete handshake message".into()));
        }

        Ok(Self {
            msg_type,
            payload: data[..length].to_vec(),
        })
    }
}

/// Handshake-message transport over one direction's record layer.
#[derive(Debug)]
pub struct HandshakeLayer<'a, S> {
    record: &'a mut RecordLayer<S>,
    buffer: Vec<u8>,
}

impl<'a, S> HandshakeLayer<'a, S> {
    /// Create a handshake layer over a record channel.
    pub fn new(record: &'a mut RecordLayer<S>) -> Self {
        Self {
            record,
            buffer: Vec::new(),
        }
    }

    /// Switch the underlying record channel's key set.
    pub fn rekey(
        &mut self,
        provider: &dyn ferrotls_crypto::CryptoProvider,
        suite: crate::cipher::CipherSuite,
        key: &[u8],
        iv: &[u8],
    ) -> Result<()> {
        self.record.rekey(provider, suite, key, iv)
    }

    /// Length of a complete buffered message, if one is available.
    fn buffered_message_len(&self) -> Option<usize> {
        if self.buffer.len() < 4 {
            return None;
        }
        let length = ((self.buffer[1] as usize) << 16)
            | ((self.buffer[2] as usize) << 8)
            | (self.buffer[3] as usize);
        if self.buffer.len() < 4 + length {
            return None;
        }
        Some(4 + length)
    }
}

impl<'a, S: Read> HandshakeLayer<'a, S> {
    /// Read the next handshake message, pulling records as needed.
    pub fn read_message(&mut self) -> Result<HandshakeMessage> {
        loop {
            if let Some(total) = self.buffered_message_len() {
                let msg = HandshakeMessage::decode(&self.buffer[..total])?;
                self.buffer.drain(..total);
                return Ok(msg);
            }

            let record = self.record.read_record()?;
            if record.content_type != ContentType::Handshake {
                return Err(Error::UnexpectedMessage(format!(
                    "Expected handshake record, got {:?}",
                    record.content_type
                )));
            }
            self.buffer.extend_from_slice(&record.fragment);
        }
    }

    /// Read the next message and decode it as a specific body type.
    ///
    /// Fails if the wire type tag does not match the destination type.
    pub fn read_body<B: HandshakeBody>(&mut self) -> Result<B> {
        let msg = self.read_message()?;
        if msg.msg_type != B::TYPE {
            return Err(Error::UnexpectedMessage(format!(
                "Expected {:?}, got {:?}",
                B::TYPE,
                msg.msg_type
            )));
        }
        B::decode(&msg.payload)
    }
}

impl<'a, S: Write> HandshakeLayer<'a, S> {
    /// Write a raw handshake message as one record.
    pub fn write_message(&mut self, msg: &HandshakeMessage) -> Result<()> {
        let encoded = msg.encode()?;
        self.record.write_record(ContentType::Handshake, &encoded)
    }

    /// Frame and write a typed message body.
    pub fn write_body<B: HandshakeBody>(&mut self, body: &B) -> Result<()> {
        let msg = HandshakeMessage::new(B::TYPE, body.encode()?);
        self.write_message(&msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Finished;
    use crate::record::RecordLayer;
    use std::io::Cursor;

    #[test]
    fn test_message_encode_decode() {
        let msg = HandshakeMessage::new(HandshakeType::ClientHello, vec![1, 2, 3, 4, 5]);

        let encoded = msg.encode().unwrap();
        assert_eq!(encoded.len(), 4 + 5);
        assert_eq!(encoded[0], 1);

        let decoded = HandshakeMessage::decode(&encoded).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_decode_unknown_type() {
        let data = [99u8, 0, 0, 0];
        assert!(HandshakeMessage::decode(&data).is_err());
    }

    #[test]
    fn test_read_coalesced_messages() {
        // Two messages packed into a single record
        let msg1 = HandshakeMessage::new(HandshakeType::Certificate, vec![1, 2, 3]);
        let msg2 = HandshakeMessage::new(HandshakeType::Finished, vec![4; 20]);
        let mut fragment = msg1.encode().unwrap();
        fragment.extend_from_slice(&msg2.encode().unwrap());

        let mut writer = RecordLayer::new(Vec::new());
        writer.write_record(ContentType::Handshake, &fragment).unwrap();

        let mut stream = RecordLayer::new(Cursor::new(writer.into_inner()));
        let mut layer = HandshakeLayer::new(&mut stream);

        assert_eq!(layer.read_message().unwrap(), msg1);
        assert_eq!(layer.read_message().unwrap(), msg2);
    }

    #[test]
    fn test_read_split_message() {
        // One message split across two records
        let msg = HandshakeMessage::new(HandshakeType::ServerHello, vec![9; 40]);
        let encoded = msg.encode().unwrap();

        let mut writer = RecordLayer::new(Vec::new());
        writer.write_record(ContentType::Handshake, &encoded[..10]).unwrap();
        writer.write_record(ContentType::Handshake, &encoded[10..]).unwrap();

        let mut stream = RecordLayer::new(Cursor::new(writer.into_inner()));
        let mut layer = HandshakeLayer::new(&mut stream);
        assert_eq!(layer.read_message().unwrap(), msg);
    }

    #[test]
    fn test_read_body_checks_type_tag() {
        let msg = HandshakeMessage::new(HandshakeType::Certificate, vec![1, 2, 3]);

        let mut writer = RecordLayer::new(Vec::new());
        {
            let mut layer = HandshakeLayer::new(&mut writer);
            layer.write_message(&msg).unwrap();
        }

        let mut stream = RecordLayer::new(Cursor::new(writer.into_inner()));
        let mut layer = HandshakeLayer::new(&mut stream);
        let result: Result<Finished> = layer.read_body();
        assert!(matches!(result, Err(Error::UnexpectedMessage(_))));
    }
}
