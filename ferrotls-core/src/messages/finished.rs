//! Finished message.

use crate::error::{Error, Result};
use crate::messages::HandshakeBody;
use crate::protocol::HandshakeType;

/// Finished message.
///
/// Carries verify-data bound to one direction and to the transcript state at
/// the point of computation. Valid only if it byte-for-byte matches the value
/// the peer independently derives from the same transcript prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    /// Verify data (truncated HMAC over the transcript hash)
    pub verify_data: Vec<u8>,
}

impl Finished {
    /// Create a new Finished message.
    pub fn new(verify_data: Vec<u8>) -> Self {
        Self { verify_data }
    }

    /// Decode a Finished body expecting exactly `verify_data_len` bytes.
    pub fn decode_with_len(data: &[u8], verify_data_len: usize) -> Result<Self> {
        if data.len() != verify_data_len {
            return Err(Error::Decode(format!(
                "Finished verify-data length {} does not match expected {}",
                data.len(),
                verify_data_len
            )));
        }
        Ok(Self {
            verify_data: data.to_vec(),
        })
    }
}

impl HandshakeBody for Finished {
    const TYPE: HandshakeType = HandshakeType::Finished;

    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.verify_data.clone())
    }

    fn decode(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Decode("Empty Finished body".into()));
        }
        Ok(Self {
            verify_data: data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_len() {
        let data = [7u8; 20];
        let fin = Finished::decode_with_len(&data, 20).unwrap();
        assert_eq!(fin.verify_data, data);

        assert!(Finished::decode_with_len(&data, 32).is_err());
        assert!(Finished::decode_with_len(&data[..19], 20).is_err());
    }

    #[test]
    fn test_encode_roundtrip() {
        let fin = Finished::new(vec![1, 2, 3, 4]);
        let encoded = fin.encode().unwrap();
        assert_eq!(Finished::decode(&encoded).unwrap(), fin);
    }
}
