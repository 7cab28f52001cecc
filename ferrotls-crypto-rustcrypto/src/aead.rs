//! AEAD implementations backed by the `aes-gcm` crate.

use aes_gcm::aead::{Aead as _, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use ferrotls_crypto::{Aead, AeadAlgorithm, Error, Result};

/// Create an AEAD cipher instance for the specified algorithm.
pub fn create_aead(algorithm: AeadAlgorithm) -> Result<Box<dyn Aead>> {
    match algorithm {
        AeadAlgorithm::Aes128Gcm => Ok(Box::new(AesGcmAead { algorithm })),
        AeadAlgorithm::Aes256Gcm => Ok(Box::new(AesGcmAead { algorithm })),
    }
}

struct AesGcmAead {
    algorithm: AeadAlgorithm,
}

impl AesGcmAead {
    fn check_params(&self, key: &[u8], nonce: &[u8]) -> Result<()> {
        if key.len() != self.algorithm.key_size() {
            return Err(Error::InvalidKeySize {
                expected: self.algorithm.key_size(),
                actual: key.len(),
            });
        }
        if nonce.len() != self.algorithm.nonce_size() {
            return Err(Error::InvalidNonceSize {
                expected: self.algorithm.nonce_size(),
                actual: nonce.len(),
            });
        }
        Ok(())
    }
}

impl Aead for AesGcmAead {
    fn seal(&self, key: &[u8], nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.check_params(key, nonce)?;
        let payload = Payload {
            msg: plaintext,
            aad,
        };
        let nonce = Nonce::from_slice(nonce);
        match self.algorithm {
            AeadAlgorithm::Aes128Gcm => {
                let cipher = Aes128Gcm::new_from_slice(key)
                    .map_err(|_| Error::CryptoError("AES key setup failed".into()))?;
                cipher
                    .encrypt(nonce, payload)
                    .map_err(|_| Error::CryptoError("AES-GCM encryption failed".into()))
            },
            AeadAlgorithm::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(key)
                    .map_err(|_| Error::CryptoError("AES key setup failed".into()))?;
                cipher
                    .encrypt(nonce, payload)
                    .map_err(|_| Error::CryptoError("AES-GCM encryption failed".into()))
            },
        }
    }

    fn open(&self, key: &[u8], nonce: &[u8], aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.check_params(key, nonce)?;
        let payload = Payload {
            msg: ciphertext,
            aad,
        };
        let nonce = Nonce::from_slice(nonce);
        match self.algorithm {
            AeadAlgorithm::Aes128Gcm => {
                let cipher = Aes128Gcm::new_from_slice(key)
                    .map_err(|_| Error::CryptoError("AES key setup failed".into()))?;
                cipher.decrypt(nonce, payload).map_err(|_| Error::AuthenticationFailed)
            },
            AeadAlgorithm::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(key)
                    .map_err(|_| Error::CryptoError("AES key setup failed".into()))?;
                cipher.decrypt(nonce, payload).map_err(|_| Error::AuthenticationFailed)
            },
        }
    }

    fn algorithm(&self) -> AeadAlgorithm {
        self.algorithm
    }
}
