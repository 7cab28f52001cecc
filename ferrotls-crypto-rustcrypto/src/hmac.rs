//! HMAC implementations backed by the `hmac` crate.

use ferrotls_crypto::{Error, HashAlgorithm, Hmac, Result};
use hmac::Mac;

type HmacSha256 = hmac::Hmac<sha2::Sha256>;
type HmacSha384 = hmac::Hmac<sha2::Sha384>;
type HmacSha512 = hmac::Hmac<sha2::Sha512>;

/// Create an HMAC instance keyed with `key`.
pub fn create_hmac(algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mac = HmacSha256::new_from_slice(key)
                .map_err(|_| Error::CryptoError("HMAC key setup failed".into()))?;
            Ok(Box::new(HmacImpl {
                mac,
                algorithm,
                output: 32,
            }))
        },
        HashAlgorithm::Sha384 => {
            let mac = HmacSha384::new_from_slice(key)
                .map_err(|_| Error::CryptoError("HMAC key setup failed".into()))?;
            Ok(Box::new(HmacImpl {
                mac,
                algorithm,
                output: 48,
            }))
        },
        HashAlgorithm::Sha512 => {
            let mac = HmacSha512::new_from_slice(key)
                .map_err(|_| Error::CryptoError("HMAC key setup failed".into()))?;
            Ok(Box::new(HmacImpl {
                mac,
                algorithm,
                output: 64,
            }))
        },
    }
}

struct HmacImpl<M: Mac> {
    mac: M,
    algorithm: HashAlgorithm,
    output: usize,
}

impl<M: Mac + Send> Hmac for HmacImpl<M> {
    fn update(&mut self, data: &[u8]) {
        self.mac.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.mac.finalize().into_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        self.output
    }

    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha256_rfc4231_case1() {
        let key = [0x0bu8; 20];
        let mut mac = create_hmac(HashAlgorithm::Sha256, &key).unwrap();
        mac.update(b"Hi There");
        let tag = mac.finalize();

        let expected =
            hex::decode("b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7")
                .unwrap();
        assert_eq!(tag, expected);
    }

    #[test]
    fn test_hmac_verify_constant_time() {
        let mut mac = create_hmac(HashAlgorithm::Sha256, b"key").unwrap();
        mac.update(b"message");
        let tag = {
            let mut mac2 = create_hmac(HashAlgorithm::Sha256, b"key").unwrap();
            mac2.update(b"message");
            mac2.finalize()
        };
        assert!(mac.verify(&tag));

        let mut mac3 = create_hmac(HashAlgorithm::Sha256, b"key").unwrap();
        mac3.update(b"message");
        let mut bad = tag.clone();
        bad[0] ^= 1;
        assert!(!mac3.verify(&bad));
    }
}
