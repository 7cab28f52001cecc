//! HKDF implementations backed by the `hkdf` crate.

use ferrotls_crypto::{Error, Kdf, KdfAlgorithm, Result};
use hkdf::Hkdf;

/// Create a KDF instance for the specified algorithm.
pub fn create_kdf(algorithm: KdfAlgorithm) -> Result<Box<dyn Kdf>> {
    match algorithm {
        KdfAlgorithm::HkdfSha256 => Ok(Box::new(HkdfSha256Kdf)),
        KdfAlgorithm::HkdfSha384 => Ok(Box::new(HkdfSha384Kdf)),
        KdfAlgorithm::HkdfSha512 => Ok(Box::new(HkdfSha512Kdf)),
    }
}

macro_rules! hkdf_impl {
    ($name:ident, $hash:ty, $alg:expr) => {
        struct $name;

        impl Kdf for $name {
            fn extract(&self, salt: &[u8], ikm: &[u8]) -> Vec<u8> {
                let (prk, _) = Hkdf::<$hash>::extract(Some(salt), ikm);
                prk.to_vec()
            }

            fn expand(&self, prk: &[u8], info: &[u8], length: usize) -> Result<Vec<u8>> {
                let hk = Hkdf::<$hash>::from_prk(prk)
                    .map_err(|_| Error::CryptoError("HKDF PRK too short".into()))?;
                let mut okm = vec![0u8; length];
                hk.expand(info, &mut okm).map_err(|_| Error::InvalidLength)?;
                Ok(okm)
            }

            fn algorithm(&self) -> KdfAlgorithm {
                $alg
            }
        }
    };
}

hkdf_impl!(HkdfSha256Kdf, sha2::Sha256, KdfAlgorithm::HkdfSha256);
hkdf_impl!(HkdfSha384Kdf, sha2::Sha384, KdfAlgorithm::HkdfSha384);
hkdf_impl!(HkdfSha512Kdf, sha2::Sha512, KdfAlgorithm::HkdfSha512);
