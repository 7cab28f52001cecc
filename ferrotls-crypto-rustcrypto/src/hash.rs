//! Hash function implementations backed by the `sha2` crate.

use ferrotls_crypto::{Hash, HashAlgorithm, Result};
use sha2::Digest;

/// Create a hash instance for the specified algorithm.
pub fn create_hash(algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
    match algorithm {
        HashAlgorithm::Sha256 => Ok(Box::new(Sha256Hash::new())),
        HashAlgorithm::Sha384 => Ok(Box::new(Sha384Hash::new())),
        HashAlgorithm::Sha512 => Ok(Box::new(Sha512Hash::new())),
    }
}

struct Sha256Hash {
    hasher: sha2::Sha256,
}

impl Sha256Hash {
    fn new() -> Self {
        Self {
            hasher: sha2::Sha256::new(),
        }
    }
}

impl Hash for Sha256Hash {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }
}

struct Sha384Hash {
    hasher: sha2::Sha384,
}

impl Sha384Hash {
    fn new() -> Self {
        Self {
            hasher: sha2::Sha384::new(),
        }
    }
}

impl Hash for Sha384Hash {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        48
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha384
    }
}

struct Sha512Hash {
    hasher: sha2::Sha512,
}

impl Sha512Hash {
    fn new() -> Self {
        Self {
            hasher: sha2::Sha512::new(),
        }
    }
}

impl Hash for Sha512Hash {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        64
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha512
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_incremental() {
        let mut hash1 = create_hash(HashAlgorithm::Sha256).unwrap();
        hash1.update(b"hello ");
        hash1.update(b"world");
        let digest1 = hash1.finalize();

        let mut hash2 = create_hash(HashAlgorithm::Sha256).unwrap();
        hash2.update(b"hello world");
        let digest2 = hash2.finalize();

        assert_eq!(digest1, digest2);
    }

    #[test]
    fn test_sha256_known_vector() {
        let mut hash = create_hash(HashAlgorithm::Sha256).unwrap();
        hash.update(b"abc");
        let digest = hash.finalize();

        // SHA-256("abc"), FIPS 180-4 example
        let expected =
            hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
                .unwrap();
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_output_sizes() {
        let mut hash = create_hash(HashAlgorithm::Sha384).unwrap();
        hash.update(b"x");
        assert_eq!(hash.output_size(), 48);
        assert_eq!(hash.finalize().len(), 48);

        let hash = create_hash(HashAlgorithm::Sha512).unwrap();
        assert_eq!(hash.output_size(), 64);
    }
}
