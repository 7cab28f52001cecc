//! ECDHE key exchange over the NIST curves, backed by the `p256`/`p384`/`p521`
//! crates.
//!
//! Public shares travel as uncompressed SEC1 points; shared secrets are the
//! raw x-coordinate bytes, as TLS expects.

use ferrotls_crypto::{
    key_exchange::{KeyExchangeAlgorithm, PrivateKey, PublicKey, SharedSecret},
    Error, KeyExchange, Result,
};
use rand_core::OsRng;

/// Create a key exchange instance for the specified group.
pub fn create_key_exchange(algorithm: KeyExchangeAlgorithm) -> Result<Box<dyn KeyExchange>> {
    match algorithm {
        KeyExchangeAlgorithm::Secp256r1 => Ok(Box::new(EcdhP256)),
        KeyExchangeAlgorithm::Secp384r1 => Ok(Box::new(EcdhP384)),
        KeyExchangeAlgorithm::Secp521r1 => Ok(Box::new(EcdhP521)),
    }
}

macro_rules! ecdh_impl {
    ($name:ident, $curve:ident, $alg:expr) => {
        #[derive(Debug)]
        struct $name;

        impl KeyExchange for $name {
            fn generate_keypair(&self) -> Result<(PrivateKey, PublicKey)> {
                use $curve::elliptic_curve::sec1::ToEncodedPoint;

                let secret = $curve::SecretKey::random(&mut OsRng);
                let public = secret.public_key().to_encoded_point(false);

                Ok((
                    PrivateKey::from_bytes(secret.to_bytes().to_vec()),
                    PublicKey::from_bytes(public.as_bytes().to_vec()),
                ))
            }

            fn exchange(
                &self,
                private_key: &PrivateKey,
                peer_public_key: &[u8],
            ) -> Result<SharedSecret> {
                let secret = $curve::SecretKey::from_slice(private_key.as_bytes())
                    .map_err(|_| Error::InvalidPrivateKey)?;
                let peer = $curve::PublicKey::from_sec1_bytes(peer_public_key)
                    .map_err(|_| Error::InvalidPublicKey)?;

                let shared =
                    $curve::ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
                Ok(SharedSecret::from_bytes(
                    shared.raw_secret_bytes().to_vec(),
                ))
            }

            fn algorithm(&self) -> KeyExchangeAlgorithm {
                $alg
            }
        }
    };
}

ecdh_impl!(EcdhP256, p256, KeyExchangeAlgorithm::Secp256r1);
ecdh_impl!(EcdhP384, p384, KeyExchangeAlgorithm::Secp384r1);
ecdh_impl!(EcdhP521, p521, KeyExchangeAlgorithm::Secp521r1);

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_GROUPS: &[KeyExchangeAlgorithm] = &[
        KeyExchangeAlgorithm::Secp256r1,
        KeyExchangeAlgorithm::Secp384r1,
        KeyExchangeAlgorithm::Secp521r1,
    ];

    #[test]
    fn test_keypair_sizes() {
        for &group in ALL_GROUPS {
            let kex = create_key_exchange(group).unwrap();
            let (_, public) = kex.generate_keypair().unwrap();
            assert_eq!(
                public.as_bytes().len(),
                group.public_key_size(),
                "{} public key size",
                group.name()
            );
            // Uncompressed SEC1 points start with 0x04
            assert_eq!(public.as_bytes()[0], 0x04);
        }
    }

    #[test]
    fn test_ecdh_symmetry() {
        for &group in ALL_GROUPS {
            let kex = create_key_exchange(group).unwrap();

            let (alice_private, alice_public) = kex.generate_keypair().unwrap();
            let (bob_private, bob_public) = kex.generate_keypair().unwrap();

            let alice_shared = kex.exchange(&alice_private, bob_public.as_bytes()).unwrap();
            let bob_shared = kex.exchange(&bob_private, alice_public.as_bytes()).unwrap();

            assert_eq!(
                alice_shared.as_bytes(),
                bob_shared.as_bytes(),
                "{} shared secrets diverge",
                group.name()
            );
            assert_eq!(alice_shared.as_bytes().len(), group.shared_secret_size());
        }
    }

    #[test]
    fn test_rejects_malformed_peer_share() {
        let kex = create_key_exchange(KeyExchangeAlgorithm::Secp256r1).unwrap();
        let (private, _) = kex.generate_keypair().unwrap();

        // Wrong length
        assert!(matches!(
            kex.exchange(&private, &[0x04; 10]),
            Err(Error::InvalidPublicKey)
        ));

        // Right length, not on curve
        let mut junk = vec![0x04u8; 65];
        junk[1..].fill(0xFF);
        assert!(matches!(
            kex.exchange(&private, &junk),
            Err(Error::InvalidPublicKey)
        ));
    }

    #[test]
    fn test_fresh_keypairs_differ() {
        let kex = create_key_exchange(KeyExchangeAlgorithm::Secp384r1).unwrap();
        let (_, public1) = kex.generate_keypair().unwrap();
        let (_, public2) = kex.generate_keypair().unwrap();
        assert_ne!(public1.as_bytes(), public2.as_bytes());
    }
}
