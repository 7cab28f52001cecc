//! Ephemeral key-share generation and agreement.

use crate::error::{Error, Result};
use crate::extension_types::KeyShareEntry;
use ferrotls_crypto::{CryptoProvider, KeyExchangeAlgorithm, PrivateKey, SharedSecret};

/// Generate an ephemeral key pair for a group.
///
/// Returns the public share (ready for a key_share extension) and the
/// private key. Consumes entropy; has no other side effects.
pub fn generate(
    provider: &dyn CryptoProvider,
    group: KeyExchangeAlgorithm,
) -> Result<(KeyShareEntry, PrivateKey)> {
    let kex = provider
        .key_exchange(group)
        .map_err(|e| Error::KeyGeneration(format!("{}: {}", group.name(), e)))?;
    let (private, public) = kex
        .generate_keypair()
        .map_err(|e| Error::KeyGeneration(format!("{}: {}", group.name(), e)))?;

    Ok((
        KeyShareEntry {
            group,
            key_exchange: public.into_bytes(),
        },
        private,
    ))
}

/// Compute the ECDHE shared secret against a peer's public share.
pub fn agree(
    provider: &dyn CryptoProvider,
    group: KeyExchangeAlgorithm,
    peer_public: &[u8],
    private: &PrivateKey,
) -> Result<SharedSecret> {
    let kex = provider
        .key_exchange(group)
        .map_err(|e| Error::KeyAgreement(format!("{}: {}", group.name(), e)))?;
    kex.exchange(private, peer_public)
        .map_err(|e| Error::KeyAgreement(format!("{}: {}", group.name(), e)))
}

/// The offering side's private key table.
///
/// One ephemeral pair per offered group, held between hello construction and
/// shared-secret computation. Taking a private key consumes its entry, so a
/// scalar cannot be used twice.
#[derive(Debug)]
pub struct OfferedKeyShares {
    entries: Vec<KeyShareEntry>,
    private_keys: Vec<(KeyExchangeAlgorithm, PrivateKey)>,
}

impl OfferedKeyShares {
    /// Generate one ephemeral pair per group, in the given order.
    pub fn offer(
        provider: &dyn CryptoProvider,
        groups: &[KeyExchangeAlgorithm],
    ) -> Result<Self> {
        let mut entries = Vec::with_capacity(groups.len());
        let mut private_keys = Vec::with_capacity(groups.len());

        for &group in groups {
            let (entry, private) = generate(provider, group)?;
            entries.push(entry);
            private_keys.push((group, private));
        }

        Ok(Self {
            entries,
            private_keys,
        })
    }

    /// The public shares, in offer order.
    pub fn entries(&self) -> &[KeyShareEntry] {
        &self.entries
    }

    /// Take the private key for a group, consuming it.
    ///
    /// Returns `None` if the group was never offered or its key was already
    /// taken.
    pub fn take_private(&mut self, group: KeyExchangeAlgorithm) -> Option<PrivateKey> {
        let pos = self.private_keys.iter().position(|(g, _)| *g == group)?;
        Some(self.private_keys.remove(pos).1)
    }
}
