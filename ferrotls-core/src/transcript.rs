//! Transcript hash management.
//!
//! The transcript is the ordered accumulation of handshake message bodies
//! exchanged so far. Its hash binds later messages (the Finished exchange in
//! particular) to everything negotiated before them: deriving traffic secrets
//! and verify-data from the transcript hash is what turns raw secret
//! agreement into an authenticated negotiation.

use crate::error::{Error, Result};
use ferrotls_crypto::{CryptoProvider, HashAlgorithm};

/// Running transcript of handshake message bodies.
#[derive(Debug, Clone)]
pub struct TranscriptHash {
    /// Hash algorithm being used
    algorithm: HashAlgorithm,
    /// All message bodies in order
    messages: Vec<Vec<u8>>,
    /// Cached hash (computed lazily)
    cached_hash: Option<Vec<u8>>,
}

impl TranscriptHash {
    /// Create a new transcript hash with the specified algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            messages: Vec::new(),
            cached_hash: None,
        }
    }

    /// Get the hash algorithm being used.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Append a message body to the transcript.
    pub fn update(&mut self, body: &[u8]) {
        self.messages.push(body.to_vec());
        self.cached_hash = None;
    }

    /// Compute the current transcript hash.
    pub fn current_hash(&mut self, provider: &dyn CryptoProvider) -> Result<Vec<u8>> {
        if let Some(ref hash) = self.cached_hash {
            return Ok(hash.clone());
        }

        let mut hasher = provider.hash(self.algorithm)?;
        for msg in &self.messages {
            hasher.update(msg);
        }
        let hash = hasher.finalize();

        self.cached_hash = Some(hash.clone());
        Ok(hash)
    }

    /// Compute the current hash without touching the cache.
    pub fn peek_hash(&self, provider: &dyn CryptoProvider) -> Result<Vec<u8>> {
        let mut hasher = provider.hash(self.algorithm)?;
        for msg in &self.messages {
            hasher.update(msg);
        }
        Ok(hasher.finalize())
    }

    /// Get the number of message bodies in the transcript.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Check if the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Create a snapshot of the transcript at this point.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

/// HKDF-Expand-Label (RFC 8446 Section 7.1).
///
/// ```text
/// struct {
///     uint16 length = Length;
///     opaque label<7..255> = "tls13 " + Label;
///     opaque context<0..255> = Context;
/// } HkdfLabel;
/// ```
pub fn hkdf_expand_label(
    provider: &dyn CryptoProvider,
    algorithm: HashAlgorithm,
    secret: &[u8],
    label: &[u8],
    context: &[u8],
    length: usize,
) -> Result<Vec<u8>> {
    if length > 0xFFFF {
        return Err(Error::Internal("Expand length too large".into()));
    }

    let mut info = Vec::with_capacity(10 + label.len() + context.len());
    info.extend_from_slice(&(length as u16).to_be_bytes());
    info.push((b"tls13 ".len() + label.len()) as u8);
    info.extend_from_slice(b"tls13 ");
    info.extend_from_slice(label);
    info.push(context.len() as u8);
    info.extend_from_slice(context);

    let kdf = provider.kdf(algorithm.to_kdf_algorithm())?;
    kdf.expand(secret, &info, length)
        .map_err(|e| Error::Crypto(format!("HKDF-Expand failed: {}", e)))
}

/// Compute Finished verify-data.
///
/// ```text
/// finished_key = HKDF-Expand-Label(BaseKey, "finished", "", Hash.length)
/// verify_data  = HMAC(finished_key, Transcript-Hash)
/// ```
///
/// The result is truncated to `verify_data_len` bytes (a fixed 20 in this
/// profile, independent of the hash algorithm).
pub fn compute_verify_data(
    provider: &dyn CryptoProvider,
    algorithm: HashAlgorithm,
    base_key: &[u8],
    transcript_hash: &[u8],
    verify_data_len: usize,
) -> Result<Vec<u8>> {
    let hash_len = algorithm.output_size();
    if verify_data_len > hash_len {
        return Err(Error::Internal(
            "Verify-data length exceeds HMAC output".into(),
        ));
    }

    let finished_key =
        hkdf_expand_label(provider, algorithm, base_key, b"finished", &[], hash_len)?;

    let mut hmac = provider.hmac(algorithm, &finished_key)?;
    hmac.update(transcript_hash);
    let mut verify_data = hmac.finalize();
    verify_data.truncate(verify_data_len);

    Ok(verify_data)
}
