//! The crypto context: transcript ownership and the two-phase key schedule.
//!
//! Derivation chain (HKDF throughout):
//!
//! ```text
//!   early input  -> HKDF-Extract(0, .)            = early secret
//!                      |
//!                      v
//!               Derive-Secret(., "derived", "")
//!                      |
//!                      v
//!   ECDHE input -> HKDF-Extract                   = handshake secret
//!                      +--> Derive-Secret(., "c hs traffic", CH..SH)
//!                      +--> Derive-Secret(., "s hs traffic", CH..SH)
//!                      v
//!               Derive-Secret(., "derived", "")
//!                      |
//!                      v
//!   0           -> HKDF-Extract                   = master secret
//!                      +--> Derive-Secret(., "c ap traffic", CH..last)
//!                      +--> Derive-Secret(., "s ap traffic", CH..last)
//! ```
//!
//! Traffic keys and IVs come from each traffic secret via the "key" and "iv"
//! expand labels; Finished verify-data is an HMAC of the transcript hash
//! under each direction's handshake-traffic finished key.

use crate::cipher::CipherSuite;
use crate::error::{Error, Result};
use crate::messages::{ClientHello, Finished, HandshakeBody, ServerHello};
use crate::transcript::{compute_verify_data, hkdf_expand_label, TranscriptHash};
use ferrotls_crypto::{CryptoProvider, HashAlgorithm};
use zeroize::Zeroizing;

/// Fixed Finished verify-data length for this profile.
///
/// A production profile would size this to the hash output; the minimal
/// profile pins it independent of the hash algorithm.
pub const VERIFY_DATA_LEN: usize = 20;

/// One direction's traffic key material.
#[derive(Debug, Clone)]
pub struct KeySet {
    /// Write key
    pub key: Zeroizing<Vec<u8>>,

    /// Write IV
    pub iv: Zeroizing<Vec<u8>>,
}

/// Both directions' traffic key material for one phase.
#[derive(Debug, Clone)]
pub struct TrafficKeys {
    /// Client write key set
    pub client: KeySet,

    /// Server write key set
    pub server: KeySet,
}

/// Key-schedule state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Constructed, nothing derived yet.
    Empty,

    /// Handshake-phase keys derived from the hellos and the shared secret.
    Initialized,

    /// Application-phase keys and Finished values derived; frozen.
    Finalized,
}

/// Crypto context for one connection.
///
/// Owns the transcript and all derived key material. Constructed empty,
/// populated by [`CryptoContext::init`], refined exactly once by
/// [`CryptoContext::update`], then frozen and attached to the connection.
pub struct CryptoContext {
    state: ContextState,
    suite: Option<CipherSuite>,
    hash_algorithm: Option<HashAlgorithm>,
    transcript: Option<TranscriptHash>,
    handshake_secret: Option<Zeroizing<Vec<u8>>>,
    client_hs_traffic: Option<Zeroizing<Vec<u8>>>,
    server_hs_traffic: Option<Zeroizing<Vec<u8>>>,
    handshake_keys: Option<TrafficKeys>,
    application_keys: Option<TrafficKeys>,
    client_finished: Option<Finished>,
    server_finished: Option<Finished>,
}

impl std::fmt::Debug for CryptoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoContext")
            .field("state", &self.state)
            .field("suite", &self.suite)
            .finish()
    }
}

impl Default for CryptoContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoContext {
    /// Create a new, empty crypto context.
    pub fn new() -> Self {
        Self {
            state: ContextState::Empty,
            suite: None,
            hash_algorithm: None,
            transcript: None,
            handshake_secret: None,
            client_hs_traffic: None,
            server_hs_traffic: None,
            handshake_keys: None,
            application_keys: None,
            client_finished: None,
            server_finished: None,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Get the negotiated cipher suite.
    pub fn suite(&self) -> Option<CipherSuite> {
        self.suite
    }

    /// Initialize the context from the two hellos and the shared secret.
    ///
    /// Transitions Empty → Initialized. Seeds the transcript with exactly
    /// {ClientHello, ServerHello} and derives handshake-phase traffic keys
    /// for both directions. In this profile the ECDHE shared secret seeds
    /// both the early and handshake derivation inputs (no pre-shared keys).
    pub fn init(
        &mut self,
        provider: &dyn CryptoProvider,
        client_hello: &ClientHello,
        server_hello: &ServerHello,
        early_secret_input: &[u8],
        handshake_secret_input: &[u8],
        suite: CipherSuite,
    ) -> Result<()> {
        if self.state != ContextState::Empty {
            return Err(Error::Internal(
                "Crypto context already initialized".into(),
            ));
        }

        // The suite's primitive families must resolve with this provider.
        let hash_algorithm = suite.hash_algorithm();
        provider
            .aead(suite.aead_algorithm())
            .map_err(|e| Error::UnsupportedSuite(format!("{}: {}", suite.name(), e)))?;
        provider
            .hash(hash_algorithm)
            .map_err(|e| Error::UnsupportedSuite(format!("{}: {}", suite.name(), e)))?;
        let hash_len = hash_algorithm.output_size();

        let mut transcript = TranscriptHash::new(hash_algorithm);
        transcript.update(&client_hello.encode()?);
        transcript.update(&server_hello.encode()?);
        let hello_hash = transcript.current_hash(provider)?;

        let kdf = provider.kdf(hash_algorithm.to_kdf_algorithm())?;

        // early secret = HKDF-Extract(0, early input)
        let zeros = vec![0u8; hash_len];
        let early_secret = Zeroizing::new(kdf.extract(&zeros, early_secret_input));

        // handshake secret = HKDF-Extract(Derive-Secret(early, "derived"), ECDHE)
        let empty_hash = provider.hash(hash_algorithm)?.finalize();
        let derived = Zeroizing::new(hkdf_expand_label(
            provider,
            hash_algorithm,
            &early_secret,
            b"derived",
            &empty_hash,
            hash_len,
        )?);
        let handshake_secret = Zeroizing::new(kdf.extract(&derived, handshake_secret_input));

        // Per-direction handshake traffic secrets over Hash(CH || SH)
        let client_hs_traffic = Zeroizing::new(hkdf_expand_label(
            provider,
            hash_algorithm,
            &handshake_secret,
            b"c hs traffic",
            &hello_hash,
            hash_len,
        )?);
        let server_hs_traffic = Zeroizing::new(hkdf_expand_label(
            provider,
            hash_algorithm,
            &handshake_secret,
            b"s hs traffic",
            &hello_hash,
            hash_len,
        )?);

        let handshake_keys = TrafficKeys {
            client: derive_key_set(provider, suite, &client_hs_traffic)?,
            server: derive_key_set(provider, suite, &server_hs_traffic)?,
        };

        self.suite = Some(suite);
        self.hash_algorithm = Some(hash_algorithm);
        self.transcript = Some(transcript);
        self.handshake_secret = Some(handshake_secret);
        self.client_hs_traffic = Some(client_hs_traffic);
        self.server_hs_traffic = Some(server_hs_traffic);
        self.handshake_keys = Some(handshake_keys);
        self.state = ContextState::Initialized;

        Ok(())
    }

    /// Fold additional handshake message bodies into the transcript and
    /// derive application-phase keys and Finished verify-data.
    ///
    /// Transitions Initialized → Finalized. The bodies must be supplied in
    /// wire order and must exclude any Finished message. Not idempotent:
    /// this must be called exactly once per handshake, after the message set
    /// it authenticates is fully known and before any Finished is sent or
    /// verified.
    pub fn update(
        &mut self,
        provider: &dyn CryptoProvider,
        additional_bodies: &[Vec<u8>],
    ) -> Result<()> {
        if self.state != ContextState::Initialized {
            return Err(Error::Internal(format!(
                "Crypto context update in state {:?}",
                self.state
            )));
        }

        let suite = self.suite.ok_or_else(|| Error::Internal("Suite unset".into()))?;
        let hash_algorithm = self
            .hash_algorithm
            .ok_or_else(|| Error::Internal("Hash algorithm unset".into()))?;
        let hash_len = hash_algorithm.output_size();
        let transcript = self
            .transcript
            .as_mut()
            .ok_or_else(|| Error::Internal("Transcript unset".into()))?;
        let handshake_secret = self
            .handshake_secret
            .as_ref()
            .ok_or_else(|| Error::Internal("Handshake secret unset".into()))?;

        for body in additional_bodies {
            transcript.update(body);
        }
        let transcript_hash = transcript.current_hash(provider)?;

        let kdf = provider.kdf(hash_algorithm.to_kdf_algorithm())?;

        // master secret = HKDF-Extract(Derive-Secret(handshake, "derived"), 0)
        let empty_hash = provider.hash(hash_algorithm)?.finalize();
        let derived = Zeroizing::new(hkdf_expand_label(
            provider,
            hash_algorithm,
            handshake_secret,
            b"derived",
            &empty_hash,
            hash_len,
        )?);
        let zeros = vec![0u8; hash_len];
        let master_secret = Zeroizing::new(kdf.extract(&derived, &zeros));

        let client_ap_traffic = Zeroizing::new(hkdf_expand_label(
            provider,
            hash_algorithm,
            &master_secret,
            b"c ap traffic",
            &transcript_hash,
            hash_len,
        )?);
        let server_ap_traffic = Zeroizing::new(hkdf_expand_label(
            provider,
            hash_algorithm,
            &master_secret,
            b"s ap traffic",
            &transcript_hash,
            hash_len,
        )?);

        let application_keys = TrafficKeys {
            client: derive_key_set(provider, suite, &client_ap_traffic)?,
            server: derive_key_set(provider, suite, &server_ap_traffic)?,
        };

        // Finished verify-data for both directions, bound to the transcript
        // at this point. Directions are never cross-compared.
        let client_base = self
            .client_hs_traffic
            .as_ref()
            .ok_or_else(|| Error::Internal("Client traffic secret unset".into()))?;
        let server_base = self
            .server_hs_traffic
            .as_ref()
            .ok_or_else(|| Error::Internal("Server traffic secret unset".into()))?;

        let client_verify = compute_verify_data(
            provider,
            hash_algorithm,
            client_base,
            &transcript_hash,
            VERIFY_DATA_LEN,
        )?;
        let server_verify = compute_verify_data(
            provider,
            hash_algorithm,
            server_base,
            &transcript_hash,
            VERIFY_DATA_LEN,
        )?;

        self.application_keys = Some(application_keys);
        self.client_finished = Some(Finished::new(client_verify));
        self.server_finished = Some(Finished::new(server_verify));
        self.state = ContextState::Finalized;

        Ok(())
    }

    /// Get the current transcript hash.
    pub fn transcript_hash(&self, provider: &dyn CryptoProvider) -> Result<Vec<u8>> {
        self.transcript
            .as_ref()
            .ok_or_else(|| Error::Internal("Transcript unset".into()))?
            .peek_hash(provider)
    }

    /// Handshake-phase traffic keys. Available once Initialized.
    pub fn handshake_keys(&self) -> Option<&TrafficKeys> {
        self.handshake_keys.as_ref()
    }

    /// Application-phase traffic keys. Available once Finalized.
    pub fn application_keys(&self) -> Option<&TrafficKeys> {
        self.application_keys.as_ref()
    }

    /// Expected client-direction Finished. Available once Finalized.
    pub fn client_finished(&self) -> Option<&Finished> {
        self.client_finished.as_ref()
    }

    /// Expected server-direction Finished. Available once Finalized.
    pub fn server_finished(&self) -> Option<&Finished> {
        self.server_finished.as_ref()
    }
}

/// Derive a key/IV set from a traffic secret.
///
/// ```text
/// key = HKDF-Expand-Label(Secret, "key", "", key_length)
/// iv  = HKDF-Expand-Label(Secret, "iv", "", iv_length)
/// ```
fn derive_key_set(
    provider: &dyn CryptoProvider,
    suite: CipherSuite,
    traffic_secret: &[u8],
) -> Result<KeySet> {
    let hash_algorithm = suite.hash_algorithm();
    let key = hkdf_expand_label(
        provider,
        hash_algorithm,
        traffic_secret,
        b"key",
        &[],
        suite.key_length(),
    )?;
    let iv = hkdf_expand_label(
        provider,
        hash_algorithm,
        traffic_secret,
        b"iv",
        &[],
        suite.iv_length(),
    )?;

    Ok(KeySet {
        key: Zeroizing::new(key),
        iv: Zeroizing::new(iv),
    })
}
