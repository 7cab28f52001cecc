//! Server-side handshake driver.
//!
//! Mirror of the client sequence: receive ClientHello, require its four
//! extensions, select a group in the client's share order and a suite in the
//! client's preference order, send ServerHello, initialize the crypto
//! context, rekey to handshake keys, send identity messages (none, with the
//! null authenticator) and the server Finished, verify the client Finished,
//! rekey to application keys, attach the context.

use crate::auth::{Authenticator, NullAuthenticator};
use crate::connection::Connection;
use crate::crypto_context::CryptoContext;
use crate::error::{Error, Result};
use crate::extension_types::{KeyShareEntry, TypedExtension};
use crate::extensions::Extensions;
use crate::handshake::{channel_keys, HandshakePhase, Role};
use crate::handshake_io::HandshakeLayer;
use crate::key_share;
use crate::messages::{ClientHello, Finished, ServerHello};
use crate::protocol::HandshakeType;
use crate::HandshakeConfig;
use ferrotls_crypto::{CryptoProvider, SharedSecret};
use std::io::{Read, Write};
use subtle::ConstantTimeEq;

/// Server handshake driver.
pub struct ServerHandshake {
    config: HandshakeConfig,
    authenticator: Box<dyn Authenticator>,
    phase: HandshakePhase,
    cipher_suite: Option<crate::CipherSuite>,
    negotiated_group: Option<ferrotls_crypto::KeyExchangeAlgorithm>,
}

impl std::fmt::Debug for ServerHandshake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandshake")
            .field("phase", &self.phase)
            .finish()
    }
}

impl ServerHandshake {
    /// Create a new server driver with the given configuration.
    pub fn new(config: HandshakeConfig) -> Self {
        Self {
            config,
            authenticator: Box::new(NullAuthenticator),
            phase: HandshakePhase::Start,
            cipher_suite: None,
            negotiated_group: None,
        }
    }

    /// Replace the peer-identity authenticator.
    pub fn with_authenticator(mut self, authenticator: Box<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Get the current driver phase.
    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    /// The selected cipher suite, once the ClientHello has been processed.
    pub fn cipher_suite(&self) -> Option<crate::CipherSuite> {
        self.cipher_suite
    }

    /// The selected group, once the ClientHello has been processed.
    pub fn negotiated_group(&self) -> Option<ferrotls_crypto::KeyExchangeAlgorithm> {
        self.negotiated_group
    }

    /// Run the handshake to completion over the connection's channels.
    ///
    /// On success the finalized crypto context is attached to the
    /// connection; on the first failure the driver moves to `Failed`, the
    /// error is returned unchanged, and the connection gains no context.
    pub fn run<R: Read, W: Write>(
        &mut self,
        provider: &dyn CryptoProvider,
        conn: &mut Connection<R, W>,
    ) -> Result<()> {
        if self.phase != HandshakePhase::Start {
            return Err(Error::Internal(
                "Server driver already ran; use a fresh connection to retry".into(),
            ));
        }

        match self.drive(provider, conn) {
            Ok(context) => {
                conn.attach_context(context)?;
                self.phase = HandshakePhase::Connected;
                Ok(())
            },
            Err(e) => {
                self.phase = HandshakePhase::Failed;
                Err(e)
            },
        }
    }

    fn drive<R: Read, W: Write>(
        &mut self,
        provider: &dyn CryptoProvider,
        conn: &mut Connection<R, W>,
    ) -> Result<CryptoContext> {
        let (record_in, record_out) = conn.channels();
        let mut h_in = HandshakeLayer::new(record_in);
        let mut h_out = HandshakeLayer::new(record_out);

        let client_hello: ClientHello = h_in.read_body()?;

        // All four extensions are required in this profile.
        let _server_name = client_hello
            .extensions
            .get_server_name()?
            .ok_or(Error::MissingExtension("server_name"))?;
        let _supported_groups = client_hello
            .extensions
            .get_supported_groups()?
            .ok_or(Error::MissingExtension("supported_groups"))?;
        let _signature_algorithms = client_hello
            .extensions
            .get_signature_algorithms()?
            .ok_or(Error::MissingExtension("signature_algorithms"))?;
        let client_shares = client_hello
            .extensions
            .get_key_share()?
            .ok_or(Error::MissingExtension("key_share"))?;

        // Scan the client's shares in the client's order; take the first
        // group in our supported set, generate a fresh ephemeral pair for
        // it, and agree.
        let mut selected: Option<(KeyShareEntry, SharedSecret)> = None;
        for share in &client_shares {
            if self.config.groups.contains(&share.group) {
                let (entry, private) = key_share::generate(provider, share.group)?;
                let shared =
                    key_share::agree(provider, share.group, &share.key_exchange, &private)?;
                selected = Some((entry, shared));
                break;
            }
        }
        let (server_share, shared_secret) = selected.ok_or_else(|| {
            Error::KeyAgreement("No client-offered key-share group is supported".into())
        })?;

        // First client-preferred suite present in our set wins.
        let suite = client_hello
            .cipher_suites
            .iter()
            .copied()
            .find(|s| self.config.cipher_suites.contains(s))
            .ok_or(Error::NoAcceptableSuite)?;
        self.cipher_suite = Some(suite);
        self.negotiated_group = Some(server_share.group);
        self.phase = HandshakePhase::Negotiated;

        let mut extensions = Extensions::new();
        extensions.add_typed(TypedExtension::KeyShare(vec![server_share]))?;

        let mut random = [0u8; 32];
        provider.random().fill(&mut random)?;
        let server_hello = ServerHello::new(random, suite).with_extensions(extensions);

        h_out.write_body(&server_hello)?;
        self.phase = HandshakePhase::SentHello;

        let mut context = CryptoContext::new();
        context.init(
            provider,
            &client_hello,
            &server_hello,
            shared_secret.as_bytes(),
            shared_secret.as_bytes(),
            suite,
        )?;
        drop(shared_secret);

        let keys = context
            .handshake_keys()
            .ok_or_else(|| Error::Internal("Handshake keys unavailable after init".into()))?;
        let (read_keys, write_keys) =
            channel_keys(Role::Server, self.config.rekey_policy, keys);
        h_in.rekey(provider, suite, &read_keys.key, &read_keys.iv)?;
        h_out.rekey(provider, suite, &write_keys.key, &write_keys.iv)?;
        self.phase = HandshakePhase::KeyedHandshake;

        // Identity proof before Finished. The null authenticator sends
        // nothing, so the additional transcript stays empty.
        let transcript_hash = context.transcript_hash(provider)?;
        let identity_messages =
            self.authenticator.identity_messages(provider, &transcript_hash)?;
        let mut transcript_bodies = Vec::with_capacity(identity_messages.len());
        for msg in &identity_messages {
            h_out.write_message(msg)?;
            transcript_bodies.push(msg.payload.clone());
        }

        context.update(provider, &transcript_bodies)?;

        let server_finished = context
            .server_finished()
            .ok_or_else(|| Error::Internal("Server Finished unavailable after update".into()))?
            .clone();
        h_out.write_body(&server_finished)?;
        self.phase = HandshakePhase::AwaitingFinished;

        // Receive and verify the client Finished.
        let msg = h_in.read_message()?;
        if msg.msg_type != HandshakeType::Finished {
            return Err(Error::UnexpectedMessage(format!(
                "Expected Finished, got {:?}",
                msg.msg_type
            )));
        }
        let expected = context
            .client_finished()
            .ok_or_else(|| Error::Internal("Client Finished unavailable after update".into()))?;
        let received = Finished::decode_with_len(&msg.payload, expected.verify_data.len())?;
        if !bool::from(
            received
                .verify_data
                .as_slice()
                .ct_eq(expected.verify_data.as_slice()),
        ) {
            return Err(Error::Verification(
                "Client's Finished failed to verify".into(),
            ));
        }

        let keys = context
            .application_keys()
            .ok_or_else(|| Error::Internal("Application keys unavailable after update".into()))?;
        let (read_keys, write_keys) =
            channel_keys(Role::Server, self.config.rekey_policy, keys);
        h_in.rekey(provider, suite, &read_keys.key, &read_keys.iv)?;
        h_out.rekey(provider, suite, &write_keys.key, &write_keys.iv)?;
        self.phase = HandshakePhase::KeyedApplication;

        Ok(context)
    }
}
