//! Client-side handshake driver.
//!
//! Sequence: build and send ClientHello (one ephemeral share per configured
//! group), receive ServerHello, look up the private key for the server's
//! selected group, compute the shared secret, initialize the crypto context,
//! rekey to handshake keys, read to the server Finished (accumulating the
//! transcript), finalize the context, verify the server Finished, send the
//! client Finished, rekey to application keys, attach the context. The first
//! failure aborts the handshake.

use crate::auth::{Authenticator, NullAuthenticator};
use crate::connection::Connection;
use crate::crypto_context::CryptoContext;
use crate::error::{Error, Result};
use crate::extension_types::TypedExtension;
use crate::extensions::Extensions;
use crate::handshake::{channel_keys, HandshakePhase, Role};
use crate::handshake_io::{HandshakeLayer, HandshakeMessage};
use crate::key_share::{self, OfferedKeyShares};
use crate::messages::{ClientHello, Finished, ServerHello};
use crate::protocol::HandshakeType;
use crate::HandshakeConfig;
use ferrotls_crypto::CryptoProvider;
use std::io::{Read, Write};
use subtle::ConstantTimeEq;

/// Client handshake driver.
pub struct ClientHandshake {
    config: HandshakeConfig,
    authenticator: Box<dyn Authenticator>,
    phase: HandshakePhase,
    cipher_suite: Option<crate::CipherSuite>,
    negotiated_group: Option<ferrotls_crypto::KeyExchangeAlgorithm>,
}

impl std::fmt::Debug for ClientHandshake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandshake")
            .field("phase", &self.phase)
            .finish()
    }
}

impl ClientHandshake {
    /// Create a new client driver with the given configuration.
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

    /// The negotiated cipher suite, once the ServerHello has been processed.
    pub fn cipher_suite(&self) -> Option<crate::CipherSuite> {
        self.cipher_suite
    }

    /// The group the server selected, once the ServerHello has been processed.
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
                "Client driver already ran; use a fresh connection to retry".into(),
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

        // One ephemeral pair per configured group; privates stay in the
        // table until the server's selection arrives.
        let mut offered = OfferedKeyShares::offer(provider, &self.config.groups)?;

        let mut extensions = Extensions::new();
        extensions.add_typed(TypedExtension::ServerName(self.config.server_name.clone()))?;
        extensions.add_typed(TypedExtension::KeyShare(offered.entries().to_vec()))?;
        extensions.add_typed(TypedExtension::SupportedGroups(self.config.groups.clone()))?;
        extensions.add_typed(TypedExtension::SignatureAlgorithms(
            self.config.signature_algorithms.clone(),
        ))?;

        let mut random = [0u8; 32];
        provider.random().fill(&mut random)?;
        let client_hello = ClientHello::new(random, self.config.cipher_suites.clone())
            .with_extensions(extensions);

        h_out.write_body(&client_hello)?;
        self.phase = HandshakePhase::SentHello;

        let server_hello: ServerHello = h_in.read_body()?;

        // Exactly one server share; its group must be one we offered.
        let server_shares = server_hello
            .extensions
            .get_key_share()?
            .ok_or(Error::MissingExtension("key_share"))?;
        let server_share = server_shares
            .first()
            .ok_or_else(|| Error::Decode("Empty server key_share".into()))?;
        let private = offered.take_private(server_share.group).ok_or_else(|| {
            Error::KeyAgreement(format!(
                "Server selected group {} we did not offer",
                server_share.group.name()
            ))
        })?;
        let shared_secret =
            key_share::agree(provider, server_share.group, &server_share.key_exchange, &private)?;
        drop(offered);
        self.cipher_suite = Some(server_hello.cipher_suite);
        self.negotiated_group = Some(server_share.group);
        self.phase = HandshakePhase::Negotiated;

        // No pre-shared keys in this profile: the ECDHE secret seeds both
        // derivation inputs.
        let mut context = CryptoContext::new();
        context.init(
            provider,
            &client_hello,
            &server_hello,
            shared_secret.as_bytes(),
            shared_secret.as_bytes(),
            server_hello.cipher_suite,
        )?;
        drop(shared_secret);

        let suite = server_hello.cipher_suite;
        let keys = context
            .handshake_keys()
            .ok_or_else(|| Error::Internal("Handshake keys unavailable after init".into()))?;
        let (read_keys, write_keys) =
            channel_keys(Role::Client, self.config.rekey_policy, keys);
        h_in.rekey(provider, suite, &read_keys.key, &read_keys.iv)?;
        h_out.rekey(provider, suite, &write_keys.key, &write_keys.iv)?;
        self.phase = HandshakePhase::KeyedHandshake;

        // Read to the server Finished. Everything before it is transcript;
        // identity messages are handed to the authenticator afterwards.
        let mut transcript_bodies: Vec<Vec<u8>> = Vec::new();
        let mut identity_messages: Vec<HandshakeMessage> = Vec::new();
        let finished_message = loop {
            let msg = h_in.read_message()?;
            if msg.msg_type == HandshakeType::Finished {
                break msg;
            }
            transcript_bodies.push(msg.payload.clone());
            identity_messages.push(msg);
        };
        self.phase = HandshakePhase::AwaitingFinished;

        // Finalize over everything except the Finished itself.
        context.update(provider, &transcript_bodies)?;

        let transcript_hash = context.transcript_hash(provider)?;
        self.authenticator
            .verify_identity(provider, &identity_messages, &transcript_hash)?;

        let expected = context
            .server_finished()
            .ok_or_else(|| Error::Internal("Server Finished unavailable after update".into()))?;
        let received =
            Finished::decode_with_len(&finished_message.payload, expected.verify_data.len())?;
        if !bool::from(
            received
                .verify_data
                .as_slice()
                .ct_eq(expected.verify_data.as_slice()),
        ) {
            return Err(Error::Verification(
                "Server's Finished failed to verify".into(),
            ));
        }

        let client_finished = context
            .client_finished()
            .ok_or_else(|| Error::Internal("Client Finished unavailable after update".into()))?
            .clone();
        h_out.write_body(&client_finished)?;

        let keys = context
            .application_keys()
            .ok_or_else(|| Error::Internal("Application keys unavailable after update".into()))?;
        let (read_keys, write_keys) =
            channel_keys(Role::Client, self.config.rekey_policy, keys);
        h_in.rekey(provider, suite, &read_keys.key, &read_keys.iv)?;
        h_out.rekey(provider, suite, &write_keys.key, &write_keys.iv)?;
        self.phase = HandshakePhase::KeyedApplication;

        Ok(context)
    }
}
