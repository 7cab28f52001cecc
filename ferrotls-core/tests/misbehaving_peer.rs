//! Handshakes against hand-driven misbehaving peers.
//!
//! These tests speak the wire protocol directly through the record and
//! handshake layers to produce the malformed flows a correct driver never
//! sends: tampered Finished verify-data, a ClientHello with a required
//! extension missing, and a server selecting a group the client never
//! offered.

mod common;

use common::{duplex, PipeReader, PipeWriter};
use ferrotls_core::cipher::CipherSuite;
use ferrotls_core::crypto_context::CryptoContext;
use ferrotls_core::error::Error;
use ferrotls_core::extension_types::TypedExtension;
use ferrotls_core::extensions::Extensions;
use ferrotls_core::handshake::{ClientHandshake, HandshakePhase, ServerHandshake};
use ferrotls_core::handshake_io::HandshakeLayer;
use ferrotls_core::key_share::{self, OfferedKeyShares};
use ferrotls_core::messages::{ClientHello, ServerHello};
use ferrotls_core::protocol::{
    HandshakeType, HashAlgorithmId, SignatureAlgorithmId, SignatureAndHashAlgorithm,
};
use ferrotls_core::record::RecordLayer;
use ferrotls_core::{Connection, HandshakeConfig};
use ferrotls_crypto::KeyExchangeAlgorithm;
use ferrotls_crypto_rustcrypto::RustCryptoProvider;
use std::thread;

const SUITE: CipherSuite = CipherSuite::EcdheEcdsaWithAes128GcmSha256;

fn client_extensions(
    offered: &OfferedKeyShares,
    groups: &[KeyExchangeAlgorithm],
    with_server_name: bool,
) -> Extensions {
    let mut extensions = Extensions::new();
    if with_server_name {
        extensions
            .add_typed(TypedExtension::ServerName("example.com".into()))
            .unwrap();
    }
    extensions
        .add_typed(TypedExtension::KeyShare(offered.entries().to_vec()))
        .unwrap();
    extensions
        .add_typed(TypedExtension::SupportedGroups(groups.to_vec()))
        .unwrap();
    extensions
        .add_typed(TypedExtension::SignatureAlgorithms(vec![
            SignatureAndHashAlgorithm::new(HashAlgorithmId::Sha256, SignatureAlgorithmId::Ecdsa),
        ]))
        .unwrap();
    extensions
}

/// Drive a complete client handshake by hand, optionally flipping one byte
/// of the Finished verify-data before sending it.
fn manual_client(read: PipeReader, write: PipeWriter, flip_byte: Option<usize>) {
    let provider = RustCryptoProvider::new();
    let mut record_in = RecordLayer::new(read);
    let mut record_out = RecordLayer::new(write);
    let mut h_in = HandshakeLayer::new(&mut record_in);
    let mut h_out = HandshakeLayer::new(&mut record_out);

    let groups = [KeyExchangeAlgorithm::Secp384r1];
    let mut offered = OfferedKeyShares::offer(&provider, &groups).unwrap();
    let client_hello = ClientHello::new([7u8; 32], vec![SUITE])
        .with_extensions(client_extensions(&offered, &groups, true));
    h_out.write_body(&client_hello).unwrap();

    let server_hello: ServerHello = h_in.read_body().unwrap();
    let shares = server_hello.extensions.get_key_share().unwrap().unwrap();
    let share = &shares[0];
    let private = offered.take_private(share.group).unwrap();
    let secret =
        key_share::agree(&provider, share.group, &share.key_exchange, &private).unwrap();

    let mut context = CryptoContext::new();
    context
        .init(
            &provider,
            &client_hello,
            &server_hello,
            secret.as_bytes(),
            secret.as_bytes(),
            server_hello.cipher_suite,
        )
        .unwrap();

    let keys = context.handshake_keys().unwrap();
    let (key, iv) = (keys.server.key.clone(), keys.server.iv.clone());
    h_in.rekey(&provider, server_hello.cipher_suite, &key, &iv).unwrap();
    h_out.rekey(&provider, server_hello.cipher_suite, &key, &iv).unwrap();

    // Read up to the server Finished, which we do not bother verifying
    loop {
        let msg = h_in.read_message().unwrap();
        if msg.msg_type == HandshakeType::Finished {
            break;
        }
    }

    context.update(&provider, &[]).unwrap();

    let mut finished = context.client_finished().unwrap().clone();
    if let Some(index) = flip_byte {
        finished.verify_data[index] ^= 0x01;
    }
    h_out.write_body(&finished).unwrap();
}

fn run_server(read: PipeReader, write: PipeWriter) -> (ServerHandshake, Result<(), Error>) {
    let provider = RustCryptoProvider::new();
    let mut conn = Connection::new(read, write);
    let mut server = ServerHandshake::new(HandshakeConfig::default());
    let result = server.run(&provider, &mut conn);
    (server, result)
}

#[test]
fn test_untampered_manual_client_completes() {
    let ((client_read, client_write), (server_read, server_write)) = duplex();
    let server = thread::spawn(move || run_server(server_read, server_write));

    manual_client(client_read, client_write, None);

    let (server, result) = server.join().unwrap();
    result.expect("server should accept an honest client");
    assert_eq!(server.phase(), HandshakePhase::Connected);
}

#[test]
fn test_tampered_finished_is_rejected() {
    // Any single flipped byte of verify-data must fail verification
    for index in [0, 9, 19] {
        let ((client_read, client_write), (server_read, server_write)) = duplex();
        let server = thread::spawn(move || run_server(server_read, server_write));

        manual_client(client_read, client_write, Some(index));

        let (server, result) = server.join().unwrap();
        match result {
            Err(Error::Verification(_)) => {},
            other => panic!(
                "flipped byte {}: expected Verification error, got {:?}",
                index, other
            ),
        }
        assert_eq!(server.phase(), HandshakePhase::Failed);
    }
}

#[test]
fn test_missing_server_name_is_rejected() {
    let ((client_read, client_write), (server_read, server_write)) = duplex();
    let server = thread::spawn(move || run_server(server_read, server_write));

    {
        let provider = RustCryptoProvider::new();
        let mut record_out = RecordLayer::new(client_write);
        let mut h_out = HandshakeLayer::new(&mut record_out);

        let groups = [KeyExchangeAlgorithm::Secp384r1];
        let offered = OfferedKeyShares::offer(&provider, &groups).unwrap();
        let client_hello = ClientHello::new([7u8; 32], vec![SUITE])
            .with_extensions(client_extensions(&offered, &groups, false));
        h_out.write_body(&client_hello).unwrap();
        drop(client_read);
    }

    let (_, result) = server.join().unwrap();
    assert_eq!(result, Err(Error::MissingExtension("server_name")));
}

#[test]
fn test_server_selecting_unoffered_group_is_fatal() {
    let ((client_read, client_write), (server_read, server_write)) = duplex();

    // A server that ignores the client's offer and picks P-521
    let server = thread::spawn(move || {
        let provider = RustCryptoProvider::new();
        let mut record_in = RecordLayer::new(server_read);
        let mut record_out = RecordLayer::new(server_write);
        let mut h_in = HandshakeLayer::new(&mut record_in);
        let mut h_out = HandshakeLayer::new(&mut record_out);

        let _client_hello: ClientHello = h_in.read_body().unwrap();

        let (entry, _private) =
            key_share::generate(&provider, KeyExchangeAlgorithm::Secp521r1).unwrap();
        let mut extensions = Extensions::new();
        extensions.add_typed(TypedExtension::KeyShare(vec![entry])).unwrap();
        let server_hello = ServerHello::new([9u8; 32], SUITE).with_extensions(extensions);
        h_out.write_body(&server_hello).unwrap();
    });

    let provider = RustCryptoProvider::new();
    let mut conn = Connection::new(client_read, client_write);
    let config = HandshakeConfig::builder()
        .with_groups(&[KeyExchangeAlgorithm::Secp256r1])
        .build()
        .unwrap();
    let mut client = ClientHandshake::new(config);
    let result = client.run(&provider, &mut conn);

    server.join().unwrap();

    match result {
        Err(Error::KeyAgreement(msg)) => {
            assert!(msg.contains("did not offer"), "unexpected message: {}", msg)
        },
        other => panic!("expected KeyAgreement error, got {:?}", other),
    }
    assert_eq!(client.phase(), HandshakePhase::Failed);
    assert!(conn.crypto_context().is_none());
}
