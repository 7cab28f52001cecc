//! Full handshake integration tests.
//!
//! Client and server drivers run against each other over an in-memory
//! blocking duplex channel, each on its own thread, exactly as they would
//! over a socket.

mod common;

use common::{duplex, PipeReader, PipeWriter};
use ferrotls_core::cipher::CipherSuite;
use ferrotls_core::crypto_context::VERIFY_DATA_LEN;
use ferrotls_core::error::Error;
use ferrotls_core::handshake::{ClientHandshake, HandshakePhase, RekeyPolicy, ServerHandshake};
use ferrotls_core::{Connection, HandshakeConfig};
use ferrotls_crypto::KeyExchangeAlgorithm;
use ferrotls_crypto_rustcrypto::RustCryptoProvider;
use std::thread;

type TestConnection = Connection<PipeReader, PipeWriter>;

fn client_config(policy: RekeyPolicy) -> HandshakeConfig {
    HandshakeConfig::builder()
        .with_server_name("example.com")
        .with_cipher_suites(&[
            CipherSuite::EcdheEcdsaWithAes128GcmSha256,
            CipherSuite::EcdheRsaWithAes128GcmSha256,
        ])
        .with_groups(&[
            KeyExchangeAlgorithm::Secp256r1,
            KeyExchangeAlgorithm::Secp384r1,
            KeyExchangeAlgorithm::Secp521r1,
        ])
        .with_rekey_policy(policy)
        .build()
        .unwrap()
}

fn server_config(policy: RekeyPolicy) -> HandshakeConfig {
    HandshakeConfig::builder()
        .with_cipher_suites(&[
            CipherSuite::EcdheEcdsaWithAes128GcmSha256,
            CipherSuite::EcdheRsaWithAes128GcmSha256,
        ])
        .with_groups(&[
            KeyExchangeAlgorithm::Secp384r1,
            KeyExchangeAlgorithm::Secp521r1,
        ])
        .with_rekey_policy(policy)
        .build()
        .unwrap()
}

/// Run both drivers to completion and return the drivers and connections.
///
/// A failed server drops its connection before the join so the client's
/// blocking read observes the close instead of hanging.
fn run_handshake(
    client_config: HandshakeConfig,
    server_config: HandshakeConfig,
) -> (
    (ClientHandshake, TestConnection, Result<(), Error>),
    (ServerHandshake, Option<TestConnection>, Result<(), Error>),
) {
    let ((client_read, client_write), (server_read, server_write)) = duplex();

    let server_thread = thread::spawn(move || {
        let provider = RustCryptoProvider::new();
        let mut conn = Connection::new(server_read, server_write);
        let mut server = ServerHandshake::new(server_config);
        let result = server.run(&provider, &mut conn);
        let conn = if result.is_ok() { Some(conn) } else { None };
        (server, conn, result)
    });

    let provider = RustCryptoProvider::new();
    let mut conn = Connection::new(client_read, client_write);
    let mut client = ClientHandshake::new(client_config);
    let client_result = client.run(&provider, &mut conn);

    let (server, server_conn, server_result) = server_thread.join().unwrap();

    (
        (client, conn, client_result),
        (server, server_conn, server_result),
    )
}

#[test]
fn test_full_handshake() {
    let ((client, client_conn, client_result), (server, server_conn, server_result)) =
        run_handshake(
            client_config(RekeyPolicy::SharedServerWrite),
            server_config(RekeyPolicy::SharedServerWrite),
        );

    client_result.expect("client handshake failed");
    server_result.expect("server handshake failed");
    let server_conn = server_conn.expect("server connection");

    assert_eq!(client.phase(), HandshakePhase::Connected);
    assert_eq!(server.phase(), HandshakePhase::Connected);

    // First client-offered group the server supports, in client order
    assert_eq!(
        server.negotiated_group(),
        Some(KeyExchangeAlgorithm::Secp384r1)
    );
    assert_eq!(
        client.negotiated_group(),
        Some(KeyExchangeAlgorithm::Secp384r1)
    );

    // First suite in the client's list present in the server's set
    assert_eq!(
        client.cipher_suite(),
        Some(CipherSuite::EcdheEcdsaWithAes128GcmSha256)
    );
    assert_eq!(client.cipher_suite(), server.cipher_suite());

    let client_ctx = client_conn.crypto_context().expect("client context");
    let server_ctx = server_conn.crypto_context().expect("server context");

    // Identical application-phase key sets on both sides
    let client_keys = client_ctx.application_keys().unwrap();
    let server_keys = server_ctx.application_keys().unwrap();
    assert_eq!(
        client_keys.client.key.as_slice(),
        server_keys.client.key.as_slice()
    );
    assert_eq!(
        client_keys.server.key.as_slice(),
        server_keys.server.key.as_slice()
    );
    assert_eq!(
        client_keys.server.iv.as_slice(),
        server_keys.server.iv.as_slice()
    );

    // AES-128 keys and 12-byte IVs
    assert_eq!(client_keys.server.key.len(), 16);
    assert_eq!(client_keys.server.iv.len(), 12);
    assert_eq!(client_keys.client.key.len(), 16);
    assert_eq!(client_keys.client.iv.len(), 12);

    // Identical transcript hashes at the point update was invoked
    let provider = RustCryptoProvider::new();
    assert_eq!(
        client_ctx.transcript_hash(&provider).unwrap(),
        server_ctx.transcript_hash(&provider).unwrap()
    );

    // Both directions' Finished values agree across the two sides
    assert_eq!(client_ctx.server_finished(), server_ctx.server_finished());
    assert_eq!(client_ctx.client_finished(), server_ctx.client_finished());
    assert_eq!(
        client_ctx.client_finished().unwrap().verify_data.len(),
        VERIFY_DATA_LEN
    );
}

#[test]
fn test_full_handshake_per_direction_rekey() {
    let ((client, client_conn, client_result), (_, server_conn, server_result)) = run_handshake(
        client_config(RekeyPolicy::PerDirection),
        server_config(RekeyPolicy::PerDirection),
    );

    client_result.expect("client handshake failed");
    server_result.expect("server handshake failed");
    let server_conn = server_conn.expect("server connection");

    assert_eq!(client.phase(), HandshakePhase::Connected);

    let client_keys = client_conn.crypto_context().unwrap().application_keys().unwrap();
    let server_keys = server_conn.crypto_context().unwrap().application_keys().unwrap();
    assert_eq!(
        client_keys.client.key.as_slice(),
        server_keys.client.key.as_slice()
    );
    assert_ne!(
        client_keys.client.key.as_slice(),
        client_keys.server.key.as_slice()
    );
}

#[test]
fn test_selection_is_deterministic() {
    let mut selections = Vec::new();
    for _ in 0..3 {
        let ((client, _, client_result), (server, _, server_result)) = run_handshake(
            client_config(RekeyPolicy::SharedServerWrite),
            server_config(RekeyPolicy::SharedServerWrite),
        );
        client_result.unwrap();
        server_result.unwrap();
        selections.push((client.cipher_suite(), server.negotiated_group()));
    }

    assert!(selections.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(
        selections[0],
        (
            Some(CipherSuite::EcdheEcdsaWithAes128GcmSha256),
            Some(KeyExchangeAlgorithm::Secp384r1)
        )
    );
}

#[test]
fn test_no_common_group_aborts_before_server_hello() {
    // Client offers only P-256; server supports only {P-384, P-521}
    let client_config = HandshakeConfig::builder()
        .with_groups(&[KeyExchangeAlgorithm::Secp256r1])
        .build()
        .unwrap();

    let ((client, client_conn, client_result), (server, server_conn, server_result)) =
        run_handshake(client_config, server_config(RekeyPolicy::SharedServerWrite));

    match server_result {
        Err(Error::KeyAgreement(_)) => {},
        other => panic!("expected KeyAgreement error, got {:?}", other),
    }
    assert_eq!(server.phase(), HandshakePhase::Failed);
    // The server never sent a ServerHello, so the client fails on transport
    assert!(client_result.is_err());
    assert_eq!(client.phase(), HandshakePhase::Failed);

    // Neither side gained a crypto context
    assert!(client_conn.crypto_context().is_none());
    assert!(server_conn.is_none());
}

#[test]
fn test_no_common_suite() {
    let client_config = HandshakeConfig::builder()
        .with_cipher_suites(&[CipherSuite::EcdheRsaWithAes128GcmSha256])
        .build()
        .unwrap();
    let server_config = HandshakeConfig::builder()
        .with_cipher_suites(&[CipherSuite::EcdheEcdsaWithAes128GcmSha256])
        .with_groups(&[KeyExchangeAlgorithm::Secp256r1])
        .build()
        .unwrap();

    let ((_, _, client_result), (_, _, server_result)) =
        run_handshake(client_config, server_config);

    assert_eq!(server_result, Err(Error::NoAcceptableSuite));
    assert!(client_result.is_err());
}

#[test]
fn test_driver_refuses_reuse() {
    let ((mut client, mut client_conn, client_result), _) = run_handshake(
        client_config(RekeyPolicy::SharedServerWrite),
        server_config(RekeyPolicy::SharedServerWrite),
    );
    client_result.unwrap();

    let provider = RustCryptoProvider::new();
    let result = client.run(&provider, &mut client_conn);
    assert!(matches!(result, Err(Error::Internal(_))));
}
