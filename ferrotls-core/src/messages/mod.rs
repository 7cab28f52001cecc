//! Handshake message bodies.

use crate::error::Result;
use crate::protocol::HandshakeType;

pub mod client_hello;
pub mod finished;
pub mod server_hello;

pub use client_hello::ClientHello;
pub use finished::Finished;
pub use server_hello::ServerHello;

/// A handshake message body that can be framed by the handshake layer.
///
/// The associated type tag is what lets `read_body` reject a wire message
/// whose tag does not match the requested destination type.
pub trait HandshakeBody: Sized {
    /// The wire type tag for this body.
    const TYPE: HandshakeType;

    /// Encode the body to bytes (without the 4-byte handshake header).
    fn encode(&self) -> Result<Vec<u8>>;

    /// Decode the body from bytes (without the 4-byte handshake header).
    fn decode(data: &[u8]) -> Result<Self>;
}
