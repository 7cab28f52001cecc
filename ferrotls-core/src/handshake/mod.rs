//! Client and server handshake drivers.

mod client;
mod server;

pub use client::ClientHandshake;
pub use server::ServerHandshake;

use crate::crypto_context::{KeySet, TrafficKeys};

/// Connection role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Client
    Client,

    /// Server
    Server,
}

/// Driver phase.
///
/// Each driver walks these phases in its own order; every fallible
/// transition either advances the phase or moves the driver to `Failed` and
/// aborts the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    /// Nothing sent or received yet.
    Start,

    /// Our hello is on the wire.
    SentHello,

    /// Suite and group agreed, shared secret computed.
    Negotiated,

    /// Both channels switched to handshake-phase keys.
    KeyedHandshake,

    /// Waiting on (or about to verify) the peer's Finished.
    AwaitingFinished,

    /// Both channels switched to application-phase keys.
    KeyedApplication,

    /// Handshake complete, context attached.
    Connected,

    /// Handshake aborted; the connection has no usable crypto context.
    Failed,
}

/// Which derived key sets a rekey applies to each direction.
///
/// This is configuration, not negotiation: both peers must be configured
/// identically or their channels will not interoperate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RekeyPolicy {
    /// Both directions use the server-derived write key set.
    ///
    /// This reproduces the single-key-set simplification of the minimal
    /// profile: the client-derived keys are computed but never installed.
    /// Not full-strength TLS.
    #[default]
    SharedServerWrite,

    /// Each direction uses its own derived key set: client-derived keys
    /// protect client-to-server traffic, server-derived keys the reverse.
    PerDirection,
}

/// Resolve the (read, write) key sets for one side's channels.
pub(crate) fn channel_keys(
    role: Role,
    policy: RekeyPolicy,
    keys: &TrafficKeys,
) -> (&KeySet, &KeySet) {
    match policy {
        RekeyPolicy::SharedServerWrite => (&keys.server, &keys.server),
        RekeyPolicy::PerDirection => match role {
            Role::Client => (&keys.server, &keys.client),
            Role::Server => (&keys.client, &keys.server),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::Zeroizing;

    fn keys() -> TrafficKeys {
        TrafficKeys {
            client: KeySet {
                key: Zeroizing::new(vec![1u8; 16]),
                iv: Zeroizing::new(vec![1u8; 12]),
            },
            server: KeySet {
                key: Zeroizing::new(vec![2u8; 16]),
                iv: Zeroizing::new(vec![2u8; 12]),
            },
        }
    }

    #[test]
    fn test_shared_server_write_uses_server_keys_everywhere() {
        let keys = keys();
        for role in [Role::Client, Role::Server] {
            let (read, write) = channel_keys(role, RekeyPolicy::SharedServerWrite, &keys);
            assert_eq!(read.key.as_slice(), &[2u8; 16]);
            assert_eq!(write.key.as_slice(), &[2u8; 16]);
        }
    }

    #[test]
    fn test_per_direction_keys_are_mirrored() {
        let keys = keys();

        let (client_read, client_write) =
            channel_keys(Role::Client, RekeyPolicy::PerDirection, &keys);
        let (server_read, server_write) =
            channel_keys(Role::Server, RekeyPolicy::PerDirection, &keys);

        // What the client writes with, the server reads with
        assert_eq!(client_write.key.as_slice(), server_read.key.as_slice());
        assert_eq!(server_write.key.as_slice(), client_read.key.as_slice());
        assert_ne!(client_write.key.as_slice(), server_write.key.as_slice());
    }
}
