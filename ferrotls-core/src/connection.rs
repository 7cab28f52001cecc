//! Connection: the two record channels and the finalized crypto context.

use crate::crypto_context::CryptoContext;
use crate::error::{Error, Result};
use crate::record::RecordLayer;

/// A connection: one inbound and one outbound record channel, and the crypto
/// context once a handshake driver completes.
///
/// The context is unset until a driver returns successfully and immutable
/// thereafter. The two channels are rekeyed in lockstep by the driver; all
/// handshake-phase I/O must be serialized to a single execution context.
#[derive(Debug)]
pub struct Connection<R, W> {
    record_in: RecordLayer<R>,
    record_out: RecordLayer<W>,
    context: Option<CryptoContext>,
}

impl<R, W> Connection<R, W> {
    /// Create a connection over the two halves of a duplex stream.
    pub fn new(read: R, write: W) -> Self {
        Self {
            record_in: RecordLayer::new(read),
            record_out: RecordLayer::new(write),
            context: None,
        }
    }

    /// Borrow both record channels for handshake I/O.
    pub fn channels(&mut self) -> (&mut RecordLayer<R>, &mut RecordLayer<W>) {
        (&mut self.record_in, &mut self.record_out)
    }

    /// Attach the finalized crypto context. Refuses to overwrite.
    pub fn attach_context(&mut self, context: CryptoContext) -> Result<()> {
        if self.context.is_some() {
            return Err(Error::Internal(
                "Connection already has a crypto context".into(),
            ));
        }
        self.context = Some(context);
        Ok(())
    }

    /// The crypto context, if a handshake has completed.
    pub fn crypto_context(&self) -> Option<&CryptoContext> {
        self.context.as_ref()
    }

    /// Whether a handshake has completed on this connection.
    pub fn is_established(&self) -> bool {
        self.context.is_some()
    }
}
