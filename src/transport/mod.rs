//! Transport layer for FINS communication.
//!
//! This module separates the protocol layer from the byte-level carrier:
//! [`DatagramTransport`] speaks UDP with fixed node addresses, and
//! [`StreamTransport`] speaks TCP, wrapping every frame in the 16-byte
//! outer header of [`crate::outer`]. Both embed a [`state::StateMachine`]
//! and drive it through the same lifecycle (spec §4.7).

pub mod datagram;
pub mod state;
pub mod stream;

pub use datagram::DatagramTransport;
pub use state::{StateChangeCallback, TransportState};
pub use stream::StreamTransport;

use std::time::Duration;

use crate::error::Result;
use crate::header::FinsHeader;

/// Default FINS port, used by both transports unless overridden.
pub const DEFAULT_FINS_PORT: u16 = 9600;

/// Default connect/read/write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default one-shot reconnection interval.
pub const DEFAULT_RECONNECTION_INTERVAL: Duration = Duration::from_secs(10);

/// Maximum datagram size this library will allocate a receive buffer for.
pub const MAX_DATAGRAM_SIZE: usize = 2048;

/// Carrier-agnostic request/response exchange used by the dispatcher.
///
/// A `Transport` owns exactly one outstanding request at a time (spec §5);
/// callers must serialise their own access if shared across threads.
pub trait Transport {
    /// Opens the transport. Idempotent: a no-op if already `Connected`.
    fn open(&self) -> Result<()>;

    /// Closes the transport. Terminal; a new transport must be created to
    /// reconnect after this.
    fn close(&self);

    /// Forces the transport to `Disconnected` and arms the reconnection
    /// timer, without closing it terminally. Used by the dispatcher when a
    /// response fails an application-level check (e.g. a SID mismatch) that
    /// the transport itself had no I/O-level reason to notice (spec §4.5,
    /// §7).
    fn disconnect(&self);

    /// Sends one application header + body, then reads back the 14-byte
    /// response header and its payload in one round trip.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FinsError::NotConnected`] if not currently
    /// `Connected`, or a transport-level error (I/O, timeout, framing) on
    /// failure — any of which transitions the transport to `Disconnected`.
    fn send_receive(&self, header: FinsHeader, body: &[u8]) -> Result<Vec<u8>>;

    /// Returns the current lifecycle state.
    fn state(&self) -> TransportState;

    /// Registers the single state-change subscriber.
    fn on_state_change(&self, callback: StateChangeCallback);
}
