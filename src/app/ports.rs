//! Port traits — the hexagonal boundary between the session core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TapSession (domain)
//! ```
//!
//! Driven adapters (serial relay, event sinks) implement these traits.
//! [`TapSession`](super::service::TapSession) consumes them via generics,
//! so the session core never touches a real serial device in tests.

use crate::error::TransportError;

// ───────────────────────────────────────────────────────────────
// Relay ports (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// An open link to the relay board.
///
/// While a session is active the tap worker is the only holder, so
/// implementations need no internal locking.
pub trait RelayPort {
    /// Write one complete command frame.
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Release the link.  Must be safe to call repeatedly; later sends
    /// fail with [`TransportError::Closed`].
    fn close(&mut self);
}

/// Opens [`RelayPort`]s by device name.
pub trait RelayConnector {
    type Port: RelayPort + Send + 'static;

    /// Fails with [`TransportError::Open`] for unavailable devices; must not
    /// leave anything half-open behind.
    fn open(&self, port: &str) -> Result<Self::Port, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / display)
// ───────────────────────────────────────────────────────────────

/// Receives [`SessionEvent`](super::events::SessionEvent)s from the
/// controller and from both workers, possibly concurrently.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &super::events::SessionEvent);
}

/// Sink that drops everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &super::events::SessionEvent) {}
}
