//! Unified error types for the tapper controller.
//!
//! A single [`Error`] enum that every subsystem converts into, keeping the
//! controller's error handling uniform.  Each category maps onto one of the
//! operator-visible failure classes:
//!
//! | Variant              | Raised by               | Session impact              |
//! |----------------------|-------------------------|-----------------------------|
//! | `Config`             | [`SessionConfig::validate`] | nothing opened, stays Idle |
//! | `Transport(Open)`    | connector `open`        | nothing left open, Idle     |
//! | `Transport(Write)`   | relay `send`            | session ends, port closed   |
//! | `Busy`               | `start` while active    | running session untouched   |
//!
//! [`SessionConfig::validate`]: crate::config::SessionConfig::validate

use core::fmt;

use crate::fsm::SessionState;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible controller operation funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Operator-supplied parameters were rejected before touching hardware.
    Config(ConfigError),
    /// The serial link could not be opened or written.
    Transport(TransportError),
    /// `start` was called while a session is not Idle.
    Busy(SessionState),
    /// The OS refused to spawn a session worker.
    Spawn(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "input error: {e}"),
            Self::Transport(e) => write!(f, "serial error: {e}"),
            Self::Busy(state) => write!(f, "session already {state}"),
            Self::Spawn(msg) => write!(f, "worker spawn failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Busy(_) | Self::Spawn(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Validation failures, reported in check order (first failure wins).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Port is empty or the "no devices found" placeholder.
    NoPort,
    /// Interval is zero, negative, or not a finite number.
    NonPositiveInterval,
    /// Tap duration is zero, negative, or not a finite number.
    NonPositiveTapDuration,
    /// Positive, but too large to schedule as a timer.
    OutOfRange { field: &'static str, value: f64 },
    /// The relay would still be held when the next tap is due.
    IntervalNotAboveTapDuration { interval: f64, tap_duration: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPort => write!(f, "no USB serial device available"),
            Self::NonPositiveInterval => write!(f, "interval must be a positive number of seconds"),
            Self::NonPositiveTapDuration => {
                write!(f, "tap duration must be a positive number of seconds")
            }
            Self::OutOfRange { field, value } => write!(f, "{field} of {value}s is out of range"),
            Self::IntervalNotAboveTapDuration {
                interval,
                tap_duration,
            } => write!(
                f,
                "interval must be greater than tap duration ({interval}s <= {tap_duration}s)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Port unavailable, busy, or nonexistent.
    Open { port: String, reason: String },
    /// A frame could not be written mid-session.
    Write(String),
    /// Send attempted on a handle that was already closed.
    Closed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { port, reason } => write!(f, "failed to open {port}: {reason}"),
            Self::Write(reason) => write!(f, "write failed: {reason}"),
            Self::Closed => write!(f, "port is closed"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
