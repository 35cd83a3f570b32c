//! Outbound session events and status snapshots.
//!
//! The [`TapSession`](super::service::TapSession) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log them, drive a display, or record
//! them in a test.

use core::fmt;
use std::time::Duration;

use crate::fsm::SessionState;

/// Structured events emitted while a session runs.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Workers are up and the first tap is imminent.
    Started {
        port: String,
        interval: Duration,
        tap_duration: Duration,
        max_taps: u32,
    },

    /// A full ON-hold-OFF cycle finished; `count` is the new total.
    TapCompleted { count: u32 },

    /// Timer worker published a new elapsed value.
    Elapsed(Duration),

    Paused { taps_completed: u32 },

    Resumed,

    /// A frame could not be written; the session is being torn down.
    Fault(String),

    /// Teardown finished and the session is Idle again.
    Stopped(SessionReport),
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `stop()` from the controller.
    Operator,
    /// `max_taps` taps were completed.
    LimitReached,
    /// The serial link failed mid-session.
    Fault(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator => write!(f, "stopped by operator"),
            Self::LimitReached => write!(f, "tap limit reached"),
            Self::Fault(msg) => write!(f, "fault: {msg}"),
        }
    }
}

/// Final counters of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub taps_completed: u32,
    /// Running time only; paused stretches are excluded.
    pub elapsed: Duration,
    pub reason: StopReason,
}

/// Point-in-time view for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub taps_completed: u32,
    /// `0` = unlimited (or no session).
    pub max_taps: u32,
    pub elapsed: Duration,
}

impl SessionStatus {
    pub fn elapsed_hms(&self) -> String {
        format_hms(self.elapsed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | taps {}", self.elapsed_hms(), self.taps_completed)?;
        if self.max_taps > 0 {
            write!(f, "/{}", self.max_taps)?;
        }
        write!(f, " | {}", self.state)
    }
}

/// `HH:MM:SS`, truncating sub-second time.  Hours do not wrap at 24.
pub fn format_hms(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, rem) = (total / 3600, total % 3600);
    format!("{:02}:{:02}:{:02}", hours, rem / 60, rem % 60)
}
