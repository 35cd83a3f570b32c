//! Session state machine.
//!
//! ```text
//!            start                  toggle-pause
//!   IDLE ─────────────▶ RUNNING ◀──────────────▶ PAUSED
//!    ▲                     │                       │
//!    │                     │ stop / limit / fault  │ stop
//!    │                     ▼                       │
//!    └──[teardown done]── STOPPING ◀───────────────┘
//! ```
//!
//! [`SessionState::next`] is the whole transition table: a pure function
//! from `(state, trigger)` to the follow-up state, or `None` when the
//! trigger is a no-op in that state.  The shared, lock-guarded copy of the
//! state lives in [`context::SessionContext`].

pub mod context;

use core::fmt;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionState {
    #[default]
    Idle = 0,
    Running = 1,
    Paused = 2,
    /// Transient: workers are winding down, collapses to `Idle`.
    Stopping = 3,
}

/// Inputs that can move the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    TogglePause,
    /// Operator stop, tap limit reached, or transport fault.
    Stop,
    TeardownComplete,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
        }
    }

    /// Workers keep looping while the session is active.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    pub fn next(self, trigger: Trigger) -> Option<Self> {
        use SessionState::{Idle, Paused, Running, Stopping};
        match (self, trigger) {
            (Idle, Trigger::Start) => Some(Running),
            (Running, Trigger::TogglePause) => Some(Paused),
            (Paused, Trigger::TogglePause) => Some(Running),
            (Running | Paused, Trigger::Stop) => Some(Stopping),
            (Stopping, Trigger::TeardownComplete) => Some(Idle),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
