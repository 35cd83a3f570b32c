//! Inbound commands to the tap session.
//!
//! These are the three controls the operator has (start button, stop
//! button, pause key).  Any front end can translate its own input into
//! them and hand them to
//! [`TapSession::handle_command`](super::service::TapSession::handle_command).

use crate::config::SessionConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Validate, open the port and begin tapping.
    Start(SessionConfig),

    /// End the session; no-op when already Idle.
    Stop,

    /// Flip Running ↔ Paused; no-op otherwise.
    TogglePause,
}
