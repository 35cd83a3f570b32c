//! Solenoid actuator on relay channel 1.
//!
//! One tap = energise, hold, release.  The hold time is the tap "force":
//! the longer the coil is powered the harder the plunger strikes.
//!
//! ## Safety contract
//!
//! The hold is a plain blocking sleep and is never cut short by a stop
//! request, so a tap that managed to send ON always attempts OFF.  Session
//! cancellation is observed only between taps.

use std::thread;
use std::time::Duration;

use log::trace;

use crate::app::ports::RelayPort;
use crate::error::TransportError;
use crate::protocol::{RELAY_OFF, RELAY_ON};

/// Perform one tap.  The first failing frame aborts the tap and is
/// returned; nothing is retried.
pub fn tap(port: &mut impl RelayPort, hold: Duration) -> Result<(), TransportError> {
    port.send(&RELAY_ON)?;
    trace!("relay on, holding {:?}", hold);
    thread::sleep(hold);
    port.send(&RELAY_OFF)?;
    trace!("relay off");
    Ok(())
}
