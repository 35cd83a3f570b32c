//! LCUS-1 USB relay board wire protocol.
//!
//! The board accepts two fixed 4-byte commands over a 9600 8N1 link and
//! never replies.  Frame layout: start byte `0xA0`, channel, state,
//! checksum.  The frames are sent verbatim; nothing is computed at runtime.

use std::time::Duration;

/// Energise relay channel 1.
pub const RELAY_ON: [u8; 4] = [0xA0, 0x01, 0x01, 0xA2];

/// Release relay channel 1.
pub const RELAY_OFF: [u8; 4] = [0xA0, 0x01, 0x00, 0xA1];

pub const BAUD_RATE: u32 = 9600;

/// Per-write timeout on the serial link.
pub const IO_TIMEOUT: Duration = Duration::from_secs(1);
