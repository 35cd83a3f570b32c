//! USB serial relay adapter.
//!
//! Implements [`RelayConnector`] / [`RelayPort`] on top of the
//! `serialport` crate for the LCUS-1 board (CH340 USB-UART, 9600 8N1).
//! Also provides the device enumeration the operator picks a port from.

use std::io::Write;
use std::time::Duration;

use log::{debug, info, warn};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::app::ports::{RelayConnector, RelayPort};
use crate::config::NO_DEVICES;
use crate::error::TransportError;
use crate::protocol::{BAUD_RATE, IO_TIMEOUT};

// ── Enumeration ───────────────────────────────────────────────

/// Names of every serial device currently visible to the OS.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            warn!("Serial port enumeration failed: {}", e);
            Vec::new()
        }
    }
}

/// First available device, or the [`NO_DEVICES`] placeholder.
pub fn default_port() -> String {
    available_ports()
        .into_iter()
        .next()
        .unwrap_or_else(|| NO_DEVICES.to_owned())
}

// ── Connector ─────────────────────────────────────────────────

/// Opens relay boards with fixed line settings.
#[derive(Debug, Clone, Copy)]
pub struct SerialConnector {
    baud_rate: u32,
    io_timeout: Duration,
}

impl Default for SerialConnector {
    fn default() -> Self {
        Self::new(BAUD_RATE, IO_TIMEOUT)
    }
}

impl SerialConnector {
    pub fn new(baud_rate: u32, io_timeout: Duration) -> Self {
        Self {
            baud_rate,
            io_timeout,
        }
    }
}

impl RelayConnector for SerialConnector {
    type Port = SerialRelay;

    fn open(&self, port: &str) -> Result<SerialRelay, TransportError> {
        let handle = serialport::new(port, self.baud_rate)
            .timeout(self.io_timeout)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .open()
            .map_err(|e| TransportError::Open {
                port: port.to_owned(),
                reason: e.to_string(),
            })?;

        info!("Opened {} at {} baud", port, self.baud_rate);
        Ok(SerialRelay {
            name: port.to_owned(),
            handle: Some(handle),
        })
    }
}

// ── Relay port ────────────────────────────────────────────────

/// An open relay board.  The device is released on [`close`](RelayPort::close)
/// or drop, whichever comes first.
pub struct SerialRelay {
    name: String,
    handle: Option<Box<dyn SerialPort>>,
}

impl RelayPort for SerialRelay {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        let handle = self.handle.as_mut().ok_or(TransportError::Closed)?;
        handle
            .write_all(frame)
            .and_then(|()| handle.flush())
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    fn close(&mut self) {
        if self.handle.take().is_some() {
            info!("Closed {}", self.name);
        } else {
            debug!("{} already closed", self.name);
        }
    }
}
