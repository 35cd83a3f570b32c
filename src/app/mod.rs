//! Application core — session logic behind port traits.
//!
//! This module contains the tap campaign rules: the session service with
//! its two workers, the commands it accepts and the events it emits.
//! All interaction with the relay board happens through the traits in
//! [`ports`], keeping this layer testable without a serial device.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
mod workers;
