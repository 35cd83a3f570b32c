//! Solenoid tapper controller library.
//!
//! Drives a relay-switched solenoid over a USB serial link on a fixed
//! interval, with pause/resume and live counters.  The session core in
//! [`app`] is hardware-agnostic; [`adapters`] binds it to a real serial
//! device and to the logger.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod protocol;

pub use app::service::{SessionTiming, TapSession};
pub use config::SessionConfig;
pub use error::{ConfigError, Error, Result, TransportError};
pub use fsm::SessionState;
