//! Session configuration parameters
//!
//! Everything the operator chooses before a session starts.  Values can be
//! loaded from a JSON file and overridden from the command line; they are
//! frozen once [`TapSession::start`](crate::app::service::TapSession::start)
//! accepts them.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Placeholder shown when enumeration finds no serial devices.
pub const NO_DEVICES: &str = "No devices found";

/// Core session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Serial device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    /// Seconds between the start of consecutive taps.
    pub interval_secs: f64,
    /// Seconds the relay stays energised per tap (the tap "force").
    pub tap_duration_secs: f64,
    /// Taps before the session stops itself; `0` = unlimited.
    pub max_taps: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: NO_DEVICES.to_owned(),
            interval_secs: 10.0,
            tap_duration_secs: 0.1,
            max_taps: 30,
        }
    }
}

impl SessionConfig {
    /// Check the parameters in order; the first failing rule is reported.
    ///
    /// Pure: no port is opened and nothing is logged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let port = self.port.trim();
        if port.is_empty() || port == NO_DEVICES {
            return Err(ConfigError::NoPort);
        }
        if !positive(self.interval_secs) {
            return Err(ConfigError::NonPositiveInterval);
        }
        in_range("interval", self.interval_secs)?;
        if !positive(self.tap_duration_secs) {
            return Err(ConfigError::NonPositiveTapDuration);
        }
        in_range("tap duration", self.tap_duration_secs)?;
        if self.interval_secs <= self.tap_duration_secs {
            return Err(ConfigError::IntervalNotAboveTapDuration {
                interval: self.interval_secs,
                tap_duration: self.tap_duration_secs,
            });
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        secs(self.interval_secs)
    }

    pub fn tap_duration(&self) -> Duration {
        secs(self.tap_duration_secs)
    }

    /// Idle time after a tap so that tap starts are `interval` apart.
    pub fn rest_period(&self) -> Duration {
        self.interval().saturating_sub(self.tap_duration())
    }

    pub fn is_unlimited(&self) -> bool {
        self.max_taps == 0
    }

    /// `true` once `taps` reaches a non-zero limit.
    pub fn limit_reached(&self, taps: u32) -> bool {
        self.max_taps > 0 && taps >= self.max_taps
    }

    /// Read a JSON config file.  Missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// A positive value must survive conversion to a non-zero [`Duration`].
fn in_range(field: &'static str, value: f64) -> Result<(), ConfigError> {
    match Duration::try_from_secs_f64(value) {
        Ok(d) if !d.is_zero() => Ok(()),
        _ => Err(ConfigError::OutOfRange { field, value }),
    }
}

/// Conversion for validated values.  Anything else maps to zero.
fn secs(v: f64) -> Duration {
    Duration::try_from_secs_f64(v).unwrap_or(Duration::ZERO)
}
