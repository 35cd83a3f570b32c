//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing session events through the `log`
//! facade.  Per-tap and per-second events go to `debug` so a long campaign
//! does not flood the console at the default level.

use log::{debug, error, info};

use crate::app::events::{SessionEvent, format_hms};
use crate::app::ports::EventSink;

/// Adapter that logs every [`SessionEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Started {
                port,
                interval,
                tap_duration,
                max_taps,
            } => {
                info!(
                    "START | port={} | interval={:?} | force={:?} | max_taps={}",
                    port, interval, tap_duration, max_taps
                );
            }
            SessionEvent::TapCompleted { count } => {
                debug!("TAP   | #{}", count);
            }
            SessionEvent::Elapsed(elapsed) => {
                debug!("TIME  | {}", format_hms(*elapsed));
            }
            SessionEvent::Paused { taps_completed } => {
                info!("PAUSE | after {} taps", taps_completed);
            }
            SessionEvent::Resumed => {
                info!("RESUME");
            }
            SessionEvent::Fault(msg) => {
                error!("FAULT | {}", msg);
            }
            SessionEvent::Stopped(report) => {
                info!(
                    "STOP  | {} | taps={} | elapsed={}",
                    report.reason,
                    report.taps_completed,
                    format_hms(report.elapsed)
                );
            }
        }
    }
}
