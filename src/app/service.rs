//! Tap session service — the hexagonal core.
//!
//! [`TapSession`] owns the shared [`SessionContext`] and the handle of the
//! running tap worker.  It exposes start / stop / toggle-pause plus
//! pull-style status queries.  All I/O flows through the port traits it
//! is generic over, so the whole service runs against mock relays in
//! tests.
//!
//! ```text
//!                ┌──────────────────────────┐
//! RelayConnector │        TapSession         │ ──▶ EventSink
//!   ──open──▶    │  context · tap · timer    │
//!                └──────────────────────────┘
//! ```
//!
//! Every method takes `&self`; the session can sit in an `Arc` shared by an
//! input thread and a display thread.  Controller calls are serialised on
//! an internal lock, queries never wait for a stop in progress.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error, info, warn};

use super::commands::SessionCommand;
use super::events::{SessionEvent, SessionReport, SessionStatus, StopReason, format_hms};
use super::ports::{EventSink, RelayConnector, RelayPort};
use super::workers;
use crate::config::SessionConfig;
use crate::drivers::spawn::spawn_worker;
use crate::error::{Error, Result};
use crate::fsm::SessionState;
use crate::fsm::context::SessionContext;

// ───────────────────────────────────────────────────────────────
// Timing knobs
// ───────────────────────────────────────────────────────────────

/// Worker cadences that are not part of the operator's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// How often the timer worker publishes elapsed time.
    pub timer_tick: Duration,
    /// Upper bound on how long a paused tap worker sleeps between checks.
    pub pause_poll: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            timer_tick: Duration::from_secs(1),
            pause_poll: Duration::from_millis(100),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// TapSession
// ───────────────────────────────────────────────────────────────

/// A restartable tap campaign controller.
///
/// Ports handed out by `C` must release the device when dropped; a port
/// that never reaches its worker (spawn failure) is only dropped.
pub struct TapSession<C: RelayConnector, S: EventSink + 'static> {
    connector: C,
    sink: Arc<S>,
    ctx: Arc<SessionContext>,
    timing: SessionTiming,
    /// Tap worker of the current session, or of a finished one not yet reaped.
    worker: Mutex<Option<JoinHandle<()>>>,
    max_taps: AtomicU32,
}

impl<C: RelayConnector, S: EventSink + 'static> TapSession<C, S> {
    /// An Idle session with no port open.
    pub fn new(connector: C, sink: S) -> Self {
        Self {
            connector,
            sink: Arc::new(sink),
            ctx: Arc::new(SessionContext::new()),
            timing: SessionTiming::default(),
            worker: Mutex::new(None),
            max_taps: AtomicU32::new(0),
        }
    }

    pub fn with_timing(mut self, timing: SessionTiming) -> Self {
        self.timing = timing;
        self
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Validate `config`, open its port and spawn both workers.
    ///
    /// On any failure the session stays Idle and nothing is left open.
    pub fn start(&self, config: SessionConfig) -> Result<()> {
        let mut worker = self.lock_worker();

        // A self-stopped session may still be tearing down.
        if self.ctx.state() == SessionState::Stopping {
            Self::reap(worker.take());
        }
        let state = self.ctx.state();
        if state != SessionState::Idle {
            return Err(Error::Busy(state));
        }
        Self::reap(worker.take());

        if let Err(e) = config.validate() {
            warn!("Rejected session config: {}", e);
            return Err(e.into());
        }

        let mut port = self.connector.open(&config.port).inspect_err(|e| {
            warn!("{}", e);
        })?;

        if let Err(state) = self.ctx.begin() {
            port.close();
            return Err(Error::Busy(state));
        }
        self.max_taps.store(config.max_taps, Ordering::Relaxed);

        info!(
            "Session started on {} (interval={}s, force={}s, taps={})",
            config.port,
            config.interval_secs,
            config.tap_duration_secs,
            if config.is_unlimited() {
                "unlimited".to_owned()
            } else {
                config.max_taps.to_string()
            }
        );
        self.sink.emit(&SessionEvent::Started {
            port: config.port.clone(),
            interval: config.interval(),
            tap_duration: config.tap_duration(),
            max_taps: config.max_taps,
        });

        let timer = {
            let ctx = Arc::clone(&self.ctx);
            let sink = Arc::clone(&self.sink);
            let tick = self.timing.timer_tick;
            spawn_worker("tap-timer", move || workers::run_timer_worker(ctx, sink, tick))
        };
        let timer = match timer {
            Ok(handle) => handle,
            Err(e) => {
                port.close();
                self.abort_start(&e);
                return Err(e);
            }
        };

        let tap = {
            let ctx = Arc::clone(&self.ctx);
            let sink = Arc::clone(&self.sink);
            let pause_poll = self.timing.pause_poll;
            spawn_worker("tap-worker", move || {
                workers::run_tap_worker(ctx, port, config, sink, pause_poll, timer);
            })
        };
        match tap {
            Ok(handle) => {
                *worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                // Port and timer handle went down with the closure; the
                // detached timer exits on the stop below.
                self.abort_start(&e);
                Err(e)
            }
        }
    }

    /// End the session and wait for both workers to exit.
    ///
    /// Idempotent and infallible: a no-op when Idle.  An in-flight tap is
    /// allowed to finish (relay released) before the worker notices.
    pub fn stop(&self) {
        let mut worker = self.lock_worker();

        if self.ctx.request_stop(StopReason::Operator) {
            info!("Stop requested by operator");
        }

        let Some(handle) = worker.take() else {
            return;
        };
        if handle.join().is_err() {
            error!("tap worker panicked; forcing session idle");
            self.ctx
                .request_stop(StopReason::Fault("tap worker panicked".into()));
            self.ctx.finish();
        }
    }

    /// Flip Running ↔ Paused.  Returns the resulting state; a no-op when
    /// Idle or Stopping.
    pub fn toggle_pause(&self) -> SessionState {
        match self.ctx.toggle_pause() {
            Some(SessionState::Paused) => {
                let taps_completed = self.ctx.taps_completed();
                info!("Tapping paused after {} taps", taps_completed);
                self.sink.emit(&SessionEvent::Paused { taps_completed });
                SessionState::Paused
            }
            Some(state) => {
                info!("Tapping resumed");
                self.sink.emit(&SessionEvent::Resumed);
                state
            }
            None => {
                let state = self.ctx.state();
                debug!("toggle-pause ignored while {}", state);
                state
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a front-end command.  Only `Start` can fail.
    pub fn handle_command(&self, cmd: SessionCommand) -> Result<()> {
        match cmd {
            SessionCommand::Start(config) => self.start(config),
            SessionCommand::Stop => {
                self.stop();
                Ok(())
            }
            SessionCommand::TogglePause => {
                self.toggle_pause();
                Ok(())
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Live counters; the limit reads `0` once the session is Idle.
    pub fn status(&self) -> SessionStatus {
        let (state, taps_completed, elapsed) = self.ctx.snapshot();
        let max_taps = match state {
            SessionState::Idle => 0,
            _ => self.max_taps.load(Ordering::Relaxed),
        };
        SessionStatus {
            state,
            taps_completed,
            max_taps,
            elapsed,
        }
    }

    pub fn state(&self) -> SessionState {
        self.ctx.state()
    }

    /// Taps completed in the current session (0 when Idle).
    pub fn taps_completed(&self) -> u32 {
        self.ctx.taps_completed()
    }

    /// Elapsed Running time of the current session (0 when Idle).
    pub fn elapsed(&self) -> Duration {
        self.ctx.elapsed()
    }

    /// Elapsed Running time as `HH:MM:SS`.
    pub fn elapsed_hms(&self) -> String {
        format_hms(self.ctx.elapsed())
    }

    /// Final counters of the most recently finished session.
    pub fn last_report(&self) -> Option<SessionReport> {
        self.ctx.last_report()
    }

    /// Transport fault that ended the most recent session, if any.
    pub fn last_fault(&self) -> Option<String> {
        self.ctx.last_fault()
    }

    // ── Internal ──────────────────────────────────────────────

    fn abort_start(&self, e: &Error) {
        error!("Session start aborted: {}", e);
        self.ctx.request_stop(StopReason::Fault(e.to_string()));
        if let Some(report) = self.ctx.finish() {
            self.sink.emit(&SessionEvent::Stopped(report));
        }
    }

    fn reap(handle: Option<JoinHandle<()>>) {
        if handle.is_some_and(|h| h.join().is_err()) {
            error!("previous tap worker panicked");
        }
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: RelayConnector, S: EventSink + 'static> Drop for TapSession<C, S> {
    fn drop(&mut self) {
        self.stop();
    }
}
