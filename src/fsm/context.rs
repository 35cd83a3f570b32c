//! Shared session context, the blackboard both workers and the controller
//! read from and write to.
//!
//! Every field sits behind one mutex, paired with a condvar that is
//! notified on each state change.  Workers never sleep with a bare
//! `thread::sleep` between taps: they wait on the condvar so a stop request
//! wakes them at once instead of after the current rest period.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::debug;

use super::{SessionState, Trigger};
use crate::app::events::{SessionReport, StopReason};

// ---------------------------------------------------------------------------
// Run clock
// ---------------------------------------------------------------------------

/// Stopwatch that only advances while the session is Running.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunClock {
    /// Running time folded in from finished segments.
    accumulated: Duration,
    /// Start of the current Running segment, `None` while paused.
    segment_start: Option<Instant>,
}

impl RunClock {
    pub fn started(now: Instant) -> Self {
        Self {
            accumulated: Duration::ZERO,
            segment_start: Some(now),
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(start) = self.segment_start.take() {
            self.accumulated += now.saturating_duration_since(start);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if self.segment_start.is_none() {
            self.segment_start = Some(now);
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .segment_start
                .map_or(Duration::ZERO, |start| now.saturating_duration_since(start))
    }
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Shared {
    state: SessionState,
    taps_completed: u32,
    clock: RunClock,
    /// Last value published by the timer worker.
    elapsed: Duration,
    stop_reason: Option<StopReason>,
    last_report: Option<SessionReport>,
    last_fault: Option<String>,
}

/// Lock-guarded session state shared by the controller and both workers.
#[derive(Debug, Default)]
pub struct SessionContext {
    shared: Mutex<Shared>,
    changed: Condvar,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn taps_completed(&self) -> u32 {
        self.lock().taps_completed
    }

    /// Elapsed Running time as last published by the timer worker.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// State, taps and elapsed read under a single lock.
    pub fn snapshot(&self) -> (SessionState, u32, Duration) {
        let s = self.lock();
        (s.state, s.taps_completed, s.elapsed)
    }

    pub fn last_report(&self) -> Option<SessionReport> {
        self.lock().last_report.clone()
    }

    pub fn last_fault(&self) -> Option<String> {
        self.lock().last_fault.clone()
    }

    // ── Controller-side transitions ───────────────────────────

    /// Idle → Running with fresh counters.  Returns the blocking state on
    /// refusal.
    pub fn begin(&self) -> Result<(), SessionState> {
        let mut s = self.lock();
        let next = s.state.next(Trigger::Start).ok_or(s.state)?;
        s.state = next;
        s.taps_completed = 0;
        s.elapsed = Duration::ZERO;
        s.clock = RunClock::started(Instant::now());
        s.stop_reason = None;
        s.last_fault = None;
        drop(s);
        self.changed.notify_all();
        Ok(())
    }

    /// Running ↔ Paused.  `None` when the toggle is a no-op.
    pub fn toggle_pause(&self) -> Option<SessionState> {
        let mut s = self.lock();
        let next = s.state.next(Trigger::TogglePause)?;
        let now = Instant::now();
        match next {
            SessionState::Paused => s.clock.pause(now),
            _ => s.clock.resume(now),
        }
        s.state = next;
        drop(s);
        self.changed.notify_all();
        Some(next)
    }

    /// Running|Paused → Stopping.  The first caller's reason wins; later
    /// requests return `false` and change nothing.
    pub fn request_stop(&self, reason: StopReason) -> bool {
        let mut s = self.lock();
        let Some(next) = s.state.next(Trigger::Stop) else {
            return false;
        };
        debug!("stop requested ({reason}) while {}", s.state);
        s.clock.pause(Instant::now());
        s.state = next;
        s.stop_reason = Some(reason);
        drop(s);
        self.changed.notify_all();
        true
    }

    /// Stopping → Idle: reset the live counters and keep a report of the
    /// session that just ended.  `None` unless a stop was requested first.
    pub fn finish(&self) -> Option<SessionReport> {
        let mut s = self.lock();
        let next = s.state.next(Trigger::TeardownComplete)?;
        s.clock.pause(Instant::now());
        let reason = s.stop_reason.take().unwrap_or(StopReason::Operator);
        if let StopReason::Fault(msg) = &reason {
            s.last_fault = Some(msg.clone());
        }
        let report = SessionReport {
            taps_completed: s.taps_completed,
            elapsed: s.clock.elapsed(Instant::now()),
            reason,
        };
        s.state = next;
        s.taps_completed = 0;
        s.elapsed = Duration::ZERO;
        s.clock = RunClock::default();
        s.last_report = Some(report.clone());
        drop(s);
        self.changed.notify_all();
        Some(report)
    }

    // ── Worker-side updates ───────────────────────────────────

    /// Count one completed tap, returning the new total.
    pub fn record_tap(&self) -> u32 {
        let mut s = self.lock();
        s.taps_completed = s.taps_completed.saturating_add(1);
        s.taps_completed
    }

    /// Refresh the published elapsed time.  Only advances while Running;
    /// returns the new value, or `None` when frozen.
    pub fn publish_elapsed(&self) -> Option<Duration> {
        let mut s = self.lock();
        if s.state != SessionState::Running {
            return None;
        }
        s.elapsed = s.clock.elapsed(Instant::now());
        Some(s.elapsed)
    }

    /// Sleep up to `dur`, waking early if the session stops being active.
    pub fn rest(&self, dur: Duration) -> SessionState {
        self.wait_while(dur, SessionState::is_active)
    }

    /// Sleep up to `dur` while paused, waking early on resume or stop.
    pub fn wait_while_paused(&self, dur: Duration) -> SessionState {
        self.wait_while(dur, |state| state == SessionState::Paused)
    }

    // ── Internal ──────────────────────────────────────────────

    fn wait_while(
        &self,
        dur: Duration,
        keep_waiting: impl Fn(SessionState) -> bool,
    ) -> SessionState {
        let guard = self.lock();
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, dur, |s| keep_waiting(s.state))
            .unwrap_or_else(PoisonError::into_inner);
        guard.state
    }

    /// A worker that panicked mid-update leaves plain scalars behind, so a
    /// poisoned lock is still safe to read.
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
