//! Mock relay board for integration tests.
//!
//! Records every frame and close so tests can assert on the full command
//! history without a USB serial device attached.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tapper::app::events::SessionEvent;
use tapper::app::ports::{EventSink, RelayConnector, RelayPort};
use tapper::protocol::{RELAY_OFF, RELAY_ON};
use tapper::{SessionConfig, SessionTiming, TapSession, TransportError};

// ── Relay call record ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RelayCall {
    Send(Vec<u8>),
    Close,
}

#[derive(Default)]
struct BenchState {
    calls: Vec<RelayCall>,
    opened: Vec<String>,
    open_ports: usize,
    /// Frames accepted before every further send fails.
    fail_after_frames: Option<usize>,
    unavailable: bool,
}

// ── Bench (shared recorder) ───────────────────────────────────

/// Shared view of everything the mock board has seen.
#[derive(Clone, Default)]
pub struct Bench {
    inner: Arc<Mutex<BenchState>>,
}

#[allow(dead_code)]
impl Bench {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every open attempt fails, as if nothing were plugged in.
    pub fn unplugged() -> Self {
        let bench = Self::new();
        bench.lock().unavailable = true;
        bench
    }

    /// Accept `n` frames, then fail every write.
    pub fn failing_after(n: usize) -> Self {
        let bench = Self::new();
        bench.lock().fail_after_frames = Some(n);
        bench
    }

    pub fn connector(&self) -> MockConnector {
        MockConnector {
            bench: self.clone(),
        }
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RelayCall::Send(f) => Some(f.clone()),
                RelayCall::Close => None,
            })
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| **c == RelayCall::Close)
            .count()
    }

    pub fn opened(&self) -> Vec<String> {
        self.lock().opened.clone()
    }

    /// Ports currently held open.
    pub fn open_ports(&self) -> usize {
        self.lock().open_ports
    }

    fn lock(&self) -> MutexGuard<'_, BenchState> {
        self.inner.lock().unwrap()
    }
}

// ── MockConnector / MockRelay ─────────────────────────────────

pub struct MockConnector {
    bench: Bench,
}

impl RelayConnector for MockConnector {
    type Port = MockRelay;

    fn open(&self, port: &str) -> Result<MockRelay, TransportError> {
        let mut state = self.bench.lock();
        if state.unavailable {
            return Err(TransportError::Open {
                port: port.to_owned(),
                reason: "No such file or directory".into(),
            });
        }
        state.opened.push(port.to_owned());
        state.open_ports += 1;
        Ok(MockRelay {
            bench: self.bench.clone(),
            open: true,
        })
    }
}

pub struct MockRelay {
    bench: Bench,
    open: bool,
}

impl RelayPort for MockRelay {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        let mut state = self.bench.lock();
        let sent = state
            .calls
            .iter()
            .filter(|c| matches!(c, RelayCall::Send(_)))
            .count();
        if state.fail_after_frames.is_some_and(|n| sent >= n) {
            return Err(TransportError::Write("device disconnected".into()));
        }
        state.calls.push(RelayCall::Send(frame.to_vec()));
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            let mut state = self.bench.lock();
            state.open_ports -= 1;
            state.calls.push(RelayCall::Close);
        }
    }
}

impl Drop for MockRelay {
    fn drop(&mut self) {
        self.close();
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn tap_counts(&self) -> Vec<u32> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                SessionEvent::TapCompleted { count } => Some(*count),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &SessionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── Helpers ───────────────────────────────────────────────────

pub type MockSession = TapSession<MockConnector, RecordingSink>;

/// Fast worker cadences so tests finish in milliseconds.
pub fn fast_timing() -> SessionTiming {
    SessionTiming {
        timer_tick: Duration::from_millis(10),
        pause_poll: Duration::from_millis(5),
    }
}

pub fn make_session(bench: &Bench) -> (MockSession, RecordingSink) {
    let sink = RecordingSink::new();
    let session = TapSession::new(bench.connector(), sink.clone()).with_timing(fast_timing());
    (session, sink)
}

pub fn config(interval: f64, tap_duration: f64, max_taps: u32) -> SessionConfig {
    SessionConfig {
        port: "/dev/ttyUSB0".into(),
        interval_secs: interval,
        tap_duration_secs: tap_duration,
        max_taps,
    }
}

/// Poll `cond` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

/// `n` ON/OFF pairs.
pub fn tap_frames(n: usize) -> Vec<Vec<u8>> {
    (0..n)
        .flat_map(|_| [RELAY_ON.to_vec(), RELAY_OFF.to_vec()])
        .collect()
}
