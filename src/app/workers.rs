//! Session worker loops.
//!
//! ```text
//!  controller ──start──▶ spawn timer ──▶ spawn tap (owns relay + timer handle)
//!
//!  tap worker:   loop { tap · count · rest }  ──exit──▶ request stop
//!                                                    ─▶ join timer
//!                                                    ─▶ close relay
//!                                                    ─▶ finish (Idle) · emit Stopped
//!  timer worker: loop { publish elapsed · wait 1 tick }
//! ```
//!
//! The tap worker is the sole writer to the relay, and it closes the relay
//! only after the timer has been joined, so joining the tap worker is
//! enough for `stop()` to know both threads are gone and the port is shut.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{error, info};

use super::events::{SessionEvent, StopReason};
use super::ports::{EventSink, RelayPort};
use crate::config::SessionConfig;
use crate::drivers::relay;
use crate::fsm::SessionState;
use crate::fsm::context::SessionContext;

/// Tap worker body: run the campaign, then tear the whole session down.
pub(super) fn run_tap_worker<P: RelayPort, S: EventSink>(
    ctx: Arc<SessionContext>,
    mut port: P,
    config: SessionConfig,
    sink: Arc<S>,
    pause_poll: Duration,
    timer: JoinHandle<()>,
) {
    let reason = tap_loop(&ctx, &mut port, &config, sink.as_ref(), pause_poll);

    // No-op when the controller already asked; its reason is kept.
    ctx.request_stop(reason);

    if timer.join().is_err() {
        error!("timer worker panicked");
    }
    port.close();

    if let Some(report) = ctx.finish() {
        info!(
            "Session ended: {} after {} taps",
            report.reason, report.taps_completed
        );
        sink.emit(&SessionEvent::Stopped(report));
    }
}

fn tap_loop<P: RelayPort, S: EventSink>(
    ctx: &SessionContext,
    port: &mut P,
    config: &SessionConfig,
    sink: &S,
    pause_poll: Duration,
) -> StopReason {
    let hold = config.tap_duration();
    let rest = config.rest_period();

    loop {
        match ctx.state() {
            SessionState::Running => {
                if let Err(e) = relay::tap(port, hold) {
                    let msg = e.to_string();
                    error!("Tap aborted, ending session: {}", msg);
                    sink.emit(&SessionEvent::Fault(msg.clone()));
                    return StopReason::Fault(msg);
                }

                let count = ctx.record_tap();
                sink.emit(&SessionEvent::TapCompleted { count });

                // The final tap gets its rest too; stop() still cuts it short.
                ctx.rest(rest);

                if config.limit_reached(count) {
                    return StopReason::LimitReached;
                }
            }
            SessionState::Paused => {
                ctx.wait_while_paused(pause_poll);
            }
            SessionState::Idle | SessionState::Stopping => return StopReason::Operator,
        }
    }
}

/// Timer worker body: publish elapsed Running time once per tick.
pub(super) fn run_timer_worker<S: EventSink>(
    ctx: Arc<SessionContext>,
    sink: Arc<S>,
    tick: Duration,
) {
    while ctx.state().is_active() {
        if let Some(elapsed) = ctx.publish_elapsed() {
            sink.emit(&SessionEvent::Elapsed(elapsed));
        }
        ctx.rest(tick);
    }
}
