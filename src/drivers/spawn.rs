//! Named worker thread spawning.
//!
//! Session workers get a thread name (visible in debuggers and `top -H`)
//! and a small explicit stack.  Spawn failures are returned instead of
//! panicking so `start` can roll back cleanly.

use std::thread::{self, JoinHandle};

use crate::error::Error;

/// Stack for session workers.  They only sleep, lock and write 4 bytes.
pub const WORKER_STACK_KB: usize = 64;

/// Spawn a named worker with [`WORKER_STACK_KB`] of stack.
pub fn spawn_worker(
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>, Error> {
    log::debug!("Spawning '{}' (stack={}KB)", name, WORKER_STACK_KB);

    thread::Builder::new()
        .name(name.into())
        .stack_size(WORKER_STACK_KB * 1024)
        .spawn(f)
        .map_err(|e| Error::Spawn(format!("{name}: {e}")))
}
