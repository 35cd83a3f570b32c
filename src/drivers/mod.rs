//! Actuator drivers and worker-thread helpers.

pub mod relay;
pub mod spawn;
