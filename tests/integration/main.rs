//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the session against the
//! mock relay board.  All tests run on the host with no serial device.

mod mock_relay;
