//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                 | Connects to           |
//! |-------------|----------------------------|-----------------------|
//! | `serial`    | RelayConnector, RelayPort  | LCUS-1 over USB serial|
//! | `log_sink`  | EventSink                  | `log` facade          |

pub mod log_sink;
pub mod serial;
