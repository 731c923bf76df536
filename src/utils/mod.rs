//! Process-level helpers
//!
//! Signal handling used by the server binary to shut down and persist the timer.

pub mod signals;

pub use signals::shutdown_signal;
