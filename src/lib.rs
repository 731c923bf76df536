//! Focus Timer - A state-managed HTTP server driving a focus/pomodoro countdown
//!
//! This library provides the countdown state machine with work/break
//! cycling, the tick driver that feeds it, and an HTTP adapter that lets any
//! front-end forward user intents and render timer snapshots.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, FocusTimer};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
