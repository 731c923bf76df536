//! State management module
//!
//! This module contains the focus timer state machine, its data model and
//! the shared application state that owns it.

pub mod catalog;
pub mod session_counter;
pub mod timer_state;
pub mod machine;
pub mod app_state;

// Re-export main types
pub use app_state::AppState;
pub use machine::{
    Completion, CompletionPolicy, FocusTimer, PersistedTimer, TickOutcome, TimerSettings,
    Transition,
};
pub use session_counter::SessionCounter;
pub use timer_state::{
    CompletionEvent, PhaseKind, TimerConfiguration, TimerPhase, TimerSnapshot, TimerState,
};
