//! Background tasks module
//!
//! This module contains the tick driver that feeds the running timer and
//! the tasks that react to its completions.

pub mod tick_driver;
pub mod completion_notifier;

// Re-export main functions
pub use tick_driver::{spawn_tick_driver, TickHandle};
pub use completion_notifier::completion_notifier_task;
