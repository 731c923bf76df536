//! Completed focus session counter

use serde::{Deserialize, Serialize};

use super::PhaseKind;

/// Counts focus intervals that ran down to zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounter {
    completed: u32,
}

impl SessionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(completed: u32) -> Self {
        Self { completed }
    }

    /// Record a natural completion; only focus phases count as sessions.
    /// Returns whether the counter moved.
    pub fn record(&mut self, phase_kind: PhaseKind) -> bool {
        if phase_kind.is_break() {
            return false;
        }
        self.completed = self.completed.saturating_add(1);
        true
    }

    pub fn count(&self) -> u32 {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_completion_counts() {
        let mut counter = SessionCounter::new();
        assert!(counter.record(PhaseKind::Focus));
        assert!(counter.record(PhaseKind::Focus));
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn test_breaks_do_not_count() {
        let mut counter = SessionCounter::with_count(3);
        assert!(!counter.record(PhaseKind::ShortBreak));
        assert!(!counter.record(PhaseKind::LongBreak));
        assert_eq!(counter.count(), 3);
    }

    #[test]
    fn test_saturates() {
        let mut counter = SessionCounter::with_count(u32::MAX);
        counter.record(PhaseKind::Focus);
        assert_eq!(counter.count(), u32::MAX);
    }
}
