//! Timer data model: phases, configuration and the outbound snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of interval the countdown is measuring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Focus,
    ShortBreak,
    LongBreak,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Focus => "focus",
            PhaseKind::ShortBreak => "short_break",
            PhaseKind::LongBreak => "long_break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, PhaseKind::Focus)
    }
}

/// Lifecycle state of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

impl TimerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Completed => "completed",
        }
    }
}

/// Length and kind of the interval currently loaded into the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfiguration {
    pub duration_minutes: u32,
    pub phase_kind: PhaseKind,
}

impl TimerConfiguration {
    pub fn new(duration_minutes: u32, phase_kind: PhaseKind) -> Self {
        Self {
            duration_minutes: duration_minutes.max(1),
            phase_kind,
        }
    }

    pub fn focus(duration_minutes: u32) -> Self {
        Self::new(duration_minutes, PhaseKind::Focus)
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }
}

/// Countdown fields as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub is_paused: bool,
    pub completed_session_count: u32,
}

/// Read-only view rendered by clients on every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub phase_kind: PhaseKind,
    pub duration_minutes: u32,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    pub is_running: bool,
    pub is_paused: bool,
    pub completed_session_count: u32,
    /// Remaining time as `MM:SS`
    pub formatted: String,
    /// Elapsed share of the interval, `0.0..=1.0`
    pub progress: f64,
}

/// Emitted whenever a countdown runs out while running
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub phase_kind: PhaseKind,
    pub completed_session_count: u32,
    /// Phase the timer moved on to, when it cycles automatically
    pub advanced_to: Option<PhaseKind>,
    pub completed_at: DateTime<Utc>,
}

/// Format seconds as `MM:SS`; minutes are not wrapped into hours
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Progress ratio `1 - remaining/total`, clamped to `[0, 1]`
pub fn progress_ratio(remaining_seconds: u64, total_seconds: u64) -> f64 {
    if total_seconds == 0 {
        return 1.0;
    }
    let remaining = remaining_seconds.min(total_seconds) as f64;
    1.0 - remaining / total_seconds as f64
}
