//! Focus timer state machine
//!
//! A single countdown with work/break cycling. Every operation is total:
//! a request that does not fit the current phase is ignored rather than
//! reported as an error, so a stray button press can never corrupt state.
//!
//! The machine carries a tick generation that changes on every transition
//! into or out of `Running`. Tick sources capture the generation when they
//! are started and deliver it back with each tick, which lets the machine
//! drop ticks that were already in flight when the countdown stopped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    catalog, PhaseKind, SessionCounter, TimerConfiguration, TimerPhase, TimerSnapshot, TimerState,
};
use super::timer_state::{format_clock, progress_ratio};

/// What happens when a countdown reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Stop in `Completed` until the user acknowledges
    #[default]
    RequireAcknowledgement,
    /// Roll straight into the next focus or break interval
    AutoAdvance,
}

impl CompletionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionPolicy::RequireAcknowledgement => "require_acknowledgement",
            CompletionPolicy::AutoAdvance => "auto_advance",
        }
    }
}

/// Cycle settings that stay fixed for the lifetime of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub completion_policy: CompletionPolicy,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub sessions_before_long_break: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            completion_policy: CompletionPolicy::default(),
            short_break_minutes: catalog::SHORT_BREAK_MINUTES,
            long_break_minutes: catalog::LONG_BREAK_MINUTES,
            sessions_before_long_break: catalog::SESSIONS_BEFORE_LONG_BREAK,
        }
    }
}

/// Result of a user-initiated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Applied => "applied",
            Transition::Ignored => "ignored",
        }
    }
}

/// A countdown that ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub finished: PhaseKind,
    pub completed_session_count: u32,
    pub advanced_to: Option<PhaseKind>,
}

/// Result of delivering one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or the tick belonged to an earlier run
    Ignored,
    /// One second elapsed
    Counted { remaining_seconds: u64 },
    /// The countdown hit zero
    Completed(Completion),
}

impl TickOutcome {
    /// Whether the tick source should keep delivering ticks
    pub fn keeps_running(&self) -> bool {
        match self {
            TickOutcome::Ignored => false,
            TickOutcome::Counted { .. } => true,
            TickOutcome::Completed(completion) => completion.advanced_to.is_some(),
        }
    }
}

/// Serializable form of a timer, written on shutdown and read on startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTimer {
    pub focus_minutes: u32,
    pub configuration: TimerConfiguration,
    pub phase: TimerPhase,
    pub state: TimerState,
    pub focus_streak: u32,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FocusTimer {
    settings: TimerSettings,
    /// Focus length chosen from the catalog; applies to every focus phase
    focus_minutes: u32,
    configuration: TimerConfiguration,
    phase: TimerPhase,
    remaining_seconds: u64,
    counter: SessionCounter,
    /// Focus completions since the last long break
    focus_streak: u32,
    generation: u64,
}

impl FocusTimer {
    /// Create an idle timer. Durations outside the catalog fall back to the default.
    pub fn new(focus_minutes: u32, settings: TimerSettings) -> Self {
        let focus_minutes = if catalog::is_selectable(focus_minutes) {
            focus_minutes
        } else {
            catalog::DEFAULT_FOCUS_MINUTES
        };
        let configuration = TimerConfiguration::focus(focus_minutes);

        Self {
            settings,
            focus_minutes,
            configuration,
            phase: TimerPhase::Idle,
            remaining_seconds: configuration.total_seconds(),
            counter: SessionCounter::new(),
            focus_streak: 0,
            generation: 0,
        }
    }

    pub fn start(&mut self) -> Transition {
        if self.phase != TimerPhase::Idle {
            return Transition::Ignored;
        }
        self.remaining_seconds = self.configuration.total_seconds();
        self.enter(TimerPhase::Running);
        Transition::Applied
    }

    pub fn pause(&mut self) -> Transition {
        if self.phase != TimerPhase::Running {
            return Transition::Ignored;
        }
        self.enter(TimerPhase::Paused);
        Transition::Applied
    }

    pub fn resume(&mut self) -> Transition {
        if self.phase != TimerPhase::Paused {
            return Transition::Ignored;
        }
        self.enter(TimerPhase::Running);
        Transition::Applied
    }

    /// Abort the current interval and return to an idle focus phase.
    /// An aborted interval never counts as a completed session.
    pub fn stop(&mut self) -> Transition {
        if self.phase == TimerPhase::Idle {
            return Transition::Ignored;
        }
        self.return_to_idle();
        Transition::Applied
    }

    /// Like `stop`, but valid from any phase and also restarts the long-break cycle.
    pub fn reset(&mut self) -> Transition {
        self.focus_streak = 0;
        self.return_to_idle();
        Transition::Applied
    }

    /// Dismiss a finished countdown
    pub fn acknowledge(&mut self) -> Transition {
        if self.phase != TimerPhase::Completed {
            return Transition::Ignored;
        }
        self.return_to_idle();
        Transition::Applied
    }

    /// Select a new focus length; only honoured while idle and only for catalog values
    pub fn change_duration(&mut self, minutes: u32) -> Transition {
        if self.phase != TimerPhase::Idle || !catalog::is_selectable(minutes) {
            return Transition::Ignored;
        }
        self.focus_minutes = minutes;
        self.configuration = TimerConfiguration::focus(minutes);
        self.remaining_seconds = self.configuration.total_seconds();
        Transition::Applied
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != TimerPhase::Running {
            return TickOutcome::Ignored;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            return TickOutcome::Completed(self.complete());
        }
        TickOutcome::Counted {
            remaining_seconds: self.remaining_seconds,
        }
    }

    /// Advance the countdown only if the tick belongs to the current run
    pub fn tick_for(&mut self, generation: u64) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Ignored;
        }
        self.tick()
    }

    fn complete(&mut self) -> Completion {
        let finished = self.configuration.phase_kind;
        self.counter.record(finished);

        let advanced_to = match self.settings.completion_policy {
            CompletionPolicy::RequireAcknowledgement => {
                self.enter(TimerPhase::Completed);
                None
            }
            CompletionPolicy::AutoAdvance => {
                let next = self.next_phase_after(finished);
                self.configuration = TimerConfiguration::new(self.minutes_for(next), next);
                self.remaining_seconds = self.configuration.total_seconds();
                Some(next)
            }
        };

        Completion {
            finished,
            completed_session_count: self.counter.count(),
            advanced_to,
        }
    }

    fn next_phase_after(&mut self, finished: PhaseKind) -> PhaseKind {
        if finished.is_break() {
            return PhaseKind::Focus;
        }
        self.focus_streak += 1;
        if self.focus_streak >= self.settings.sessions_before_long_break.max(1) {
            self.focus_streak = 0;
            PhaseKind::LongBreak
        } else {
            PhaseKind::ShortBreak
        }
    }

    fn minutes_for(&self, kind: PhaseKind) -> u32 {
        match kind {
            PhaseKind::Focus => self.focus_minutes,
            PhaseKind::ShortBreak => self.settings.short_break_minutes,
            PhaseKind::LongBreak => self.settings.long_break_minutes,
        }
    }

    fn return_to_idle(&mut self) {
        self.configuration = TimerConfiguration::focus(self.focus_minutes);
        self.remaining_seconds = self.configuration.total_seconds();
        self.enter(TimerPhase::Idle);
    }

    fn enter(&mut self, phase: TimerPhase) {
        // Any move into or out of Running invalidates outstanding ticks.
        if phase == TimerPhase::Running || self.phase == TimerPhase::Running {
            self.generation = self.generation.wrapping_add(1);
        }
        self.phase = phase;
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn focus_minutes(&self) -> u32 {
        self.focus_minutes
    }

    pub fn configuration(&self) -> TimerConfiguration {
        self.configuration
    }

    pub fn completed_sessions(&self) -> u32 {
        self.counter.count()
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            remaining_seconds: self.remaining_seconds,
            is_running: self.phase == TimerPhase::Running,
            is_paused: self.phase == TimerPhase::Paused,
            completed_session_count: self.counter.count(),
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let total_seconds = self.configuration.total_seconds();
        let state = self.state();
        TimerSnapshot {
            phase: self.phase,
            phase_kind: self.configuration.phase_kind,
            duration_minutes: self.configuration.duration_minutes,
            remaining_seconds: state.remaining_seconds,
            total_seconds,
            is_running: state.is_running,
            is_paused: state.is_paused,
            completed_session_count: state.completed_session_count,
            formatted: format_clock(state.remaining_seconds),
            progress: progress_ratio(state.remaining_seconds, total_seconds),
        }
    }

    pub fn to_persisted(&self) -> PersistedTimer {
        PersistedTimer {
            focus_minutes: self.focus_minutes,
            configuration: self.configuration,
            phase: self.phase,
            state: self.state(),
            focus_streak: self.focus_streak,
            saved_at: Utc::now(),
        }
    }

    /// Rebuild a timer from a saved snapshot. A timer saved while running
    /// comes back paused since no time was counted while it was down.
    pub fn restore(saved: &PersistedTimer, settings: TimerSettings) -> Result<Self, String> {
        if !catalog::is_selectable(saved.focus_minutes) {
            return Err(format!("focus duration {} is not in the catalog", saved.focus_minutes));
        }
        if saved.configuration.duration_minutes == 0 {
            return Err("configured duration must be positive".to_string());
        }
        if saved.configuration.phase_kind == PhaseKind::Focus
            && saved.configuration != TimerConfiguration::focus(saved.focus_minutes)
        {
            return Err(format!(
                "focus configuration of {} minutes disagrees with selected {} minutes",
                saved.configuration.duration_minutes, saved.focus_minutes
            ));
        }

        let total = saved.configuration.total_seconds();
        let state = saved.state;
        if state.remaining_seconds > total {
            return Err(format!(
                "remaining {}s exceeds configured {}s",
                state.remaining_seconds, total
            ));
        }
        if state.is_running && state.is_paused {
            return Err("timer cannot be both running and paused".to_string());
        }
        if state.is_running != (saved.phase == TimerPhase::Running)
            || state.is_paused != (saved.phase == TimerPhase::Paused)
        {
            return Err(format!("flags disagree with phase {}", saved.phase.as_str()));
        }

        let consistent = match saved.phase {
            TimerPhase::Idle => {
                saved.configuration.phase_kind == PhaseKind::Focus && state.remaining_seconds == total
            }
            TimerPhase::Running | TimerPhase::Paused => state.remaining_seconds > 0,
            // Only a finished focus interval stops in Completed, and it always counted
            TimerPhase::Completed => {
                saved.configuration.phase_kind == PhaseKind::Focus
                    && state.remaining_seconds == 0
                    && state.completed_session_count >= 1
            }
        };
        if !consistent {
            return Err(format!(
                "remaining {}s is inconsistent with phase {}",
                state.remaining_seconds,
                saved.phase.as_str()
            ));
        }

        let phase = match saved.phase {
            TimerPhase::Running => TimerPhase::Paused,
            other => other,
        };

        Ok(Self {
            settings,
            focus_minutes: saved.focus_minutes,
            configuration: saved.configuration,
            phase,
            remaining_seconds: state.remaining_seconds,
            counter: SessionCounter::with_count(state.completed_session_count),
            focus_streak: saved.focus_streak,
            generation: 0,
        })
    }
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(catalog::DEFAULT_FOCUS_MINUTES, TimerSettings::default())
    }
}
