//! Periodic tick source for a running countdown

use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::{interval_at, Instant}};
use tracing::{debug, error};

use crate::state::AppState;

/// Handle to a running tick driver, bound to one timer generation
#[derive(Debug)]
pub struct TickHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl TickHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the driver; no further ticks are scheduled
    pub fn cancel(self) {
        self.task.abort();
    }
}

/// Spawn a task that delivers one tick per `period` until the timer leaves
/// the run identified by `generation`
pub fn spawn_tick_driver(state: Arc<AppState>, generation: u64, period: Duration) -> TickHandle {
    let task = tokio::spawn(async move {
        debug!("Tick driver started for generation {}", generation);

        // First tick one full period after start, not immediately
        let mut interval = interval_at(Instant::now() + period, period);

        loop {
            interval.tick().await;

            match state.apply_tick(generation) {
                Ok(outcome) if outcome.keeps_running() => {
                    debug!("Tick applied: {:?}", outcome);
                }
                Ok(outcome) => {
                    debug!("Tick driver for generation {} finished: {:?}", generation, outcome);
                    break;
                }
                Err(e) => {
                    error!("Failed to apply tick: {}", e);
                    break;
                }
            }
        }
    });

    TickHandle { generation, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CompletionPolicy, FocusTimer, PhaseKind, TimerPhase, TimerSettings};
    use tokio::time::sleep;

    fn app_state(minutes: u32, policy: CompletionPolicy) -> Arc<AppState> {
        let settings = TimerSettings {
            completion_policy: policy,
            ..TimerSettings::default()
        };
        let timer = FocusTimer::new(minutes, settings);
        Arc::new(AppState::new(0, "127.0.0.1".to_string(), timer, Duration::from_secs(1)))
    }

    fn remaining(state: &AppState) -> u64 {
        state.get_snapshot().unwrap().remaining_seconds
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let state = app_state(25, CompletionPolicy::RequireAcknowledgement);
        state.apply("start", |t| t.start()).unwrap();

        sleep(Duration::from_millis(3500)).await;
        assert_eq!(remaining(&state), 25 * 60 - 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_pause() {
        let state = app_state(25, CompletionPolicy::RequireAcknowledgement);
        state.apply("start", |t| t.start()).unwrap();
        sleep(Duration::from_millis(2500)).await;

        state.apply("pause", |t| t.pause()).unwrap();
        sleep(Duration::from_secs(10)).await;
        assert_eq!(remaining(&state), 25 * 60 - 2);

        state.apply("resume", |t| t.resume()).unwrap();
        sleep(Duration::from_millis(5500)).await;
        assert_eq!(remaining(&state), 25 * 60 - 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_resets_and_halts_driver() {
        let state = app_state(10, CompletionPolicy::RequireAcknowledgement);
        state.apply("start", |t| t.start()).unwrap();
        sleep(Duration::from_millis(4500)).await;

        state.apply("stop", |t| t.stop()).unwrap();
        sleep(Duration::from_secs(5)).await;

        let snapshot = state.get_snapshot().unwrap();
        assert_eq!(snapshot.phase, TimerPhase::Idle);
        assert_eq!(snapshot.remaining_seconds, 600);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_completion() {
        let state = app_state(5, CompletionPolicy::RequireAcknowledgement);
        let mut completions = state.subscribe_completions();
        state.apply("start", |t| t.start()).unwrap();

        let event = completions.recv().await.unwrap();
        assert_eq!(event.phase_kind, PhaseKind::Focus);
        assert_eq!(event.completed_session_count, 1);

        sleep(Duration::from_secs(30)).await;
        let snapshot = state.get_snapshot().unwrap();
        assert_eq!(snapshot.phase, TimerPhase::Completed);
        assert_eq!(snapshot.remaining_seconds, 0);
        assert!(!state.timer.lock().unwrap().has_driver());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_keeps_ticking_into_break() {
        let state = app_state(5, CompletionPolicy::AutoAdvance);
        let mut completions = state.subscribe_completions();
        state.apply("start", |t| t.start()).unwrap();

        let event = completions.recv().await.unwrap();
        assert_eq!(event.advanced_to, Some(PhaseKind::ShortBreak));

        sleep(Duration::from_millis(10_500)).await;
        let snapshot = state.get_snapshot().unwrap();
        assert_eq!(snapshot.phase_kind, PhaseKind::ShortBreak);
        assert_eq!(snapshot.phase, TimerPhase::Running);
        assert_eq!(snapshot.remaining_seconds, 5 * 60 - 10);
    }
}
