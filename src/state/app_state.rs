//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{CompletionEvent, FocusTimer, PersistedTimer, TickOutcome, TimerSnapshot, Transition};
use crate::tasks::tick_driver::{spawn_tick_driver, TickHandle};

/// Shortest period the tick driver's interval accepts
const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// The timer together with the driver currently feeding it ticks
#[derive(Debug)]
pub struct TimerController {
    pub timer: FocusTimer,
    driver: Option<TickHandle>,
}

impl TimerController {
    fn new(timer: FocusTimer) -> Self {
        Self { timer, driver: None }
    }

    /// Cancel a driver that no longer matches the timer's current run.
    /// Called with the controller locked, so a cancelled driver can never
    /// apply another tick.
    fn cancel_stale_driver(&mut self) {
        let generation = self.timer.generation();
        let stale = self
            .driver
            .as_ref()
            .is_some_and(|driver| driver.generation() != generation || !self.timer.is_running());
        if stale {
            if let Some(driver) = self.driver.take() {
                debug!("Cancelling tick driver for generation {}", driver.generation());
                driver.cancel();
            }
        }
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }
}

/// Main application state that owns the focus timer
#[derive(Debug)]
pub struct AppState {
    /// Timer state machine and its tick driver
    pub timer: Mutex<TimerController>,
    /// Interval between two ticks
    pub tick_period: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    pub last_completion: Mutex<Option<CompletionEvent>>,
    /// Channel for completed countdowns
    pub completion_tx: broadcast::Sender<CompletionEvent>,
    /// Channel for timer snapshots
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Create a new AppState around an existing timer.
    /// A zero tick period is raised to one millisecond.
    pub fn new(port: u16, host: String, timer: FocusTimer, tick_period: Duration) -> Self {
        let tick_period = tick_period.max(MIN_TICK_PERIOD);
        let (completion_tx, _) = broadcast::channel(100);
        let (snapshot_tx, snapshot_rx) = watch::channel(timer.snapshot());

        Self {
            timer: Mutex::new(TimerController::new(timer)),
            tick_period,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            last_completion: Mutex::new(None),
            completion_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Apply a user operation and keep the tick driver in step with the result.
    ///
    /// Leaving `Running` cancels the driver before the lock is released;
    /// entering it spawns a driver bound to the new generation.
    pub fn apply<F>(self: &Arc<Self>, action: &str, operation: F) -> Result<(Transition, TimerSnapshot), String>
    where
        F: FnOnce(&mut FocusTimer) -> Transition,
    {
        let mut controller = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?;

        let transition = operation(&mut controller.timer);
        controller.cancel_stale_driver();

        if controller.timer.is_running() && !controller.has_driver() {
            let generation = controller.timer.generation();
            debug!("Spawning tick driver for generation {}", generation);
            controller.driver = Some(spawn_tick_driver(Arc::clone(self), generation, self.tick_period));
        }

        let snapshot = controller.timer.snapshot();
        drop(controller); // Release the lock early

        if transition.is_applied() {
            info!("Timer {} applied: phase={}, remaining={}",
                  action, snapshot.phase.as_str(), snapshot.formatted);
            self.record_action(action);
            self.publish(snapshot.clone());
        } else {
            info!("Timer {} ignored in phase {}", action, snapshot.phase.as_str());
        }

        Ok((transition, snapshot))
    }

    /// Deliver one tick from the driver owning `generation`
    pub fn apply_tick(&self, generation: u64) -> Result<TickOutcome, String> {
        let mut controller = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?;

        let outcome = controller.timer.tick_for(generation);
        if outcome == TickOutcome::Ignored {
            return Ok(outcome);
        }

        // The driver delivering this tick is finishing on its own; detach it.
        if !outcome.keeps_running()
            && controller.driver.as_ref().is_some_and(|d| d.generation() == generation)
        {
            controller.driver = None;
        }

        let snapshot = controller.timer.snapshot();
        drop(controller);

        if let TickOutcome::Completed(completion) = outcome {
            let event = CompletionEvent {
                phase_kind: completion.finished,
                completed_session_count: completion.completed_session_count,
                advanced_to: completion.advanced_to,
                completed_at: Utc::now(),
            };
            info!("{} interval completed ({} sessions so far)",
                  completion.finished.as_str(), completion.completed_session_count);

            if let Ok(mut last) = self.last_completion.lock() {
                *last = Some(event.clone());
            }
            // No receivers simply means nobody is listening yet
            if self.completion_tx.send(event).is_err() {
                debug!("No completion listeners");
            }
        }

        self.publish(snapshot);
        Ok(outcome)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to send timer snapshot: {}", e);
        }
    }

    /// Get the current timer snapshot
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.timer.lock()
            .map(|controller| controller.timer.snapshot())
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Get the serializable form of the timer
    pub fn get_persisted(&self) -> Result<PersistedTimer, String> {
        self.timer.lock()
            .map(|controller| controller.timer.to_persisted())
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Subscribe to completed countdowns
    pub fn subscribe_completions(&self) -> broadcast::Receiver<CompletionEvent> {
        self.completion_tx.subscribe()
    }

    /// Watch timer snapshots as they change
    pub fn watch_snapshots(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    pub fn get_last_completion(&self) -> Option<CompletionEvent> {
        self.last_completion.lock().ok().and_then(|c| c.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{TimerPhase, TimerSettings};

    fn app_state(minutes: u32) -> Arc<AppState> {
        let timer = FocusTimer::new(minutes, TimerSettings::default());
        Arc::new(AppState::new(0, "127.0.0.1".to_string(), timer, Duration::from_secs(1)))
    }

    #[tokio::test]
    async fn test_start_spawns_driver_and_pause_cancels_it() {
        let state = app_state(25);

        let (transition, snapshot) = state.apply("start", |t| t.start()).unwrap();
        assert_eq!(transition, Transition::Applied);
        assert_eq!(snapshot.phase, TimerPhase::Running);
        assert!(state.timer.lock().unwrap().has_driver());

        state.apply("pause", |t| t.pause()).unwrap();
        assert!(!state.timer.lock().unwrap().has_driver());
        assert_eq!(state.get_last_action().0.as_deref(), Some("pause"));
    }

    #[tokio::test]
    async fn test_ignored_operation_is_not_recorded() {
        let state = app_state(25);
        let (transition, _) = state.apply("resume", |t| t.resume()).unwrap();
        assert_eq!(transition, Transition::Ignored);
        assert_eq!(state.get_last_action(), (None, None));
    }

    #[tokio::test]
    async fn test_stale_tick_after_pause_is_dropped() {
        let state = app_state(25);
        state.apply("start", |t| t.start()).unwrap();
        let generation = state.timer.lock().unwrap().timer.generation();
        state.apply("pause", |t| t.pause()).unwrap();

        assert_eq!(state.apply_tick(generation).unwrap(), TickOutcome::Ignored);
        assert_eq!(state.get_snapshot().unwrap().remaining_seconds, 25 * 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_tick_period_is_clamped() {
        let timer = FocusTimer::new(5, TimerSettings::default());
        let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), timer, Duration::ZERO));
        assert_eq!(state.tick_period, MIN_TICK_PERIOD);

        state.apply("start", |t| t.start()).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let snapshot = state.get_snapshot().unwrap();
        assert_eq!(snapshot.phase, TimerPhase::Running);
        assert!(snapshot.remaining_seconds < 5 * 60);
        assert!(state.timer.lock().unwrap().has_driver());
    }

    #[tokio::test]
    async fn test_completion_is_broadcast() {
        let state = app_state(5);
        let mut completions = state.subscribe_completions();
        state.apply("start", |t| t.start()).unwrap();
        let generation = state.timer.lock().unwrap().timer.generation();

        for _ in 0..300 {
            state.apply_tick(generation).unwrap();
        }

        let event = completions.try_recv().unwrap();
        assert_eq!(event.completed_session_count, 1);
        assert_eq!(event.advanced_to, None);
        assert!(!state.timer.lock().unwrap().has_driver());
        assert_eq!(state.get_last_completion(), Some(event));
        assert_eq!(state.watch_snapshots().borrow().phase, TimerPhase::Completed);
    }
}
