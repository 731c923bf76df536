//! Completion notifier background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::{AppState, CompletionEvent, PhaseKind};

/// Message shown when a countdown finishes
pub fn completion_message(event: &CompletionEvent) -> String {
    let headline = match event.phase_kind {
        PhaseKind::Focus => format!(
            "Congratulations! Focus session complete ({} today)",
            event.completed_session_count
        ),
        PhaseKind::ShortBreak | PhaseKind::LongBreak => "Break is over".to_string(),
    };

    match event.advanced_to {
        Some(PhaseKind::Focus) => format!("{}, back to focus", headline),
        Some(next) => format!("{}, starting {}", headline, next.as_str().replace('_', " ")),
        None => headline,
    }
}

/// Background task that reports every completed countdown
pub async fn completion_notifier_task(state: Arc<AppState>) {
    info!("Starting completion notifier task");

    let mut completion_rx = state.subscribe_completions();

    loop {
        match completion_rx.recv().await {
            Ok(event) => {
                info!("{}", completion_message(&event));
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Completion notifier lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Completion channel closed, stopping notifier");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(phase_kind: PhaseKind, advanced_to: Option<PhaseKind>) -> CompletionEvent {
        CompletionEvent {
            phase_kind,
            completed_session_count: 3,
            advanced_to,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_focus_message() {
        let message = completion_message(&event(PhaseKind::Focus, None));
        assert_eq!(message, "Congratulations! Focus session complete (3 today)");
    }

    #[test]
    fn test_auto_advance_messages() {
        let message = completion_message(&event(PhaseKind::Focus, Some(PhaseKind::LongBreak)));
        assert!(message.ends_with("starting long break"));

        let message = completion_message(&event(PhaseKind::ShortBreak, Some(PhaseKind::Focus)));
        assert_eq!(message, "Break is over, back to focus");
    }
}
