//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::error;

use crate::state::{catalog, catalog::DurationOption, AppState, FocusTimer, TimerSnapshot, Transition};
use super::responses::{ApiResponse, DurationRequest, ErrorResponse, HealthResponse, StatusResponse};

/// Run a timer operation and wrap the outcome in an `ApiResponse`
fn run_operation<F>(
    state: &Arc<AppState>,
    action: &str,
    operation: F,
    applied: &str,
    ignored: &str,
) -> Result<Json<ApiResponse>, StatusCode>
where
    F: FnOnce(&mut FocusTimer) -> Transition,
{
    match state.apply(action, operation) {
        Ok((transition, snapshot)) => {
            let message = if transition.is_applied() { applied } else { ignored };
            Ok(Json(ApiResponse::new(transition, action, message.to_string(), snapshot)))
        }
        Err(e) => {
            error!("Failed to {} timer: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_operation(
        &state,
        "start",
        |t| t.start(),
        "Timer started",
        "Timer can only be started when idle",
    )
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_operation(
        &state,
        "pause",
        |t| t.pause(),
        "Timer paused",
        "Timer is not running",
    )
}

/// Handle POST /timer/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_operation(
        &state,
        "resume",
        |t| t.resume(),
        "Timer resumed",
        "Timer is not paused",
    )
}

/// Handle POST /timer/stop
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_operation(
        &state,
        "stop",
        |t| t.stop(),
        "Timer stopped",
        "Timer is already idle",
    )
}

/// Handle POST /timer/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_operation(
        &state,
        "reset",
        |t| t.reset(),
        "Timer reset",
        "Timer reset",
    )
}

/// Handle POST /timer/acknowledge - dismiss a finished countdown
pub async fn acknowledge_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_operation(
        &state,
        "acknowledge",
        |t| t.acknowledge(),
        "Completion acknowledged",
        "Nothing to acknowledge",
    )
}

/// Handle POST /timer/duration - select a new focus length from the catalog
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ErrorResponse>)> {
    let option = match (&request.id, request.minutes) {
        (Some(id), _) => catalog::find(id),
        (None, Some(minutes)) => catalog::by_minutes(minutes),
        (None, None) => None,
    };

    let Some(option) = option else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Duration must be one of {:?} minutes", catalog_minutes()),
            }),
        ));
    };

    let applied = format!("Duration set to {}", option.label);
    run_operation(
        &state,
        "duration",
        |t| t.change_duration(option.minutes),
        &applied,
        "Duration can only change while the timer is idle",
    )
    .map_err(|status| {
        (
            status,
            Json(ErrorResponse {
                error: "Internal error".to_string(),
            }),
        )
    })
}

/// Handle GET /timer - current snapshot
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerSnapshot>, StatusCode> {
    match state.get_snapshot() {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /durations - the duration catalog
pub async fn durations_handler() -> Json<Vec<DurationOption>> {
    Json(catalog::all().to_vec())
}

/// Handle GET /durations/:id
pub async fn duration_lookup_handler(Path(id): Path<String>) -> Result<Json<DurationOption>, StatusCode> {
    catalog::find(&id)
        .copied()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Handle GET /status - Return current timer and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let (timer, completion_policy) = match state.timer.lock() {
        Ok(controller) => (
            controller.timer.snapshot(),
            controller.timer.settings().completion_policy.as_str().to_string(),
        ),
        Err(e) => {
            error!("Failed to lock timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        completion_policy,
        last_completion: state.get_last_completion(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

fn catalog_minutes() -> Vec<u32> {
    catalog::all().iter().map(|o| o.minutes).collect()
}
