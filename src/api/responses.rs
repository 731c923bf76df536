//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{CompletionEvent, TimerSnapshot, Transition};

/// API response structure for timer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `applied` or `ignored`
    pub status: String,
    pub action: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(transition: Transition, action: &str, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: transition.as_str().to_string(),
            action: action.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Body of `POST /timer/duration`; either field selects a catalog entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DurationRequest {
    pub minutes: Option<u32>,
    pub id: Option<String>,
}

/// Error body for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub completion_policy: String,
    pub last_completion: Option<CompletionEvent>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
