//! Focus Timer - A state-managed HTTP server driving a focus/pomodoro countdown
//!
//! This is the main entry point for the focus-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use focus_timer::{
    api::create_router,
    config::Config,
    services::{restore_or_new, save_snapshot},
    state::{AppState, FocusTimer},
    tasks::completion_notifier_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, duration={}min, policy={}",
          config.host, config.port, config.duration, config.policy.as_str());

    let settings = config.timer_settings();
    let timer = match &config.state_file {
        Some(path) => restore_or_new(path, config.duration, settings).await,
        None => FocusTimer::new(config.duration, settings),
    };

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        timer,
        config.tick_period(),
    ));

    // Report completed countdowns
    let notifier_state = Arc::clone(&state);
    tokio::spawn(async move {
        completion_notifier_task(notifier_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start       - Start a countdown");
    info!("  POST /timer/pause       - Pause the running countdown");
    info!("  POST /timer/resume      - Resume a paused countdown");
    info!("  POST /timer/stop        - Abort and return to idle");
    info!("  POST /timer/reset       - Return to idle and restart the break cycle");
    info!("  POST /timer/acknowledge - Dismiss a completed countdown");
    info!("  POST /timer/duration    - Select focus duration");
    info!("  GET  /timer             - Current timer snapshot");
    info!("  GET  /durations         - Selectable durations");
    info!("  GET  /status            - Timer and server status");
    info!("  GET  /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("{:#}", e),
            }
        }
    }

    if let Some(path) = &config.state_file {
        match state.get_persisted() {
            Ok(snapshot) => {
                if let Err(e) = save_snapshot(path, &snapshot).await {
                    error!("Failed to save timer: {:#}", e);
                }
            }
            Err(e) => error!("Failed to capture timer: {}", e),
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
