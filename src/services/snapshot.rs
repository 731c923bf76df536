//! Timer snapshot persistence

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::state::{FocusTimer, PersistedTimer, TimerSettings};

/// Read a saved timer, `None` if the file does not exist yet
pub async fn load_snapshot(path: &Path) -> Result<Option<PersistedTimer>> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No timer snapshot at {}", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let saved = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse timer snapshot {}", path.display()))?;
    Ok(Some(saved))
}

/// Write a timer snapshot atomically (temp file then rename)
pub async fn save_snapshot(path: &Path, snapshot: &PersistedTimer) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize timer")?;
    let tmp = temp_path(path);
    fs::write(&tmp, json)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;

    info!("Timer snapshot saved to {}", path.display());
    Ok(())
}

/// Restore the timer from `path`, falling back to a fresh one when the
/// file is missing, unreadable or inconsistent
pub async fn restore_or_new(path: &Path, focus_minutes: u32, settings: TimerSettings) -> FocusTimer {
    match load_snapshot(path).await {
        Ok(Some(saved)) => match FocusTimer::restore(&saved, settings) {
            Ok(timer) => {
                info!("Restored timer from {} (saved {})", path.display(), saved.saved_at);
                timer
            }
            Err(e) => {
                warn!("Ignoring inconsistent timer snapshot: {}", e);
                FocusTimer::new(focus_minutes, settings)
            }
        },
        Ok(None) => FocusTimer::new(focus_minutes, settings),
        Err(e) => {
            warn!("Ignoring unreadable timer snapshot: {:#}", e);
            FocusTimer::new(focus_minutes, settings)
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
