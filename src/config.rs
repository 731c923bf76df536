//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::state::{catalog, CompletionPolicy, TimerSettings};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focus-timer")]
#[command(about = "A state-managed HTTP server driving a focus/pomodoro countdown timer")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Focus duration in minutes (5, 10, 15, 25, 30 or 60)
    #[arg(short, long, default_value = "25", value_parser = parse_focus_minutes)]
    pub duration: u32,

    /// What happens when a countdown reaches zero
    #[arg(long, value_enum, default_value_t = CompletionPolicy::RequireAcknowledgement)]
    pub policy: CompletionPolicy,

    /// Short break length in minutes (auto-advance only)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
    pub short_break: u32,

    /// Long break length in minutes (auto-advance only)
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u32).range(1..))]
    pub long_break: u32,

    /// Focus sessions before a long break (auto-advance only)
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..))]
    pub sessions_before_long_break: u32,

    /// Save the timer here on shutdown and restore it on startup
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Milliseconds between ticks; every tick counts as one second
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_millis: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_focus_minutes(s: &str) -> Result<u32, String> {
    let trimmed = s.trim().trim_end_matches('m');
    let minutes: u32 = trimmed
        .parse()
        .map_err(|_| format!("Invalid duration: {}", s))?;

    if catalog::is_selectable(minutes) {
        Ok(minutes)
    } else {
        let allowed: Vec<String> = catalog::all().iter().map(|o| o.minutes.to_string()).collect();
        Err(format!("Duration must be one of: {}", allowed.join(", ")))
    }
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            completion_policy: self.policy,
            short_break_minutes: self.short_break,
            long_break_minutes: self.long_break,
            sessions_before_long_break: self.sessions_before_long_break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["focus-timer"]).unwrap();
        assert_eq!(config.duration, 25);
        assert_eq!(config.policy, CompletionPolicy::RequireAcknowledgement);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.timer_settings(), TimerSettings::default());
        assert!(config.state_file.is_none());
    }

    #[test]
    fn test_policy_and_duration_flags() {
        let config = Config::try_parse_from([
            "focus-timer", "--duration", "60m", "--policy", "auto-advance", "-v",
        ])
        .unwrap();
        assert_eq!(config.duration, 60);
        assert_eq!(config.policy, CompletionPolicy::AutoAdvance);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_duration_outside_catalog_rejected() {
        assert!(Config::try_parse_from(["focus-timer", "--duration", "45"]).is_err());
        assert!(Config::try_parse_from(["focus-timer", "--duration", "abc"]).is_err());
        assert!(Config::try_parse_from(["focus-timer", "--tick-millis", "0"]).is_err());
    }
}
