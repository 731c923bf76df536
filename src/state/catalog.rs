//! Catalog of selectable countdown durations

use serde::Serialize;

/// Focus duration used when nothing else has been selected
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
/// Fixed short break length in minutes
pub const SHORT_BREAK_MINUTES: u32 = 5;
/// Fixed long break length in minutes
pub const LONG_BREAK_MINUTES: u32 = 15;
/// Focus completions between two long breaks
pub const SESSIONS_BEFORE_LONG_BREAK: u32 = 4;

/// A selectable countdown duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationOption {
    pub id: &'static str,
    pub label: &'static str,
    pub minutes: u32,
}

const CATALOG: [DurationOption; 6] = [
    DurationOption { id: "5m", label: "5 Minutes", minutes: 5 },
    DurationOption { id: "10m", label: "10 Minutes", minutes: 10 },
    DurationOption { id: "15m", label: "15 Minutes", minutes: 15 },
    DurationOption { id: "25m", label: "25 Minutes", minutes: 25 },
    DurationOption { id: "30m", label: "30 Minutes", minutes: 30 },
    DurationOption { id: "60m", label: "60 Minutes", minutes: 60 },
];

/// All selectable durations, shortest first
pub fn all() -> &'static [DurationOption] {
    &CATALOG
}

/// Look up an entry by its id (e.g. `"25m"`)
pub fn find(id: &str) -> Option<&'static DurationOption> {
    CATALOG.iter().find(|option| option.id.eq_ignore_ascii_case(id.trim()))
}

/// Look up an entry by its length in minutes
pub fn by_minutes(minutes: u32) -> Option<&'static DurationOption> {
    CATALOG.iter().find(|option| option.minutes == minutes)
}

pub fn is_selectable(minutes: u32) -> bool {
    by_minutes(minutes).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contents() {
        let minutes: Vec<u32> = all().iter().map(|o| o.minutes).collect();
        assert_eq!(minutes, vec![5, 10, 15, 25, 30, 60]);
        assert!(all().iter().all(|o| o.minutes > 0));
    }

    #[test]
    fn test_find_by_id() {
        assert_eq!(find("25m").map(|o| o.minutes), Some(25));
        assert_eq!(find(" 60M ").map(|o| o.minutes), Some(60));
        assert!(find("45m").is_none());
        assert!(find("").is_none());
    }

    #[test]
    fn test_by_minutes() {
        assert_eq!(by_minutes(10).map(|o| o.id), Some("10m"));
        assert!(by_minutes(0).is_none());
        assert!(!is_selectable(7));
        assert!(is_selectable(DEFAULT_FOCUS_MINUTES));
    }
}
