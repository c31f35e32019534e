//! Replay progress lines and the final JSON summary.

use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use soar_core::{CommonStats, TaskManager, TaskMode, TaskStats};

/// Simulated seconds since midnight as `HH:MM:SS`.
pub fn format_clock(seconds: f64) -> String {
    let secs = seconds.max(0.0).floor() as u32 % 86_400;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub scenario: String,
    pub generated_at: DateTime<Utc>,
    pub samples: usize,
    pub mode: TaskMode,
    pub active_waypoint: Option<String>,
    pub ordered: TaskStats,
    pub current: TaskStats,
    pub common: CommonStats,
}

impl ReplaySummary {
    pub fn capture(scenario: &str, samples: usize, manager: &TaskManager) -> Self {
        Self {
            scenario: scenario.to_string(),
            generated_at: Utc::now(),
            samples,
            mode: manager.mode(),
            active_waypoint: manager.active_waypoint().map(|w| w.name.clone()),
            ordered: manager.ordered_stats().clone(),
            current: manager.stats().clone(),
            common: manager.common_stats().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soar_core::{NullTaskEvents, Waypoints};
    use std::sync::Arc;

    #[test]
    fn test_clock_format() {
        assert_eq!(format_clock(0.0), "00:00:00");
        assert_eq!(format_clock(3_725.9), "01:02:05");
        assert_eq!(format_clock(86_400.0 + 61.0), "00:01:01");
    }

    #[test]
    fn test_summary_serialises() {
        let manager = TaskManager::new(Arc::new(Waypoints::new()), Box::new(NullTaskEvents));
        let summary = ReplaySummary::capture("empty", 0, &manager);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mode"], "null");
        assert_eq!(json["scenario"], "empty");
        assert!(json["ordered"]["total"]["remaining"]["distance"].is_number());
    }
}
