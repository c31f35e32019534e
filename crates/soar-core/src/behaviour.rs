//! Tunables for task construction, scoring and the abort search.

use crate::error::TaskError;
use crate::task_advance::AdvanceMode;
use serde::{Deserialize, Serialize};

/// Configuration for task behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskBehaviour {
    /// MacCready value (m/s) of the conservative safety polar
    pub safety_mc: f64,
    /// Height margin (m) added to landable elevations
    pub safety_height_arrival: f64,
    /// Minimum task time for assigned area tasks (seconds)
    pub aat_min_time_s: f64,
    /// Hysteresis (m) for floating AAT targets
    pub target_hysteresis_m: f64,
    /// Ground speed (m/s) above which a start triggers a warning; 0 disables
    pub start_max_speed: f64,
    pub advance_mode: AdvanceMode,
    pub abort: AbortBehaviour,
    pub zones: ZoneDefaults,
}

impl Default for TaskBehaviour {
    fn default() -> Self {
        Self {
            safety_mc: 0.5,
            safety_height_arrival: 300.0,
            aat_min_time_s: 3.0 * 3600.0,
            target_hysteresis_m: 1_000.0,
            start_max_speed: 0.0,
            advance_mode: AdvanceMode::Auto,
            abort: AbortBehaviour::default(),
            zones: ZoneDefaults::default(),
        }
    }
}

impl TaskBehaviour {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TaskError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbortBehaviour {
    /// Lower bound of the landable search radius (m)
    pub min_search_radius_m: f64,
    /// Cap on ranked landables
    pub max_results: usize,
    /// Extra altitude (m) for the offline "anything in range" check
    pub offline_altitude_boost_m: f64,
}

impl Default for AbortBehaviour {
    fn default() -> Self {
        Self {
            min_search_radius_m: 50_000.0,
            max_results: 10,
            offline_altitude_boost_m: 10_000.0,
        }
    }
}

/// Default zone dimensions (m) used by the task factories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneDefaults {
    pub start_line_length: f64,
    pub start_cylinder_radius: f64,
    pub start_sector_radius: f64,
    pub fai_sector_radius: f64,
    pub ast_cylinder_radius: f64,
    pub keyhole_inner_radius: f64,
    pub keyhole_radius: f64,
    pub aat_cylinder_radius: f64,
    pub aat_segment_radius: f64,
    /// Opening angle (degrees) of a new AAT segment
    pub aat_segment_angle: f64,
    pub finish_line_length: f64,
    pub finish_cylinder_radius: f64,
    pub finish_sector_radius: f64,
}

impl Default for ZoneDefaults {
    fn default() -> Self {
        Self {
            start_line_length: 2_000.0,
            start_cylinder_radius: 1_000.0,
            start_sector_radius: 1_000.0,
            fai_sector_radius: 10_000.0,
            ast_cylinder_radius: 500.0,
            keyhole_inner_radius: 500.0,
            keyhole_radius: 10_000.0,
            aat_cylinder_radius: 10_000.0,
            aat_segment_radius: 10_000.0,
            aat_segment_angle: 90.0,
            finish_line_length: 1_000.0,
            finish_cylinder_radius: 1_000.0,
            finish_sector_radius: 1_000.0,
        }
    }
}
