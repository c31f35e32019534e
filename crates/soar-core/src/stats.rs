//! Derived task statistics, recomputed on every update.

use crate::aircraft::AircraftState;
use crate::geo::GeoVector;
use crate::glide::{GlidePolar, GlideResult};
use crate::task_point::UnorderedTaskPoint;
use serde::{Deserialize, Serialize};

/// Low-pass factor applied to incremental speeds.
const SPEED_FILTER: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DistanceStat {
    pub distance: f64,
    /// Average speed (m/s) over the elapsed time
    pub speed: f64,
    /// Filtered speed from the change since the previous update
    pub speed_incremental: f64,
    /// Distance shrinks as progress is made (remaining distance)
    #[serde(skip)]
    counts_down: bool,
    #[serde(skip)]
    last_distance: Option<f64>,
}

impl DistanceStat {
    /// Stat for a distance that grows with progress.
    pub fn increasing() -> Self {
        Self::default()
    }

    /// Stat for a distance that shrinks with progress.
    pub fn decreasing() -> Self {
        Self {
            counts_down: true,
            ..Self::default()
        }
    }

    pub fn set_distance(&mut self, distance: f64) {
        self.distance = distance;
    }

    pub fn calc_speed(&mut self, time_elapsed: f64) {
        self.speed = if time_elapsed > 0.0 {
            self.distance / time_elapsed
        } else {
            0.0
        };
    }

    pub fn calc_incremental_speed(&mut self, dt: f64) {
        if dt > 0.0 {
            if let Some(last) = self.last_distance {
                let mut delta = self.distance - last;
                if self.counts_down {
                    delta = -delta;
                }
                let raw = delta / dt;
                self.speed_incremental += SPEED_FILTER * (raw - self.speed_incremental);
            }
        }
        self.last_distance = Some(self.distance);
    }

    /// Drop the incremental history, e.g. after the task changed.
    pub fn reset_incremental(&mut self) {
        self.last_distance = None;
        self.speed_incremental = 0.0;
    }
}

/// Statistics for a task or one leg of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementStat {
    pub time_elapsed: f64,
    pub time_remaining: f64,
    pub time_planned: f64,
    pub vector_remaining: GeoVector,
    pub vector_planned: GeoVector,
    pub remaining: DistanceStat,
    pub travelled: DistanceStat,
    pub planned: DistanceStat,
    pub solution_remaining: GlideResult,
}

impl Default for ElementStat {
    fn default() -> Self {
        Self {
            time_elapsed: 0.0,
            time_remaining: 0.0,
            time_planned: 0.0,
            vector_remaining: GeoVector::zero(),
            vector_planned: GeoVector::zero(),
            remaining: DistanceStat::decreasing(),
            travelled: DistanceStat::increasing(),
            planned: DistanceStat::increasing(),
            solution_remaining: GlideResult::default(),
        }
    }
}

impl ElementStat {
    /// Update average and incremental speeds. `dt` is the time since the
    /// previous update.
    pub fn calc_speeds(&mut self, dt: f64) {
        self.remaining.calc_speed(self.time_elapsed);
        self.travelled.calc_speed(self.time_elapsed);
        self.planned.calc_speed(self.time_elapsed + self.time_remaining);
        self.remaining.calc_incremental_speed(dt);
        self.travelled.calc_incremental_speed(dt);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: ElementStat,
    pub current_leg: ElementStat,
    pub distance_nominal: f64,
    pub distance_max: f64,
    pub distance_min: f64,
    pub distance_scored: f64,
    pub task_valid: bool,
    pub task_started: bool,
    pub task_finished: bool,
    pub active_index: usize,
    /// Time of the scored start, if any
    pub start_time: Option<f64>,
}

impl TaskStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Stats for a single-destination task (abort or goto).
    pub fn update_unordered(
        &mut self,
        point: Option<&UnorderedTaskPoint>,
        index: usize,
        state: &AircraftState,
        polar: &GlidePolar,
        dt: f64,
    ) {
        let Some(point) = point else {
            self.reset();
            return;
        };
        let solution = polar.solve(state, &point.location(), point.elevation());
        self.task_valid = true;
        self.active_index = index;
        self.distance_nominal = solution.vector.distance;
        self.distance_max = solution.vector.distance;
        self.distance_min = solution.vector.distance;

        let total = &mut self.total;
        total.vector_remaining = solution.vector;
        total.vector_planned = solution.vector;
        total.remaining.set_distance(solution.vector.distance);
        total.planned.set_distance(solution.vector.distance);
        total.solution_remaining = solution;
        total.time_remaining = solution.time_elapsed.max(0.0);
        total.calc_speeds(dt);
        self.current_leg = self.total;
    }
}

/// Figures independent of which task is active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonStats {
    /// Seconds left before the AAT minimum time is reached
    pub aat_time_remaining: Option<f64>,
    /// Speed needed to fly the maximum distance in the AAT minimum time
    pub aat_speed_max: Option<f64>,
    /// Speed needed to fly the minimum distance in the AAT minimum time
    pub aat_speed_min: Option<f64>,
    pub landable_reachable: bool,
    pub landable_in_range: bool,
    /// Waypoint ids of the ordered task in order
    pub task_waypoint_ids: Vec<u32>,
}

impl CommonStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_speed_needs_elapsed_time() {
        let mut s = DistanceStat::increasing();
        s.set_distance(10_000.0);
        s.calc_speed(0.0);
        assert_eq!(s.speed, 0.0);
        s.calc_speed(500.0);
        assert_eq!(s.speed, 20.0);
    }

    #[test]
    fn test_remaining_speed_positive_when_closing() {
        let mut s = DistanceStat::decreasing();
        s.set_distance(10_000.0);
        s.calc_incremental_speed(1.0);
        assert_eq!(s.speed_incremental, 0.0);
        for i in 1..=50 {
            s.set_distance(10_000.0 - 30.0 * i as f64);
            s.calc_incremental_speed(1.0);
        }
        assert!(s.speed_incremental > 25.0 && s.speed_incremental <= 30.0);
    }

    #[test]
    fn test_unordered_stats_follow_glide_solution() {
        let polar = GlidePolar::default();
        let home = crate::waypoint::Waypoint::new(
            1,
            "Home",
            crate::geo::GeoPoint::new(7.0, 51.0),
            100.0,
        );
        let point = UnorderedTaskPoint::new(home, 300.0);
        let state = AircraftState::new(
            crate::geo::GeoPoint::new(7.0, 51.0).intermediate_point(0.0, 10_000.0),
            1_000.0,
            0.0,
        );
        let mut stats = TaskStats::default();
        stats.update_unordered(Some(&point), 0, &state, &polar, 1.0);
        assert!((stats.total.remaining.distance - 10_000.0).abs() < 1.0);
        assert!(stats.total.solution_remaining.is_final_glide());
        assert_eq!(stats.current_leg, stats.total);

        stats.update_unordered(None, 0, &state, &polar, 1.0);
        assert_eq!(stats, TaskStats::default());
    }

    #[test]
    fn test_stats_serialise() {
        let stats = TaskStats::default();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"distance_nominal\""));
        assert!(!json.contains("counts_down"));
    }
}
