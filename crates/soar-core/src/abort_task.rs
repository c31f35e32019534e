//! Reachable landing-point search.
//!
//! The candidate list is rebuilt on every sample: landables within glide
//! range are ranked by arrival time over four passes of decreasing
//! strictness. Only the id of the selected waypoint survives a rebuild.

use crate::aircraft::AircraftState;
use crate::behaviour::TaskBehaviour;
use crate::glide::GlidePolar;
use crate::stats::TaskStats;
use crate::task_point::UnorderedTaskPoint;
use crate::visitor::TaskPointVisitor;
use crate::waypoint::{Waypoint, WaypointSource};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Total ordering over f64 for heap keys.
#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Pass {
    safety: bool,
    airports_only: bool,
    final_glide: bool,
}

const PASSES: [Pass; 4] = [
    Pass {
        safety: true,
        airports_only: true,
        final_glide: true,
    },
    Pass {
        safety: true,
        airports_only: false,
        final_glide: true,
    },
    Pass {
        safety: false,
        airports_only: true,
        final_glide: false,
    },
    Pass {
        safety: false,
        airports_only: false,
        final_glide: false,
    },
];

#[derive(Debug, Clone, Default)]
pub struct AbortTask {
    points: Vec<UnorderedTaskPoint>,
    active: usize,
    active_waypoint: Option<u32>,
    landable_reachable: bool,
    landable_in_range: bool,
    stats: TaskStats,
    last_update_time: Option<f64>,
}

impl AbortTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_size(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[UnorderedTaskPoint] {
        &self.points
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_point(&self) -> Option<&UnorderedTaskPoint> {
        self.points.get(self.active)
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        match self.points.get(index) {
            Some(point) => {
                self.active = index;
                self.active_waypoint = Some(point.waypoint().id);
                true
            }
            None => false,
        }
    }

    /// A landable is reachable on final glide with the safety polar.
    pub fn landable_reachable(&self) -> bool {
        self.landable_reachable
    }

    /// A landable would be reachable with the offline altitude boost.
    pub fn landable_in_range(&self) -> bool {
        self.landable_in_range
    }

    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    fn search_radius(state: &AircraftState, safety: &GlidePolar, behaviour: &TaskBehaviour) -> f64 {
        behaviour
            .abort
            .min_search_radius_m
            .max(state.altitude * safety.best_ld())
    }

    fn landables_in_range(
        state: &AircraftState,
        radius: f64,
        waypoints: &dyn WaypointSource,
    ) -> Vec<Waypoint> {
        let mut pool = Vec::new();
        waypoints.visit_within_radius(&state.location, radius, &mut |w| {
            if w.is_landable() {
                pool.push(w.clone());
            }
        });
        pool
    }

    /// Rebuild the ranked landable list. Returns true if any landable made
    /// the list.
    pub fn update_sample(
        &mut self,
        state: &AircraftState,
        polar: &GlidePolar,
        waypoints: &dyn WaypointSource,
        behaviour: &TaskBehaviour,
    ) -> bool {
        let safety = polar.with_mc(behaviour.safety_mc);
        let radius = Self::search_radius(state, &safety, behaviour);
        let mut pool = Self::landables_in_range(state, radius, waypoints);
        let candidates = pool.len();
        let limit = behaviour.abort.max_results;

        self.points.clear();
        self.landable_reachable = false;
        for pass in PASSES {
            if self.points.len() >= limit {
                break;
            }
            let pass_polar = if pass.safety { &safety } else { polar };
            let mut ranked: BinaryHeap<Reverse<(FloatOrd, usize)>> = BinaryHeap::new();
            let mut matched: Vec<UnorderedTaskPoint> = Vec::new();

            pool.retain(|w| {
                if pass.airports_only && !w.is_airport() {
                    return true;
                }
                let point = UnorderedTaskPoint::new(w.clone(), behaviour.safety_height_arrival);
                let solution = pass_polar.solve(state, &point.location(), point.elevation());
                let reachable = if pass.final_glide {
                    solution.is_final_glide()
                } else {
                    solution.is_achievable()
                };
                if !reachable {
                    return true;
                }
                ranked.push(Reverse((FloatOrd(solution.time_elapsed), matched.len())));
                matched.push(point);
                false
            });

            if pass.final_glide && !matched.is_empty() {
                self.landable_reachable = true;
            }
            while let Some(Reverse((_, index))) = ranked.pop() {
                if self.points.len() >= limit {
                    break;
                }
                self.points.push(matched[index].clone());
            }
        }

        let previous = self.active_waypoint;
        self.active = previous
            .and_then(|id| self.points.iter().position(|p| p.waypoint().id == id))
            .unwrap_or(0);
        self.active_waypoint = self.active_point().map(|p| p.waypoint().id);

        tracing::debug!(
            radius,
            candidates,
            results = self.points.len(),
            reachable = self.landable_reachable,
            "abort list rebuilt"
        );
        !self.points.is_empty()
    }

    /// Existence check without rebuilding the list. Returns whether a
    /// landable is reachable.
    pub fn update_offline(
        &mut self,
        state: &AircraftState,
        polar: &GlidePolar,
        waypoints: &dyn WaypointSource,
        behaviour: &TaskBehaviour,
    ) -> bool {
        let safety = polar.with_mc(behaviour.safety_mc);
        let boosted = state.with_altitude_boost(behaviour.abort.offline_altitude_boost_m);
        let radius = Self::search_radius(&boosted, &safety, behaviour);
        let pool = Self::landables_in_range(state, radius, waypoints);

        let arrival = |w: &Waypoint, s: &AircraftState| {
            let point = UnorderedTaskPoint::new(w.clone(), behaviour.safety_height_arrival);
            safety.solve(s, &point.location(), point.elevation())
        };
        self.landable_reachable = pool.iter().any(|w| arrival(w, state).is_final_glide());
        self.landable_in_range = self.landable_reachable
            || pool.iter().any(|w| arrival(w, &boosted).is_final_glide());
        self.landable_reachable
    }

    pub fn update_stats(&mut self, state: &AircraftState, polar: &GlidePolar) {
        let dt = self.last_update_time.map(|t| state.time - t).unwrap_or(0.0);
        self.last_update_time = Some(state.time);
        let point = self.points.get(self.active);
        self.stats
            .update_unordered(point, self.active, state, polar, dt);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn accept(&self, visitor: &mut dyn TaskPointVisitor) {
        for point in &self.points {
            point.accept(visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::waypoint::Waypoints;

    fn here() -> GeoPoint {
        GeoPoint::new(7.0, 51.0)
    }

    fn field(id: u32, bearing: f64, distance: f64) -> Waypoint {
        Waypoint::new(id, format!("F{id}"), here().intermediate_point(bearing, distance), 100.0)
            .landable()
    }

    fn state(altitude: f64) -> AircraftState {
        AircraftState::new(here(), altitude, 0.0)
    }

    #[test]
    fn test_ranked_by_arrival_time() {
        let waypoints: Waypoints = [
            field(1, 0.0, 15_000.0),
            field(2, 90.0, 5_000.0),
            field(3, 180.0, 10_000.0),
        ]
        .into_iter()
        .collect();
        let mut abort = AbortTask::new();
        assert!(abort.update_sample(
            &state(1_500.0),
            &GlidePolar::default(),
            &waypoints,
            &TaskBehaviour::default()
        ));
        let ids: Vec<u32> = abort.points().iter().map(|p| p.waypoint().id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(abort.landable_reachable());
    }

    #[test]
    fn test_airfields_ranked_before_fields() {
        let waypoints: Waypoints = [
            field(1, 0.0, 3_000.0),
            Waypoint::new(2, "Airfield", here().intermediate_point(90.0, 12_000.0), 100.0)
                .airport(),
        ]
        .into_iter()
        .collect();
        let mut abort = AbortTask::new();
        abort.update_sample(
            &state(1_500.0),
            &GlidePolar::default(),
            &waypoints,
            &TaskBehaviour::default(),
        );
        assert_eq!(abort.points()[0].waypoint().id, 2);
        assert_eq!(abort.points()[1].waypoint().id, 1);
    }

    #[test]
    fn test_turnpoints_are_ignored() {
        let waypoints: Waypoints = [Waypoint::new(1, "Church", here(), 100.0)]
            .into_iter()
            .collect();
        let mut abort = AbortTask::new();
        assert!(!abort.update_sample(
            &state(1_500.0),
            &GlidePolar::default(),
            &waypoints,
            &TaskBehaviour::default()
        ));
        assert_eq!(abort.task_size(), 0);
    }

    #[test]
    fn test_offline_check_uses_altitude_boost() {
        let waypoints: Waypoints = [field(1, 0.0, 60_000.0)].into_iter().collect();
        let mut abort = AbortTask::new();
        let reachable = abort.update_offline(
            &state(600.0),
            &GlidePolar::default(),
            &waypoints,
            &TaskBehaviour::default(),
        );
        assert!(!reachable);
        assert!(abort.landable_in_range());
        assert!(abort.is_empty());
    }
}
