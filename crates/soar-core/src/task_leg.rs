//! Per-leg distance accounting.
//!
//! A leg joins a point to its predecessor. Vectors are cached against the
//! exact input pair and recomputed only when an endpoint moves.

use crate::geo::{GeoPoint, GeoVector};
use crate::task_point::ActiveState;

/// Last input/output pair of a vector calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoVectorCache {
    input: Option<(GeoPoint, GeoPoint)>,
    output: GeoVector,
}

impl GeoVectorCache {
    pub fn calc(&mut self, origin: &GeoPoint, destination: &GeoPoint) -> GeoVector {
        if self.input != Some((*origin, *destination)) {
            self.output = GeoVector::between(origin, destination);
            self.input = Some((*origin, *destination));
        }
        self.output
    }

    pub fn is_cached(&self, origin: &GeoPoint, destination: &GeoPoint) -> bool {
        self.input == Some((*origin, *destination))
    }
}

/// Snapshot of the reference locations a leg needs from one of its ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegEndpoint {
    pub state: ActiveState,
    pub has_entered: bool,
    pub remaining: GeoPoint,
    pub travelled: GeoPoint,
    pub max: GeoPoint,
    pub min: GeoPoint,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskLeg {
    memo_remaining: GeoVectorCache,
    memo_travelled: GeoVectorCache,
    memo_planned: GeoVectorCache,
    vector_remaining: GeoVector,
    vector_travelled: GeoVector,
    vector_planned: GeoVector,
    distance_max: f64,
    distance_min: f64,
}

fn heading_only(aircraft: &GeoPoint, destination: &GeoPoint) -> GeoVector {
    GeoVector::new(0.0, aircraft.bearing(destination))
}

impl TaskLeg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Part of this leg still to fly. Legs behind the active one count
    /// nothing; the active leg is measured from the aircraft.
    pub fn update_remaining(
        &mut self,
        origin: Option<&LegEndpoint>,
        destination: &LegEndpoint,
        aircraft: &GeoPoint,
    ) -> GeoVector {
        self.vector_remaining = match (destination.state, origin) {
            (ActiveState::AfterActive, Some(origin)) => self
                .memo_remaining
                .calc(&origin.remaining, &destination.remaining),
            (ActiveState::CurrentActive, Some(_)) => {
                self.memo_remaining.calc(aircraft, &destination.remaining)
            }
            (ActiveState::CurrentActive, None) => heading_only(aircraft, &destination.remaining),
            _ => GeoVector::zero(),
        };
        self.vector_remaining
    }

    /// Part of this leg already flown.
    pub fn update_travelled(
        &mut self,
        origin: Option<&LegEndpoint>,
        destination: &LegEndpoint,
        aircraft: &GeoPoint,
    ) -> GeoVector {
        self.vector_travelled = match (destination.state, origin) {
            (ActiveState::BeforeActive, Some(origin)) => self
                .memo_travelled
                .calc(&origin.travelled, &destination.travelled),
            (ActiveState::CurrentActive, None) => heading_only(aircraft, &destination.remaining),
            (ActiveState::CurrentActive, Some(origin)) if destination.has_entered => self
                .memo_travelled
                .calc(&origin.travelled, &destination.travelled),
            (ActiveState::CurrentActive, Some(origin)) => {
                self.memo_travelled.calc(&origin.travelled, aircraft)
            }
            // advanced manually past a point the aircraft is still heading for
            (ActiveState::AfterActive, Some(origin)) if origin.has_entered => {
                self.memo_travelled.calc(&origin.travelled, aircraft)
            }
            _ => GeoVector::zero(),
        };
        self.vector_travelled
    }

    pub fn update_planned(
        &mut self,
        origin: Option<&LegEndpoint>,
        destination: &LegEndpoint,
    ) -> GeoVector {
        self.vector_planned = match origin {
            Some(origin) => self
                .memo_planned
                .calc(&origin.remaining, &destination.remaining),
            None => GeoVector::zero(),
        };
        self.vector_planned
    }

    /// Distance between the search extremes of both ends.
    pub fn update_extremes(&mut self, origin: Option<&LegEndpoint>, destination: &LegEndpoint) {
        (self.distance_max, self.distance_min) = match origin {
            Some(origin) => (
                origin.max.distance(&destination.max),
                origin.min.distance(&destination.min),
            ),
            None => (0.0, 0.0),
        };
    }

    pub fn vector_remaining(&self) -> GeoVector {
        self.vector_remaining
    }

    pub fn vector_travelled(&self) -> GeoVector {
        self.vector_travelled
    }

    pub fn vector_planned(&self) -> GeoVector {
        self.vector_planned
    }

    pub fn distance_max(&self) -> f64 {
        self.distance_max
    }

    pub fn distance_min(&self) -> f64 {
        self.distance_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(state: ActiveState, location: GeoPoint) -> LegEndpoint {
        LegEndpoint {
            state,
            has_entered: false,
            remaining: location,
            travelled: location,
            max: location,
            min: location,
        }
    }

    #[test]
    fn test_cache_recomputes_only_on_new_input() {
        let a = GeoPoint::new(7.0, 51.0);
        let b = GeoPoint::new(7.5, 51.0);
        let mut cache = GeoVectorCache::default();
        assert!(!cache.is_cached(&a, &b));
        let v = cache.calc(&a, &b);
        assert!(cache.is_cached(&a, &b));
        assert_eq!(cache.calc(&a, &b), v);
        let c = GeoPoint::new(7.6, 51.0);
        assert!(cache.calc(&a, &c).distance > v.distance);
    }

    #[test]
    fn test_first_leg_counts_nothing() {
        let mut leg = TaskLeg::new();
        let here = GeoPoint::new(7.0, 51.0);
        let start = endpoint(ActiveState::CurrentActive, GeoPoint::new(7.1, 51.0));
        assert_eq!(leg.update_remaining(None, &start, &here).distance, 0.0);
        assert_eq!(leg.update_planned(None, &start).distance, 0.0);
        leg.update_extremes(None, &start);
        assert_eq!(leg.distance_max(), 0.0);
    }

    #[test]
    fn test_remaining_by_active_state() {
        let a = GeoPoint::new(7.0, 51.0);
        let b = GeoPoint::new(7.5, 51.0);
        let aircraft = GeoPoint::new(7.25, 51.0);
        let origin = endpoint(ActiveState::BeforeActive, a);
        let mut leg = TaskLeg::new();

        let current = endpoint(ActiveState::CurrentActive, b);
        let partial = leg.update_remaining(Some(&origin), &current, &aircraft).distance;
        assert!((partial - aircraft.distance(&b)).abs() < 1e-6);

        let after = endpoint(ActiveState::AfterActive, b);
        let full = leg.update_remaining(Some(&origin), &after, &aircraft).distance;
        assert!((full - a.distance(&b)).abs() < 1e-6);

        let before = endpoint(ActiveState::BeforeActive, b);
        assert_eq!(leg.update_remaining(Some(&origin), &before, &aircraft).distance, 0.0);
    }

    #[test]
    fn test_travelled_on_active_leg_ends_at_aircraft() {
        let a = GeoPoint::new(7.0, 51.0);
        let b = GeoPoint::new(7.5, 51.0);
        let aircraft = GeoPoint::new(7.2, 51.0);
        let mut leg = TaskLeg::new();
        let travelled = leg
            .update_travelled(
                Some(&endpoint(ActiveState::BeforeActive, a)),
                &endpoint(ActiveState::CurrentActive, b),
                &aircraft,
            )
            .distance;
        assert!((travelled - a.distance(&aircraft)).abs() < 1e-6);
    }
}
