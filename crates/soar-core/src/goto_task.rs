//! Direct navigation to a single waypoint.

use crate::aircraft::AircraftState;
use crate::events::{TaskEvents, TaskPointRef};
use crate::glide::GlidePolar;
use crate::stats::TaskStats;
use crate::task_point::UnorderedTaskPoint;
use crate::visitor::TaskPointVisitor;
use crate::waypoint::Waypoint;

/// Distance (m) from the destination counted as arrival.
const ARRIVAL_RADIUS: f64 = 1_000.0;

#[derive(Debug, Clone, Default)]
pub struct GotoTask {
    point: Option<UnorderedTaskPoint>,
    stats: TaskStats,
    last_update_time: Option<f64>,
}

impl GotoTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the destination.
    pub fn do_goto(&mut self, waypoint: Waypoint, safety_height: f64) {
        tracing::info!(waypoint = %waypoint.name, "goto destination set");
        self.point = Some(UnorderedTaskPoint::new(waypoint, safety_height));
        self.stats.reset();
        self.last_update_time = None;
    }

    pub fn clear(&mut self) {
        self.point = None;
        self.stats.reset();
        self.last_update_time = None;
    }

    pub fn point(&self) -> Option<&UnorderedTaskPoint> {
        self.point.as_ref()
    }

    pub fn task_size(&self) -> usize {
        usize::from(self.point.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_none()
    }

    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    /// Reports arrival inside the destination's landing circle.
    /// Returns true while a destination is set.
    pub fn update_sample(
        &mut self,
        state: &AircraftState,
        last: &AircraftState,
        events: &dyn TaskEvents,
    ) -> bool {
        let Some(point) = &self.point else {
            return false;
        };
        let inside = |s: &AircraftState| s.location.distance(&point.location()) <= ARRIVAL_RADIUS;
        if inside(state) && !inside(last) {
            events.transition_enter(TaskPointRef::Unordered(point));
        }
        true
    }

    pub fn update_stats(&mut self, state: &AircraftState, polar: &GlidePolar) {
        let dt = self.last_update_time.map(|t| state.time - t).unwrap_or(0.0);
        self.last_update_time = Some(state.time);
        self.stats
            .update_unordered(self.point.as_ref(), 0, state, polar, dt);
    }

    pub fn reset(&mut self) {
        self.stats.reset();
        self.last_update_time = None;
    }

    pub fn accept(&self, visitor: &mut dyn TaskPointVisitor) {
        if let Some(point) = &self.point {
            point.accept(visitor);
        }
    }
}
