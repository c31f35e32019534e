//! Task points: a waypoint snapshot plus a role tag and an observation zone.
//!
//! Ordered points carry the per-point scoring state (samples, entry and exit
//! snapshots, search extremes) and the leg to their predecessor.

use crate::aat::{double_leg_distance, AatIsolineSegment, AatTarget};
use crate::aircraft::AircraftState;
use crate::behaviour::TaskBehaviour;
use crate::geo::GeoPoint;
use crate::projection::TaskProjection;
use crate::search_point::{SearchPoint, SearchPointVector};
use crate::task_leg::{LegEndpoint, TaskLeg};
use crate::visitor::TaskPointVisitor;
use crate::waypoint::Waypoint;
use crate::zone::ObservationZonePoint;
use serde::{Deserialize, Serialize};

/// Cap on interior samples kept per point.
pub const MAX_SAMPLES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveState {
    #[default]
    NotFound,
    BeforeActive,
    CurrentActive,
    AfterActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPointType {
    Unordered,
    Start,
    Ast,
    Aat,
    Finish,
}

/// Role of a point within an ordered task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum PointRole {
    Start,
    /// Fixed turnpoint
    Ast,
    /// Assigned area with a floating target
    Aat(AatTarget),
    Finish,
}

impl PointRole {
    pub fn point_type(&self) -> TaskPointType {
        match self {
            PointRole::Start => TaskPointType::Start,
            PointRole::Ast => TaskPointType::Ast,
            PointRole::Aat(_) => TaskPointType::Aat,
            PointRole::Finish => TaskPointType::Finish,
        }
    }

    /// Entry is scored once; later entries are ignored.
    pub fn score_first_entry(&self) -> bool {
        !matches!(self, PointRole::Aat(_))
    }

    /// The last exit counts, earlier samples are discarded.
    pub fn score_last_exit(&self) -> bool {
        matches!(self, PointRole::Start)
    }

    pub fn is_intermediate(&self) -> bool {
        matches!(self, PointRole::Ast | PointRole::Aat(_))
    }
}

/// Destination of an abort or goto task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnorderedTaskPoint {
    waypoint: Waypoint,
    elevation: f64,
}

impl UnorderedTaskPoint {
    pub fn new(waypoint: Waypoint, safety_height: f64) -> Self {
        let elevation = waypoint.elevation + safety_height;
        Self {
            waypoint,
            elevation,
        }
    }

    pub fn waypoint(&self) -> &Waypoint {
        &self.waypoint
    }

    pub fn location(&self) -> GeoPoint {
        self.waypoint.location
    }

    /// Arrival altitude including the safety margin.
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn accept(&self, visitor: &mut dyn TaskPointVisitor) {
        visitor.visit_unordered(self);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedTaskPoint {
    waypoint: Waypoint,
    elevation: f64,
    role: PointRole,
    zone: ObservationZonePoint,
    state: ActiveState,
    has_previous: bool,
    has_next: bool,
    interior: SearchPointVector,
    boundary: SearchPointVector,
    search_max: Option<SearchPoint>,
    search_min: Option<SearchPoint>,
    entered: Option<AircraftState>,
    exited: Option<AircraftState>,
    /// Latest inside sample after the point was passed; only committed by
    /// a further exit (restart).
    reentry: Option<SearchPoint>,
    leg: TaskLeg,
}

impl OrderedTaskPoint {
    /// The zone is re-centred on the waypoint and an AAT target starts at
    /// the waypoint.
    pub fn new(
        waypoint: Waypoint,
        role: PointRole,
        zone: ObservationZonePoint,
        behaviour: &TaskBehaviour,
    ) -> Self {
        Self::with_safety_height(waypoint, role, zone, behaviour.safety_height_arrival)
    }

    fn with_safety_height(
        waypoint: Waypoint,
        role: PointRole,
        zone: ObservationZonePoint,
        safety_height: f64,
    ) -> Self {
        let zone = ObservationZonePoint::new(waypoint.location, *zone.shape());
        let role = match role {
            PointRole::Aat(target) => PointRole::Aat(AatTarget {
                location: waypoint.location,
                locked: target.locked,
            }),
            other => other,
        };
        Self {
            elevation: waypoint.elevation + safety_height,
            waypoint,
            role,
            zone,
            state: ActiveState::NotFound,
            has_previous: false,
            has_next: false,
            interior: SearchPointVector::new(),
            boundary: SearchPointVector::new(),
            search_max: None,
            search_min: None,
            entered: None,
            exited: None,
            reentry: None,
            leg: TaskLeg::new(),
        }
    }

    /// Same role and zone shape around a different waypoint.
    pub fn relocated(&self, waypoint: Waypoint) -> Self {
        let safety_height = self.elevation - self.waypoint.elevation;
        Self::with_safety_height(waypoint, self.role, self.zone, safety_height)
    }

    pub fn waypoint(&self) -> &Waypoint {
        &self.waypoint
    }

    pub fn name(&self) -> &str {
        &self.waypoint.name
    }

    pub fn location(&self) -> GeoPoint {
        self.waypoint.location
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn role(&self) -> &PointRole {
        &self.role
    }

    pub fn point_type(&self) -> TaskPointType {
        self.role.point_type()
    }

    pub fn zone(&self) -> &ObservationZonePoint {
        &self.zone
    }

    pub fn zone_mut(&mut self) -> &mut ObservationZonePoint {
        &mut self.zone
    }

    pub fn active_state(&self) -> ActiveState {
        self.state
    }

    pub fn set_active_state(&mut self, state: ActiveState) {
        self.state = state;
    }

    pub fn has_previous(&self) -> bool {
        self.has_previous
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Re-link to the neighbours and orient the zone from their locations.
    pub fn set_neighbours(&mut self, previous: Option<&GeoPoint>, next: Option<&GeoPoint>) {
        self.has_previous = previous.is_some();
        self.has_next = next.is_some();
        self.zone.set_legs(previous, next);
    }

    pub fn leg(&self) -> &TaskLeg {
        &self.leg
    }

    pub fn leg_mut(&mut self) -> &mut TaskLeg {
        &mut self.leg
    }

    pub fn is_in_sector(&self, state: &AircraftState) -> bool {
        self.zone.is_in_sector(state)
    }

    pub fn transition_enter(&self, now: &AircraftState, last: &AircraftState) -> bool {
        self.zone.transition_enter(now, last)
    }

    pub fn transition_exit(&self, now: &AircraftState, last: &AircraftState) -> bool {
        self.zone.transition_exit(now, last)
    }

    pub fn has_entered(&self) -> bool {
        self.entered.is_some()
    }

    pub fn has_exited(&self) -> bool {
        self.exited.is_some()
    }

    pub fn state_entered(&self) -> Option<&AircraftState> {
        self.entered.as_ref()
    }

    pub fn state_exited(&self) -> Option<&AircraftState> {
        self.exited.as_ref()
    }

    /// Record an entry. Returns true if the snapshot was stored.
    pub fn enter(&mut self, state: &AircraftState) -> bool {
        if self.role.score_first_entry() && self.entered.is_some() {
            return false;
        }
        self.entered = Some(*state);
        true
    }

    /// Record an exit; a start keeps only its last interior sample.
    pub fn exit(&mut self, state: &AircraftState) {
        self.exited = Some(*state);
        if self.role.score_last_exit() {
            match self.reentry.take() {
                Some(sample) => self.interior.replace_with(sample),
                None => self.interior.keep_last(),
            }
        }
    }

    /// Add a sample when the aircraft is inside the zone and this point is
    /// neither ahead of the active one nor already passed and exited.
    /// Returns true if stored.
    pub fn update_sample(&mut self, state: &AircraftState, projection: &TaskProjection) -> bool {
        if self.state == ActiveState::AfterActive || !self.zone.is_in_sector(state) {
            return false;
        }
        if self.state == ActiveState::BeforeActive && self.has_exited() {
            if self.role.score_last_exit() {
                self.reentry = Some(SearchPoint::new(state.location, projection, true));
            }
            return false;
        }
        self.interior.push_location(state.location, projection, true);
        self.interior.prune_interior();
        self.interior.thin_to(MAX_SAMPLES);
        true
    }

    pub fn has_sampled(&self) -> bool {
        !self.interior.is_empty()
    }

    pub fn interior(&self) -> &SearchPointVector {
        &self.interior
    }

    pub fn boundary(&self) -> &SearchPointVector {
        &self.boundary
    }

    /// Rebuild the sampled zone outline against `projection`.
    pub fn update_boundary(&mut self, projection: &TaskProjection) {
        let mut boundary = SearchPointVector::new();
        for location in self.zone.boundary_points() {
            boundary.push_location(location, projection, false);
        }
        boundary.prune_interior();
        self.boundary = boundary;
    }

    /// Bring every projected polygon up to the projection's epoch.
    pub fn update_projection(&mut self, projection: &TaskProjection) -> bool {
        let mut changed = self.interior.ensure_projected(projection);
        changed |= self.boundary.ensure_projected(projection);
        if changed {
            for p in self
                .search_max
                .iter_mut()
                .chain(self.search_min.iter_mut())
                .chain(self.reentry.iter_mut())
            {
                p.project(projection);
            }
        }
        changed
    }

    /// Polygon used by the max/min distance search: what was achieved for
    /// points already passed, the zone outline otherwise.
    pub fn search_points(&self) -> &SearchPointVector {
        if self.state == ActiveState::BeforeActive && self.has_sampled() {
            &self.interior
        } else {
            &self.boundary
        }
    }

    pub fn set_search_max(&mut self, point: SearchPoint) {
        self.search_max = Some(point);
    }

    pub fn set_search_min(&mut self, point: SearchPoint) {
        self.search_min = Some(point);
    }

    /// Where the rest of the task is measured from.
    pub fn location_remaining(&self) -> GeoPoint {
        match self.role {
            PointRole::Aat(target) => target.location,
            _ => self.waypoint.location,
        }
    }

    /// Best achieved location for points already passed.
    pub fn location_travelled(&self) -> GeoPoint {
        match (self.state, self.search_max) {
            (ActiveState::BeforeActive, Some(max)) if self.has_sampled() => max.location(),
            _ => self.location_remaining(),
        }
    }

    pub fn location_max(&self) -> GeoPoint {
        self.search_max
            .map(|p| p.location())
            .unwrap_or_else(|| self.location_remaining())
    }

    pub fn location_min(&self) -> GeoPoint {
        self.search_min
            .map(|p| p.location())
            .unwrap_or_else(|| self.location_remaining())
    }

    pub fn endpoint(&self) -> LegEndpoint {
        LegEndpoint {
            state: self.state,
            has_entered: self.has_entered(),
            remaining: self.location_remaining(),
            travelled: self.location_travelled(),
            max: self.location_max(),
            min: self.location_min(),
        }
    }

    /// Forget samples and transitions. AAT targets return to the waypoint.
    pub fn reset(&mut self) {
        self.interior.clear();
        self.search_max = None;
        self.search_min = None;
        self.entered = None;
        self.exited = None;
        self.reentry = None;
        if let PointRole::Aat(target) = &mut self.role {
            target.location = self.waypoint.location;
        }
    }

    pub fn accept(&self, visitor: &mut dyn TaskPointVisitor) {
        match self.role {
            PointRole::Start => visitor.visit_start(self),
            PointRole::Ast => visitor.visit_ast(self),
            PointRole::Aat(_) => visitor.visit_aat(self),
            PointRole::Finish => visitor.visit_finish(self),
        }
    }

    pub fn target(&self) -> Option<&AatTarget> {
        match &self.role {
            PointRole::Aat(target) => Some(target),
            _ => None,
        }
    }

    fn target_mut(&mut self) -> Option<&mut AatTarget> {
        match &mut self.role {
            PointRole::Aat(target) => Some(target),
            _ => None,
        }
    }

    /// Move the target; only unlocked targets inside the zone are accepted.
    pub fn set_target(&mut self, location: GeoPoint) -> bool {
        let inside = self.zone.contains(&location);
        match self.target_mut() {
            Some(target) if !target.locked && inside => {
                target.location = location;
                true
            }
            _ => false,
        }
    }

    /// Place the target between the minimum (0) and maximum (1) distance
    /// search points.
    pub fn set_target_range(&mut self, range: f64) -> bool {
        let location = self
            .location_min()
            .interpolate(&self.location_max(), range.clamp(0.0, 1.0));
        match self.target_mut() {
            Some(target) if !target.locked => {
                target.location = location;
                true
            }
            _ => false,
        }
    }

    pub fn set_target_locked(&mut self, locked: bool) -> bool {
        match self.target_mut() {
            Some(target) => {
                target.locked = locked;
                true
            }
            None => false,
        }
    }

    /// Hysteresis test: the aircraft is not more than `threshold` short of
    /// the target in double-leg terms.
    pub fn close_to_target(
        &self,
        state: &AircraftState,
        previous: &GeoPoint,
        next: &GeoPoint,
        threshold: f64,
    ) -> bool {
        match self.target() {
            Some(target) => {
                double_leg_distance(previous, &state.location, next)
                    - double_leg_distance(previous, &target.location, next)
                    > -threshold
            }
            None => false,
        }
    }

    /// Float the target of the current AAT point towards the aircraft.
    /// Returns true if the target moved.
    pub fn update_target(
        &mut self,
        state: &AircraftState,
        previous: &GeoPoint,
        next: &GeoPoint,
        threshold: f64,
    ) -> bool {
        if self.state != ActiveState::CurrentActive || !self.zone.is_in_sector(state) {
            return false;
        }
        if !self.close_to_target(state, previous, next, threshold) {
            return false;
        }
        let via_aircraft = double_leg_distance(previous, &state.location, next);
        match self.target_mut() {
            Some(target)
                if !target.locked
                    && via_aircraft > double_leg_distance(previous, &target.location, next) =>
            {
                target.location = state.location;
                true
            }
            _ => false,
        }
    }

    pub fn isoline(
        &self,
        previous: &GeoPoint,
        next: &GeoPoint,
        projection: &TaskProjection,
    ) -> Option<AatIsolineSegment> {
        let target = self.target()?;
        Some(AatIsolineSegment::new(
            previous,
            &target.location,
            next,
            &self.zone,
            projection,
        ))
    }
}
