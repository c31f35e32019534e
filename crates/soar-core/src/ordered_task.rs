//! The ordered task: turnpoint sequence, active point and scoring.

use crate::aat::AatIsolineSegment;
use crate::aircraft::AircraftState;
use crate::behaviour::TaskBehaviour;
use crate::error::TaskValidationError;
use crate::events::{TaskEvents, TaskPointRef};
use crate::factory::FactoryKind;
use crate::geo::{GeoPoint, GeoVector};
use crate::glide::GlidePolar;
use crate::projection::TaskProjection;
use crate::search_point::SearchPoint;
use crate::stats::TaskStats;
use crate::task_advance::TaskAdvance;
use crate::task_leg::LegEndpoint;
use crate::task_point::{ActiveState, OrderedTaskPoint, PointRole};
use crate::visitor::TaskPointVisitor;

#[derive(Debug, Clone)]
pub struct OrderedTask {
    points: Vec<OrderedTaskPoint>,
    optional_starts: Vec<OrderedTaskPoint>,
    active: usize,
    projection: TaskProjection,
    advance: TaskAdvance,
    behaviour: TaskBehaviour,
    factory_kind: FactoryKind,
    stats: TaskStats,
    last_update_time: Option<f64>,
}

impl Default for OrderedTask {
    fn default() -> Self {
        Self::new(TaskBehaviour::default())
    }
}

impl OrderedTask {
    pub fn new(behaviour: TaskBehaviour) -> Self {
        Self {
            points: Vec::new(),
            optional_starts: Vec::new(),
            active: 0,
            projection: TaskProjection::new(),
            advance: TaskAdvance::new(behaviour.advance_mode),
            behaviour,
            factory_kind: FactoryKind::default(),
            stats: TaskStats::default(),
            last_update_time: None,
        }
    }

    pub fn with_factory(mut self, kind: FactoryKind) -> Self {
        self.factory_kind = kind;
        self
    }

    pub fn task_size(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[OrderedTaskPoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&OrderedTaskPoint> {
        self.points.get(index)
    }

    pub fn optional_starts(&self) -> &[OrderedTaskPoint] {
        &self.optional_starts
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_point(&self) -> Option<&OrderedTaskPoint> {
        self.points.get(self.active)
    }

    pub fn projection(&self) -> &TaskProjection {
        &self.projection
    }

    pub fn behaviour(&self) -> &TaskBehaviour {
        &self.behaviour
    }

    pub fn set_behaviour(&mut self, behaviour: TaskBehaviour) {
        self.advance.set_mode(behaviour.advance_mode);
        self.behaviour = behaviour;
    }

    pub fn advance(&self) -> &TaskAdvance {
        &self.advance
    }

    pub fn advance_mut(&mut self) -> &mut TaskAdvance {
        &mut self.advance
    }

    pub fn factory_kind(&self) -> FactoryKind {
        self.factory_kind
    }

    pub fn set_factory_kind(&mut self, kind: FactoryKind) {
        self.factory_kind = kind;
    }

    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    pub fn has_start(&self) -> bool {
        self.points
            .first()
            .is_some_and(|p| matches!(p.role(), PointRole::Start))
    }

    pub fn has_finish(&self) -> bool {
        self.points.len() > 1
            && self
                .points
                .last()
                .is_some_and(|p| matches!(p.role(), PointRole::Finish))
    }

    pub fn has_targets(&self) -> bool {
        self.points
            .iter()
            .any(|p| matches!(p.role(), PointRole::Aat(_)))
    }

    pub fn task_started(&self) -> bool {
        self.points.first().is_some_and(|p| p.has_exited())
    }

    pub fn task_finished(&self) -> bool {
        self.has_finish() && self.points.last().is_some_and(|p| p.has_entered())
    }

    // ---- structural edits -------------------------------------------------

    pub fn append(&mut self, point: OrderedTaskPoint) -> bool {
        self.points.push(point);
        self.update_geometry();
        true
    }

    pub fn insert(&mut self, point: OrderedTaskPoint, position: usize) -> bool {
        if position > self.points.len() {
            return false;
        }
        if position < self.points.len() && self.active >= position {
            self.active += 1;
        }
        self.points.insert(position, point);
        self.update_geometry();
        true
    }

    pub fn replace(&mut self, point: OrderedTaskPoint, position: usize) -> bool {
        match self.points.get_mut(position) {
            Some(slot) => {
                *slot = point;
                self.update_geometry();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, position: usize) -> bool {
        if position >= self.points.len() {
            return false;
        }
        self.points.remove(position);
        if self.active > position || (self.active > 0 && self.active >= self.points.len()) {
            self.active -= 1;
        }
        self.update_geometry();
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.optional_starts.clear();
        self.active = 0;
        self.stats.reset();
        self.last_update_time = None;
    }

    /// Candidate start that may be swapped in before the task starts.
    pub fn add_optional_start(&mut self, point: OrderedTaskPoint) -> bool {
        if !matches!(point.role(), PointRole::Start) {
            tracing::warn!(point = point.name(), "optional start must be a start point");
            return false;
        }
        self.optional_starts.push(point);
        self.update_geometry();
        true
    }

    /// Swap optional start `index` with the current start.
    pub fn select_optional_start(&mut self, index: usize) -> bool {
        let (Some(candidate), Some(start)) =
            (self.optional_starts.get_mut(index), self.points.first_mut())
        else {
            return false;
        };
        std::mem::swap(candidate, start);
        tracing::info!(start = self.points[0].name(), "optional start selected");
        self.update_geometry();
        true
    }

    /// Re-link neighbours, re-orient zones and rebuild the projection and
    /// every polygon that depends on it.
    fn update_geometry(&mut self) {
        let locations: Vec<GeoPoint> = self.points.iter().map(|p| p.location()).collect();
        for (i, point) in self.points.iter_mut().enumerate() {
            let previous = i.checked_sub(1).and_then(|j| locations.get(j));
            point.set_neighbours(previous, locations.get(i + 1));
        }
        for start in &mut self.optional_starts {
            start.set_neighbours(None, locations.get(1));
        }

        let Some(first) = locations.first() else {
            return;
        };
        self.projection.reset(first);
        for point in self.points.iter().chain(self.optional_starts.iter()) {
            self.projection.scan_location(&point.location());
            for location in point.zone().boundary_points() {
                self.projection.scan_location(&location);
            }
        }
        if self.projection.update_fast() {
            tracing::debug!(epoch = ?self.projection.epoch(), "task projection rebuilt");
        }

        let projection = &self.projection;
        for point in self.points.iter_mut().chain(self.optional_starts.iter_mut()) {
            point.update_boundary(projection);
            point.update_projection(projection);
        }
        self.scan_active();
    }

    // ---- validity ---------------------------------------------------------

    pub fn validation_errors(&self) -> Vec<TaskValidationError> {
        let mut errors = Vec::new();
        let n = self.points.len();
        if n == 0 {
            return errors;
        }
        if !matches!(self.points[0].role(), PointRole::Start) {
            errors.push(TaskValidationError::NotStart(0));
        }
        if n > 1 && !matches!(self.points[n - 1].role(), PointRole::Finish) {
            errors.push(TaskValidationError::NotFinish(n - 1));
        }
        for (i, point) in self.points.iter().enumerate().take(n.saturating_sub(1)).skip(1) {
            if !point.role().is_intermediate() {
                errors.push(TaskValidationError::MisplacedEndpoint(i));
            }
        }
        errors
    }

    /// Structural check; an empty task is valid.
    pub fn check_task(&self) -> bool {
        self.validation_errors().is_empty()
    }

    // ---- active point -----------------------------------------------------

    /// Label points relative to the active index.
    pub fn scan_active(&mut self) {
        let active = self.active;
        let mut previous: Option<ActiveState> = None;
        for (i, point) in self.points.iter_mut().enumerate() {
            let state = if i == active {
                ActiveState::CurrentActive
            } else if matches!(
                previous,
                Some(ActiveState::CurrentActive | ActiveState::AfterActive)
            ) {
                ActiveState::AfterActive
            } else {
                ActiveState::BeforeActive
            };
            point.set_active_state(state);
            previous = Some(state);
        }
        let start_state = self
            .points
            .first()
            .map(|p| p.active_state())
            .unwrap_or_default();
        for start in &mut self.optional_starts {
            start.set_active_state(start_state);
        }
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.points.len() {
            return false;
        }
        if index != self.active {
            tracing::info!(from = self.active, to = index, "active turnpoint set");
            self.active = index;
        }
        self.scan_active();
        true
    }

    // ---- flight -----------------------------------------------------------

    /// Feed one navigation sample. Returns true if a transition changed the
    /// scoring state.
    pub fn update_sample(
        &mut self,
        state: &AircraftState,
        last: &AircraftState,
        events: &dyn TaskEvents,
    ) -> bool {
        if self.points.is_empty() {
            return false;
        }
        self.scan_active();

        let projection = &self.projection;
        for point in &mut self.points {
            point.update_sample(state, projection);
        }

        if self.active == 0 && !self.task_started() {
            self.check_optional_starts(state, last);
        }

        let last_started = self.task_started();
        let last_finished = self.task_finished();
        let active_before = self.active;
        let lo = active_before.saturating_sub(1);
        let hi = active_before.min(self.points.len() - 1);
        let mut full_update = false;
        let mut start_exited = false;

        for i in lo..=hi {
            let entered = self.points[i].transition_enter(state, last);
            let exited = self.points[i].transition_exit(state, last);
            if entered {
                self.points[i].enter(state);
                events.transition_enter(TaskPointRef::Ordered(&self.points[i]));
                full_update = true;
            }
            if exited {
                self.points[i].exit(state);
                events.transition_exit(TaskPointRef::Ordered(&self.points[i]));
                full_update = true;
                if i == 0 {
                    start_exited = true;
                }
            }

            if i == active_before
                && self
                    .advance
                    .ready_to_advance(&self.points[i], state, entered, exited)
            {
                self.advance.advanced();
                if i + 1 < self.points.len() {
                    self.active = i + 1;
                    self.scan_active();
                    events.active_advanced(TaskPointRef::Ordered(&self.points[i + 1]), i + 1);
                    tracing::info!(
                        index = i + 1,
                        point = self.points[i + 1].name(),
                        "turnpoint advanced"
                    );
                }
            }
        }

        if start_exited {
            self.stats.start_time = Some(state.time);
            let limit = self.behaviour.start_max_speed;
            if limit > 0.0 && state.ground_speed > limit {
                tracing::warn!(speed = state.ground_speed, limit, "start above speed limit");
                events.warning_start_speed();
            }
            if last_started {
                tracing::info!(time = state.time, "task restarted");
            } else {
                tracing::info!(time = state.time, "task started");
            }
            events.task_start();
        }

        self.update_active_target(state);

        self.stats.task_started = self.task_started();
        self.stats.task_finished = self.task_finished();
        self.stats.active_index = self.active;
        if self.stats.task_finished && !last_finished {
            tracing::info!(time = state.time, "task finished");
            events.task_finish();
        }
        full_update
    }

    fn check_optional_starts(&mut self, state: &AircraftState, last: &AircraftState) {
        let exited = self
            .optional_starts
            .iter()
            .position(|p| p.transition_exit(state, last));
        if let Some(index) = exited {
            self.select_optional_start(index);
        }
    }

    fn update_active_target(&mut self, state: &AircraftState) {
        let i = self.active;
        let (Some(previous), Some(next)) = (
            i.checked_sub(1)
                .and_then(|j| self.points.get(j))
                .map(|p| p.location_travelled()),
            self.points.get(i + 1).map(|p| p.location_remaining()),
        ) else {
            return;
        };
        let threshold = self.behaviour.target_hysteresis_m;
        if let Some(point) = self.points.get_mut(i) {
            if point.update_target(state, &previous, &next, threshold) {
                tracing::debug!(point = point.name(), "target moved to aircraft");
            }
        }
    }

    // ---- distances --------------------------------------------------------

    fn endpoints(&self) -> Vec<LegEndpoint> {
        self.points.iter().map(|p| p.endpoint()).collect()
    }

    pub fn scan_distance_remaining(&mut self, aircraft: &GeoPoint) -> f64 {
        let endpoints = self.endpoints();
        let mut total = 0.0;
        for (i, point) in self.points.iter_mut().enumerate() {
            let origin = i.checked_sub(1).map(|j| &endpoints[j]);
            total += point
                .leg_mut()
                .update_remaining(origin, &endpoints[i], aircraft)
                .distance;
        }
        total
    }

    pub fn scan_distance_travelled(&mut self, aircraft: &GeoPoint) -> f64 {
        let endpoints = self.endpoints();
        let mut total = 0.0;
        for (i, point) in self.points.iter_mut().enumerate() {
            let origin = i.checked_sub(1).map(|j| &endpoints[j]);
            total += point
                .leg_mut()
                .update_travelled(origin, &endpoints[i], aircraft)
                .distance;
        }
        total
    }

    pub fn scan_distance_planned(&mut self) -> f64 {
        let endpoints = self.endpoints();
        let mut total = 0.0;
        for (i, point) in self.points.iter_mut().enumerate() {
            let origin = i.checked_sub(1).map(|j| &endpoints[j]);
            total += point
                .leg_mut()
                .update_planned(origin, &endpoints[i])
                .distance;
        }
        total
    }

    /// Travelled distance less the start and finish zone allowances.
    pub fn scan_distance_scored(&mut self, aircraft: &GeoPoint) -> f64 {
        let travelled = self.scan_distance_travelled(aircraft);
        let mut adjustment = 0.0;
        if self.task_started() {
            adjustment += self.points[0].zone().score_adjustment();
        }
        if self.task_finished() {
            if let Some(finish) = self.points.last() {
                adjustment += finish.zone().score_adjustment();
            }
        }
        (travelled - adjustment).max(0.0)
    }

    pub fn scan_distance_max(&mut self) -> f64 {
        self.scan_distance_extremes().0
    }

    pub fn scan_distance_min(&mut self) -> f64 {
        self.scan_distance_extremes().1
    }

    /// Longest and shortest paths through the search polygons. Chosen
    /// points are stored on each task point.
    pub fn scan_distance_extremes(&mut self) -> (f64, f64) {
        if self.points.is_empty() {
            return (0.0, 0.0);
        }
        let projection = &self.projection;
        for point in &mut self.points {
            point.update_projection(projection);
        }
        let polygons = self.search_polygons();
        let max_path = optimal_path(&polygons, true);
        let min_path = optimal_path(&polygons, false);
        for ((point, max), min) in self.points.iter_mut().zip(max_path).zip(min_path) {
            point.set_search_max(max);
            point.set_search_min(min);
        }

        let endpoints = self.endpoints();
        let (mut d_max, mut d_min) = (0.0, 0.0);
        for (i, point) in self.points.iter_mut().enumerate() {
            let origin = i.checked_sub(1).map(|j| &endpoints[j]);
            let leg = point.leg_mut();
            leg.update_extremes(origin, &endpoints[i]);
            d_max += leg.distance_max();
            d_min += leg.distance_min();
        }
        (d_max, d_min)
    }

    fn search_polygons(&self) -> Vec<Vec<SearchPoint>> {
        self.points
            .iter()
            .map(|p| {
                let polygon = p.search_points();
                if polygon.is_empty() {
                    vec![SearchPoint::new(p.location_remaining(), &self.projection, false)]
                } else {
                    polygon.points().to_vec()
                }
            })
            .collect()
    }

    // ---- statistics -------------------------------------------------------

    /// Recompute [`TaskStats`] for the current aircraft state.
    pub fn update_stats(&mut self, state: &AircraftState, polar: &GlidePolar) {
        self.stats.task_valid = self.check_task();
        self.stats.active_index = self.active;
        self.stats.task_started = self.task_started();
        self.stats.task_finished = self.task_finished();
        let dt = self
            .last_update_time
            .map(|t| state.time - t)
            .unwrap_or(0.0);
        self.last_update_time = Some(state.time);

        if self.points.is_empty() {
            self.stats.reset();
            self.stats.task_valid = true;
            return;
        }

        let aircraft = state.location;
        let (distance_max, distance_min) = self.scan_distance_extremes();
        let remaining = self.scan_distance_remaining(&aircraft);
        let travelled = self.scan_distance_travelled(&aircraft);
        let planned = self.scan_distance_planned();
        let scored = self.scan_distance_scored(&aircraft);

        let elapsed = match (self.stats.task_started, self.stats.start_time) {
            (true, Some(start)) => (state.time - start).max(0.0),
            _ => 0.0,
        };
        let active = self.active.min(self.points.len() - 1);
        let finish_elevation = self
            .points
            .last()
            .map(|p| p.elevation())
            .unwrap_or_default();
        let active_point = &self.points[active];
        let leg = active_point.leg();
        let leg_solution = polar.solve(state, &active_point.location_remaining(), active_point.elevation());
        let leg_started = active
            .checked_sub(1)
            .and_then(|j| self.points.get(j))
            .and_then(|p| p.state_exited().or(p.state_entered()))
            .map(|s| (state.time - s.time).max(0.0))
            .unwrap_or(elapsed);

        let total_vector = GeoVector::new(remaining, leg_solution.vector.bearing);
        let total_solution = polar.solve_vector(state, total_vector, finish_elevation);
        let speed = polar.speed_to_fly();

        let total = &mut self.stats.total;
        total.time_elapsed = elapsed;
        total.vector_remaining = total_vector;
        total.vector_planned = GeoVector::new(
            planned,
            self.points
                .get(1)
                .map(|p| p.leg().vector_planned().bearing)
                .unwrap_or_default(),
        );
        total.remaining.set_distance(remaining);
        total.travelled.set_distance(travelled);
        total.planned.set_distance(planned);
        total.solution_remaining = total_solution;
        total.time_remaining = total_solution.time_elapsed.max(0.0);
        total.time_planned = if speed > 0.0 { planned / speed } else { 0.0 };
        total.calc_speeds(dt);

        let current = &mut self.stats.current_leg;
        current.time_elapsed = leg_started;
        current.vector_remaining = leg_solution.vector;
        current.vector_planned = leg.vector_planned();
        current.remaining.set_distance(leg_solution.vector.distance);
        current.travelled.set_distance(leg.vector_travelled().distance);
        current.planned.set_distance(leg.vector_planned().distance);
        current.solution_remaining = leg_solution;
        current.time_remaining = leg_solution.time_elapsed.max(0.0);
        current.time_planned = if speed > 0.0 {
            leg.vector_planned().distance / speed
        } else {
            0.0
        };
        current.calc_speeds(dt);

        self.stats.distance_nominal = planned;
        self.stats.distance_max = distance_max;
        self.stats.distance_min = distance_min;
        self.stats.distance_scored = scored;
    }

    // ---- assigned areas ---------------------------------------------------

    pub fn set_target(&mut self, index: usize, location: GeoPoint) -> bool {
        self.points
            .get_mut(index)
            .is_some_and(|p| p.set_target(location))
    }

    pub fn set_target_range(&mut self, index: usize, range: f64) -> bool {
        if self.points.get(index).is_some_and(|p| p.target().is_some()) {
            self.scan_distance_extremes();
        }
        self.points
            .get_mut(index)
            .is_some_and(|p| p.set_target_range(range))
    }

    pub fn set_target_locked(&mut self, index: usize, locked: bool) -> bool {
        self.points
            .get_mut(index)
            .is_some_and(|p| p.set_target_locked(locked))
    }

    /// Equal-distance isoline through the target of point `index`.
    pub fn isoline(&self, index: usize) -> Option<AatIsolineSegment> {
        let previous = self.points.get(index.checked_sub(1)?)?.location_travelled();
        let next = self.points.get(index + 1)?.location_remaining();
        self.points
            .get(index)?
            .isoline(&previous, &next, &self.projection)
    }

    // ---- misc -------------------------------------------------------------

    /// Forget all flight progress, keeping the task definition.
    pub fn reset(&mut self) {
        for point in self.points.iter_mut().chain(self.optional_starts.iter_mut()) {
            point.reset();
        }
        self.active = 0;
        self.advance.set_armed(false);
        self.stats.reset();
        self.last_update_time = None;
        self.scan_active();
    }

    pub fn accept(&self, visitor: &mut dyn TaskPointVisitor) {
        for point in &self.points {
            point.accept(visitor);
        }
    }
}

/// Dynamic programme over consecutive polygons choosing one vertex each so
/// the summed leg length is maximal (or minimal).
fn optimal_path(polygons: &[Vec<SearchPoint>], maximise: bool) -> Vec<SearchPoint> {
    let Some(first) = polygons.first() else {
        return Vec::new();
    };
    let better = |a: f64, b: f64| if maximise { a > b } else { a < b };

    let mut cost: Vec<f64> = vec![0.0; first.len()];
    let mut back: Vec<Vec<usize>> = vec![Vec::new()];
    for pair in polygons.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let mut next_cost = Vec::with_capacity(to.len());
        let mut next_back = Vec::with_capacity(to.len());
        for target in to {
            let mut best: Option<(f64, usize)> = None;
            for (j, origin) in from.iter().enumerate() {
                let c = cost[j] + origin.flat().distance_to(&target.flat());
                if best.map_or(true, |(b, _)| better(c, b)) {
                    best = Some((c, j));
                }
            }
            let (c, j) = best.unwrap_or((0.0, 0));
            next_cost.push(c);
            next_back.push(j);
        }
        cost = next_cost;
        back.push(next_back);
    }

    let mut index = cost
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |acc, (k, &c)| match acc {
            Some((_, b)) if !better(c, b) => acc,
            _ => Some((k, c)),
        })
        .map(|(k, _)| k)
        .unwrap_or(0);

    let mut path = vec![polygons[polygons.len() - 1][index]; polygons.len()];
    for i in (0..polygons.len()).rev() {
        path[i] = polygons[i][index];
        if i > 0 {
            index = back[i][index];
        }
    }
    path
}
