//! Facade owning the ordered, abort and goto tasks.
//!
//! Exactly one task is active at a time. The ordered task keeps its
//! statistics fresh even while abort or goto is flown so that resuming
//! shows current numbers.

use crate::abort_task::AbortTask;
use crate::aircraft::AircraftState;
use crate::behaviour::TaskBehaviour;
use crate::events::{TaskEvents, TaskPointRef};
use crate::factory::{FactoryKind, TaskFactory};
use crate::glide::GlidePolar;
use crate::goto_task::GotoTask;
use crate::ordered_task::OrderedTask;
use crate::stats::{CommonStats, TaskStats};
use crate::task_point::{OrderedTaskPoint, UnorderedTaskPoint};
use crate::visitor::TaskPointVisitor;
use crate::waypoint::{Waypoint, WaypointSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskMode {
    #[default]
    Null,
    Ordered,
    Abort,
    Goto,
}

impl fmt::Display for TaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskMode::Null => "null",
            TaskMode::Ordered => "ordered",
            TaskMode::Abort => "abort",
            TaskMode::Goto => "goto",
        };
        f.write_str(s)
    }
}

/// Collects waypoint ids of ordered task points in visiting order.
#[derive(Default)]
struct WaypointIdCollector {
    ids: Vec<u32>,
}

impl WaypointIdCollector {
    fn push(&mut self, point: &OrderedTaskPoint) {
        self.ids.push(point.waypoint().id);
    }
}

impl TaskPointVisitor for WaypointIdCollector {
    fn visit_start(&mut self, point: &OrderedTaskPoint) {
        self.push(point);
    }
    fn visit_ast(&mut self, point: &OrderedTaskPoint) {
        self.push(point);
    }
    fn visit_aat(&mut self, point: &OrderedTaskPoint) {
        self.push(point);
    }
    fn visit_finish(&mut self, point: &OrderedTaskPoint) {
        self.push(point);
    }
    fn visit_unordered(&mut self, _point: &UnorderedTaskPoint) {}
}

pub struct TaskManager {
    behaviour: TaskBehaviour,
    polar: GlidePolar,
    waypoints: Arc<dyn WaypointSource>,
    events: Box<dyn TaskEvents>,
    ordered: OrderedTask,
    abort: AbortTask,
    goto: GotoTask,
    mode: TaskMode,
    common: CommonStats,
}

impl fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskManager")
            .field("mode", &self.mode)
            .field("ordered_size", &self.ordered.task_size())
            .field("abort_size", &self.abort.task_size())
            .field("goto_size", &self.goto.task_size())
            .finish()
    }
}

impl TaskManager {
    pub fn new(waypoints: Arc<dyn WaypointSource>, events: Box<dyn TaskEvents>) -> Self {
        Self::with_behaviour(TaskBehaviour::default(), waypoints, events)
    }

    pub fn with_behaviour(
        behaviour: TaskBehaviour,
        waypoints: Arc<dyn WaypointSource>,
        events: Box<dyn TaskEvents>,
    ) -> Self {
        Self {
            ordered: OrderedTask::new(behaviour.clone()),
            behaviour,
            polar: GlidePolar::default(),
            waypoints,
            events,
            abort: AbortTask::new(),
            goto: GotoTask::new(),
            mode: TaskMode::Null,
            common: CommonStats::default(),
        }
    }

    pub fn mode(&self) -> TaskMode {
        self.mode
    }

    /// Switch the active task. Ordered falls back to goto when the ordered
    /// task is empty, and goto falls back to null without a destination.
    /// Returns the mode actually selected.
    pub fn set_mode(&mut self, mode: TaskMode) -> TaskMode {
        let mut selected = mode;
        if selected == TaskMode::Ordered && self.ordered.is_empty() {
            selected = TaskMode::Goto;
        }
        if selected == TaskMode::Goto && self.goto.is_empty() {
            selected = TaskMode::Null;
        }
        if selected != self.mode {
            tracing::info!(requested = %mode, from = %self.mode, to = %selected, "task mode changed");
            self.mode = selected;
        }
        selected
    }

    pub fn behaviour(&self) -> &TaskBehaviour {
        &self.behaviour
    }

    pub fn set_behaviour(&mut self, behaviour: TaskBehaviour) {
        self.ordered.set_behaviour(behaviour.clone());
        self.behaviour = behaviour;
    }

    pub fn glide_polar(&self) -> &GlidePolar {
        &self.polar
    }

    pub fn set_glide_polar(&mut self, polar: GlidePolar) {
        self.polar = polar;
    }

    pub fn waypoints(&self) -> &dyn WaypointSource {
        &*self.waypoints
    }

    // ---- per-sample updates -----------------------------------------------

    /// Feed one navigation sample. Returns true if the active task changed
    /// state.
    pub fn update(&mut self, state: &AircraftState, last: &AircraftState) -> bool {
        let changed = match self.mode {
            TaskMode::Ordered => self.ordered.update_sample(state, last, &*self.events),
            TaskMode::Abort => self.abort.update_sample(
                state,
                &self.polar,
                &*self.waypoints,
                &self.behaviour,
            ),
            TaskMode::Goto => self.goto.update_sample(state, last, &*self.events),
            TaskMode::Null => false,
        };

        self.ordered.update_stats(state, &self.polar);
        match self.mode {
            TaskMode::Abort => self.abort.update_stats(state, &self.polar),
            TaskMode::Goto => self.goto.update_stats(state, &self.polar),
            TaskMode::Ordered | TaskMode::Null => {}
        }
        self.update_common_stats();
        changed
    }

    /// Periodic check between samples. Without an ordered task only the
    /// offline landable check runs. Returns whether a landable is reachable.
    pub fn update_idle(&mut self, state: &AircraftState) -> bool {
        if !self.ordered.is_empty() {
            return self.common.landable_reachable;
        }
        let reachable =
            self.abort
                .update_offline(state, &self.polar, &*self.waypoints, &self.behaviour);
        self.common.landable_reachable = reachable;
        self.common.landable_in_range = self.abort.landable_in_range();
        reachable
    }

    /// Refresh figures that do not depend on the active mode.
    pub fn update_common_stats(&mut self) {
        let stats = self.ordered.stats();
        let min_time = self.behaviour.aat_min_time_s;
        if self.ordered.has_targets() && min_time > 0.0 {
            let elapsed = if stats.task_started {
                stats.total.time_elapsed
            } else {
                0.0
            };
            self.common.aat_time_remaining = Some((min_time - elapsed).max(0.0));
            self.common.aat_speed_max = Some(stats.distance_max / min_time);
            self.common.aat_speed_min = Some(stats.distance_min / min_time);
        } else {
            self.common.aat_time_remaining = None;
            self.common.aat_speed_max = None;
            self.common.aat_speed_min = None;
        }

        if self.mode == TaskMode::Abort {
            self.common.landable_reachable = self.abort.landable_reachable();
        }

        let mut collector = WaypointIdCollector::default();
        self.ordered.accept(&mut collector);
        self.common.task_waypoint_ids = collector.ids;
    }

    // ---- task editing -----------------------------------------------------

    pub fn ordered_task(&self) -> &OrderedTask {
        &self.ordered
    }

    /// Copy of the ordered task for offline editing before [`commit`].
    ///
    /// [`commit`]: TaskManager::commit
    pub fn clone_ordered(&self) -> OrderedTask {
        self.ordered.clone()
    }

    /// Edit the live ordered task in place.
    pub fn ordered_factory(&mut self, kind: FactoryKind) -> TaskFactory<'_> {
        TaskFactory::new(&mut self.ordered, kind)
    }

    /// Install `task` as the ordered task. Returns whether it is valid; an
    /// invalid task is installed anyway and each problem is reported.
    pub fn commit(&mut self, mut task: OrderedTask) -> bool {
        task.set_behaviour(self.behaviour.clone());
        let kind = task.factory_kind();
        let errors = TaskFactory::new(&mut task, kind).validation_errors();
        for error in &errors {
            self.events.construction_error(&error.to_string());
        }
        tracing::info!(
            points = task.task_size(),
            kind = %task.factory_kind(),
            valid = errors.is_empty(),
            "ordered task committed"
        );
        self.ordered = task;

        match self.mode {
            TaskMode::Null if !self.ordered.is_empty() => {
                self.set_mode(TaskMode::Ordered);
            }
            TaskMode::Ordered => {
                self.set_mode(TaskMode::Ordered);
            }
            _ => {}
        }
        errors.is_empty()
    }

    /// Fly straight to `waypoint`.
    pub fn do_goto(&mut self, waypoint: Waypoint) -> bool {
        self.goto
            .do_goto(waypoint, self.behaviour.safety_height_arrival);
        let selected = self.set_mode(TaskMode::Goto);
        if let Some(point) = self.goto.point() {
            self.events.active_changed(TaskPointRef::Unordered(point));
        }
        selected == TaskMode::Goto
    }

    pub fn abort(&mut self) -> TaskMode {
        self.set_mode(TaskMode::Abort)
    }

    /// Return to the ordered task, falling through to goto or null.
    pub fn resume(&mut self) -> TaskMode {
        self.set_mode(TaskMode::Ordered)
    }

    pub fn active_index(&self) -> usize {
        match self.mode {
            TaskMode::Ordered => self.ordered.active_index(),
            TaskMode::Abort => self.abort.active_index(),
            TaskMode::Goto | TaskMode::Null => 0,
        }
    }

    /// Waypoint currently navigated to.
    pub fn active_waypoint(&self) -> Option<&Waypoint> {
        match self.mode {
            TaskMode::Ordered => self.ordered.active_point().map(|p| p.waypoint()),
            TaskMode::Abort => self.abort.active_point().map(|p| p.waypoint()),
            TaskMode::Goto => self.goto.point().map(|p| p.waypoint()),
            TaskMode::Null => None,
        }
    }

    pub fn increment_active(&mut self) -> bool {
        let index = self.active_index() + 1;
        self.set_active_index(index)
    }

    pub fn decrement_active(&mut self) -> bool {
        match self.active_index().checked_sub(1) {
            Some(index) => self.set_active_index(index),
            None => false,
        }
    }

    fn set_active_index(&mut self, index: usize) -> bool {
        let changed = match self.mode {
            TaskMode::Ordered => self.ordered.set_active(index),
            TaskMode::Abort => self.abort.set_active(index),
            TaskMode::Goto | TaskMode::Null => false,
        };
        if !changed {
            return false;
        }
        match self.mode {
            TaskMode::Ordered => {
                if let Some(point) = self.ordered.active_point() {
                    self.events.active_changed(TaskPointRef::Ordered(point));
                }
            }
            TaskMode::Abort => {
                if let Some(point) = self.abort.active_point() {
                    self.events.active_changed(TaskPointRef::Unordered(point));
                }
            }
            TaskMode::Goto | TaskMode::Null => {}
        }
        true
    }

    /// Forget flight progress on every task.
    pub fn reset(&mut self) {
        self.ordered.reset();
        self.abort.reset();
        self.goto.reset();
        self.common.reset();
    }

    // ---- statistics -------------------------------------------------------

    /// Statistics of the active task (the ordered task when idle).
    pub fn stats(&self) -> &TaskStats {
        match self.mode {
            TaskMode::Abort => self.abort.stats(),
            TaskMode::Goto => self.goto.stats(),
            TaskMode::Ordered | TaskMode::Null => self.ordered.stats(),
        }
    }

    pub fn ordered_stats(&self) -> &TaskStats {
        self.ordered.stats()
    }

    pub fn common_stats(&self) -> &CommonStats {
        &self.common
    }

    pub fn abort_task(&self) -> &AbortTask {
        &self.abort
    }

    pub fn goto_task(&self) -> &GotoTask {
        &self.goto
    }
}
