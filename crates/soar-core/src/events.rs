//! Task event callbacks.

use crate::task_point::{OrderedTaskPoint, UnorderedTaskPoint};
use std::sync::Mutex;

/// Borrowed view of either kind of task point.
#[derive(Debug, Clone, Copy)]
pub enum TaskPointRef<'a> {
    Ordered(&'a OrderedTaskPoint),
    Unordered(&'a UnorderedTaskPoint),
}

impl TaskPointRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            TaskPointRef::Ordered(p) => p.name(),
            TaskPointRef::Unordered(p) => &p.waypoint().name,
        }
    }

    pub fn waypoint_id(&self) -> u32 {
        match self {
            TaskPointRef::Ordered(p) => p.waypoint().id,
            TaskPointRef::Unordered(p) => p.waypoint().id,
        }
    }
}

/// Sink for events raised while the task is flown. All methods default to
/// no-ops.
pub trait TaskEvents: Send + Sync {
    fn transition_enter(&self, _point: TaskPointRef<'_>) {}
    fn transition_exit(&self, _point: TaskPointRef<'_>) {}
    /// Automatic advance to `index`
    fn active_advanced(&self, _point: TaskPointRef<'_>, _index: usize) {}
    /// Active point changed by any other means
    fn active_changed(&self, _point: TaskPointRef<'_>) {}
    fn construction_error(&self, _message: &str) {}
    fn warning_start_speed(&self) {}
    fn task_start(&self) {}
    fn task_finish(&self) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTaskEvents;

impl TaskEvents for NullTaskEvents {}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTaskEvents;

impl TaskEvents for TracingTaskEvents {
    fn transition_enter(&self, point: TaskPointRef<'_>) {
        tracing::debug!(point = point.name(), "entered observation zone");
    }

    fn transition_exit(&self, point: TaskPointRef<'_>) {
        tracing::debug!(point = point.name(), "exited observation zone");
    }

    fn active_advanced(&self, point: TaskPointRef<'_>, index: usize) {
        tracing::info!(point = point.name(), index, "advanced to next turnpoint");
    }

    fn active_changed(&self, point: TaskPointRef<'_>) {
        tracing::info!(point = point.name(), "active turnpoint changed");
    }

    fn construction_error(&self, message: &str) {
        tracing::warn!(message, "task construction error");
    }

    fn warning_start_speed(&self) {
        tracing::warn!("start speed above limit");
    }

    fn task_start(&self) {
        tracing::info!("task started");
    }

    fn task_finish(&self) {
        tracing::info!("task finished");
    }
}

/// Recorded event, see [`EventLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Enter(u32),
    Exit(u32),
    Advanced { waypoint_id: u32, index: usize },
    ActiveChanged(u32),
    ConstructionError(String),
    StartSpeedWarning,
    TaskStart,
    TaskFinish,
}

/// Collects events in order, mainly for tests and replay summaries.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<TaskEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: TaskEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }

    pub fn events(&self) -> Vec<TaskEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, event: &TaskEvent) -> bool {
        self.events().contains(event)
    }
}

impl TaskEvents for EventLog {
    fn transition_enter(&self, point: TaskPointRef<'_>) {
        self.push(TaskEvent::Enter(point.waypoint_id()));
    }

    fn transition_exit(&self, point: TaskPointRef<'_>) {
        self.push(TaskEvent::Exit(point.waypoint_id()));
    }

    fn active_advanced(&self, point: TaskPointRef<'_>, index: usize) {
        self.push(TaskEvent::Advanced {
            waypoint_id: point.waypoint_id(),
            index,
        });
    }

    fn active_changed(&self, point: TaskPointRef<'_>) {
        self.push(TaskEvent::ActiveChanged(point.waypoint_id()));
    }

    fn construction_error(&self, message: &str) {
        self.push(TaskEvent::ConstructionError(message.to_string()));
    }

    fn warning_start_speed(&self) {
        self.push(TaskEvent::StartSpeedWarning);
    }

    fn task_start(&self) {
        self.push(TaskEvent::TaskStart);
    }

    fn task_finish(&self) {
        self.push(TaskEvent::TaskFinish);
    }
}

impl<T: TaskEvents + ?Sized> TaskEvents for std::sync::Arc<T> {
    fn transition_enter(&self, point: TaskPointRef<'_>) {
        (**self).transition_enter(point)
    }
    fn transition_exit(&self, point: TaskPointRef<'_>) {
        (**self).transition_exit(point)
    }
    fn active_advanced(&self, point: TaskPointRef<'_>, index: usize) {
        (**self).active_advanced(point, index)
    }
    fn active_changed(&self, point: TaskPointRef<'_>) {
        (**self).active_changed(point)
    }
    fn construction_error(&self, message: &str) {
        (**self).construction_error(message)
    }
    fn warning_start_speed(&self) {
        (**self).warning_start_speed()
    }
    fn task_start(&self) {
        (**self).task_start()
    }
    fn task_finish(&self) {
        (**self).task_finish()
    }
}
