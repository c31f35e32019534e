//! Task engine for competition soaring.
//!
//! Tracks a glider through an ordered sequence of turnpoints with
//! observation zones, scores distances, and provides abort and goto
//! navigation behind a single [`TaskManager`] facade.

pub mod aat;
pub mod abort_task;
pub mod aircraft;
pub mod behaviour;
pub mod error;
pub mod events;
pub mod factory;
pub mod flat;
pub mod geo;
pub mod glide;
pub mod goto_task;
pub mod ordered_task;
pub mod projection;
pub mod protected;
pub mod search_point;
pub mod stats;
pub mod task_advance;
pub mod task_leg;
pub mod task_manager;
pub mod task_point;
pub mod visitor;
pub mod waypoint;
pub mod zone;

pub use aat::{AatIsolineSegment, AatTarget};
pub use abort_task::AbortTask;
pub use aircraft::AircraftState;
pub use behaviour::{AbortBehaviour, TaskBehaviour, ZoneDefaults};
pub use error::{TaskError, TaskValidationError};
pub use events::{EventLog, NullTaskEvents, TaskEvent, TaskEvents, TaskPointRef, TracingTaskEvents};
pub use factory::{FactoryKind, LegalPointType, TaskFactory};
pub use flat::{FlatBoundingBox, FlatGeoPoint, FlatPoint, FlatRay};
pub use geo::{GeoPoint, GeoVector};
pub use glide::{GlidePolar, GlideResult, GlideValidity};
pub use goto_task::GotoTask;
pub use ordered_task::OrderedTask;
pub use projection::{ProjectionEpoch, TaskProjection};
pub use protected::ProtectedTaskManager;
pub use search_point::{SearchPoint, SearchPointVector};
pub use stats::{CommonStats, DistanceStat, ElementStat, TaskStats};
pub use task_advance::{AdvanceMode, AdvanceState, TaskAdvance};
pub use task_leg::TaskLeg;
pub use task_manager::{TaskManager, TaskMode};
pub use task_point::{ActiveState, OrderedTaskPoint, PointRole, TaskPointType, UnorderedTaskPoint};
pub use visitor::TaskPointVisitor;
pub use waypoint::{Waypoint, WaypointSource, Waypoints};
pub use zone::{ObservationZonePoint, OzShape, SectorSpan};
