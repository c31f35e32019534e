//! Task factories: legal point types per rule set and auto-mutating edits.

use crate::aat::AatTarget;
use crate::error::{TaskError, TaskValidationError};
use crate::ordered_task::OrderedTask;
use crate::task_point::{OrderedTaskPoint, PointRole};
use crate::waypoint::Waypoint;
use crate::zone::{ObservationZonePoint, OzShape, SectorSpan};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryKind {
    #[default]
    Fai,
    Aat,
    Mixed,
}

impl FromStr for FactoryKind {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fai" => Ok(FactoryKind::Fai),
            "aat" => Ok(FactoryKind::Aat),
            "mixed" => Ok(FactoryKind::Mixed),
            _ => Err(TaskError::UnknownFactory(s.to_string())),
        }
    }
}

impl fmt::Display for FactoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FactoryKind::Fai => "fai",
            FactoryKind::Aat => "aat",
            FactoryKind::Mixed => "mixed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalPointType {
    StartLine,
    StartCylinder,
    StartSector,
    FaiSector,
    AstCylinder,
    Keyhole,
    AatCylinder,
    AatSegment,
    FinishLine,
    FinishCylinder,
    FinishSector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeFamily {
    Line,
    Cylinder,
    Sector,
    Keyhole,
}

/// Position class within a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Start,
    Intermediate,
    Finish,
}

impl LegalPointType {
    /// Classify an existing point; `None` for combinations no factory
    /// produces.
    pub fn of(point: &OrderedTaskPoint) -> Option<Self> {
        use LegalPointType::*;
        Some(match (point.role(), point.zone().shape()) {
            (PointRole::Start, OzShape::Line { .. }) => StartLine,
            (PointRole::Start, OzShape::Cylinder { .. }) => StartCylinder,
            (PointRole::Start, OzShape::Sector { .. } | OzShape::FaiSector { .. }) => StartSector,
            (PointRole::Ast, OzShape::FaiSector { .. }) => FaiSector,
            (PointRole::Ast, OzShape::Cylinder { .. }) => AstCylinder,
            (PointRole::Ast, OzShape::Keyhole { .. }) => Keyhole,
            (PointRole::Aat(_), OzShape::Cylinder { .. }) => AatCylinder,
            (PointRole::Aat(_), OzShape::Sector { .. }) => AatSegment,
            (PointRole::Finish, OzShape::Line { .. }) => FinishLine,
            (PointRole::Finish, OzShape::Cylinder { .. }) => FinishCylinder,
            (PointRole::Finish, OzShape::Sector { .. } | OzShape::FaiSector { .. }) => FinishSector,
            _ => return None,
        })
    }

    fn family(self) -> ShapeFamily {
        use LegalPointType::*;
        match self {
            StartLine | FinishLine => ShapeFamily::Line,
            StartCylinder | AstCylinder | AatCylinder | FinishCylinder => ShapeFamily::Cylinder,
            StartSector | FaiSector | AatSegment | FinishSector => ShapeFamily::Sector,
            Keyhole => ShapeFamily::Keyhole,
        }
    }

    fn slot(self) -> Slot {
        use LegalPointType::*;
        match self {
            StartLine | StartCylinder | StartSector => Slot::Start,
            FaiSector | AstCylinder | Keyhole | AatCylinder | AatSegment => Slot::Intermediate,
            FinishLine | FinishCylinder | FinishSector => Slot::Finish,
        }
    }
}

impl FromStr for LegalPointType {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use LegalPointType::*;
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "start_line" => Ok(StartLine),
            "start_cylinder" => Ok(StartCylinder),
            "start_sector" => Ok(StartSector),
            "fai_sector" => Ok(FaiSector),
            "ast_cylinder" => Ok(AstCylinder),
            "keyhole" => Ok(Keyhole),
            "aat_cylinder" => Ok(AatCylinder),
            "aat_segment" => Ok(AatSegment),
            "finish_line" => Ok(FinishLine),
            "finish_cylinder" => Ok(FinishCylinder),
            "finish_sector" => Ok(FinishSector),
            _ => Err(TaskError::UnknownPointType(s.to_string())),
        }
    }
}

impl FactoryKind {
    pub fn start_types(self) -> &'static [LegalPointType] {
        use LegalPointType::*;
        match self {
            FactoryKind::Fai => &[StartSector, StartCylinder],
            FactoryKind::Aat => &[StartCylinder],
            FactoryKind::Mixed => &[StartSector, StartCylinder, StartLine],
        }
    }

    pub fn intermediate_types(self) -> &'static [LegalPointType] {
        use LegalPointType::*;
        match self {
            FactoryKind::Fai => &[FaiSector, AstCylinder],
            FactoryKind::Aat => &[AatCylinder, AatSegment],
            FactoryKind::Mixed => &[FaiSector, AstCylinder, AatCylinder, AatSegment],
        }
    }

    pub fn finish_types(self) -> &'static [LegalPointType] {
        use LegalPointType::*;
        match self {
            FactoryKind::Fai => &[FinishSector, FinishCylinder],
            FactoryKind::Aat => &[FinishLine],
            FactoryKind::Mixed => &[FinishSector, FinishCylinder, FinishLine],
        }
    }

    fn types_for(self, slot: Slot) -> &'static [LegalPointType] {
        match slot {
            Slot::Start => self.start_types(),
            Slot::Intermediate => self.intermediate_types(),
            Slot::Finish => self.finish_types(),
        }
    }
}

/// Edits an ordered task under one rule set.
pub struct TaskFactory<'a> {
    task: &'a mut OrderedTask,
    kind: FactoryKind,
}

impl<'a> TaskFactory<'a> {
    /// Borrow `task` for editing; the task remembers the rule set.
    pub fn new(task: &'a mut OrderedTask, kind: FactoryKind) -> Self {
        task.set_factory_kind(kind);
        Self { task, kind }
    }

    pub fn kind(&self) -> FactoryKind {
        self.kind
    }

    pub fn task(&self) -> &OrderedTask {
        &*self.task
    }

    /// Build a point of `ty` around `waypoint` without checking legality.
    pub fn create_point(&self, ty: LegalPointType, waypoint: Waypoint) -> OrderedTaskPoint {
        use LegalPointType::*;
        let z = &self.task.behaviour().zones;
        let (role, shape) = match ty {
            StartLine => (PointRole::Start, OzShape::Line { length: z.start_line_length }),
            StartCylinder => (PointRole::Start, OzShape::Cylinder { radius: z.start_cylinder_radius }),
            StartSector => (PointRole::Start, OzShape::FaiSector { radius: z.start_sector_radius }),
            FaiSector => (PointRole::Ast, OzShape::FaiSector { radius: z.fai_sector_radius }),
            AstCylinder => (PointRole::Ast, OzShape::Cylinder { radius: z.ast_cylinder_radius }),
            Keyhole => (
                PointRole::Ast,
                OzShape::Keyhole {
                    inner_radius: z.keyhole_inner_radius,
                    radius: z.keyhole_radius,
                },
            ),
            AatCylinder => (
                PointRole::Aat(AatTarget::new(waypoint.location)),
                OzShape::Cylinder { radius: z.aat_cylinder_radius },
            ),
            AatSegment => (
                PointRole::Aat(AatTarget::new(waypoint.location)),
                OzShape::Sector {
                    radius: z.aat_segment_radius,
                    span: SectorSpan::Symmetric { angle: z.aat_segment_angle },
                },
            ),
            FinishLine => (PointRole::Finish, OzShape::Line { length: z.finish_line_length }),
            FinishCylinder => (PointRole::Finish, OzShape::Cylinder { radius: z.finish_cylinder_radius }),
            FinishSector => (PointRole::Finish, OzShape::FaiSector { radius: z.finish_sector_radius }),
        };
        let zone = ObservationZonePoint::new(waypoint.location, shape);
        OrderedTaskPoint::new(waypoint, role, zone, self.task.behaviour())
    }

    fn create_in(&self, slot: Slot, ty: LegalPointType, waypoint: Waypoint) -> Option<OrderedTaskPoint> {
        if !self.kind.types_for(slot).contains(&ty) {
            tracing::debug!(factory = %self.kind, ?ty, "point type not allowed here");
            return None;
        }
        Some(self.create_point(ty, waypoint))
    }

    pub fn create_start(&self, ty: LegalPointType, waypoint: Waypoint) -> Option<OrderedTaskPoint> {
        self.create_in(Slot::Start, ty, waypoint)
    }

    pub fn create_intermediate(
        &self,
        ty: LegalPointType,
        waypoint: Waypoint,
    ) -> Option<OrderedTaskPoint> {
        self.create_in(Slot::Intermediate, ty, waypoint)
    }

    pub fn create_finish(&self, ty: LegalPointType, waypoint: Waypoint) -> Option<OrderedTaskPoint> {
        self.create_in(Slot::Finish, ty, waypoint)
    }

    /// Point of the default type for `slot`, keeping the shape family of
    /// `from` where the rules allow it.
    fn mutate(&self, from: &OrderedTaskPoint, slot: Slot) -> OrderedTaskPoint {
        let legal = self.kind.types_for(slot);
        let family = LegalPointType::of(from).map(LegalPointType::family);
        let ty = legal
            .iter()
            .copied()
            .find(|t| Some(t.family()) == family)
            .unwrap_or(legal[0]);
        tracing::debug!(point = from.name(), ?ty, "mutating task point");
        self.create_point(ty, from.waypoint().clone())
    }

    fn is_valid_in(&self, point: &OrderedTaskPoint, slot: Slot) -> bool {
        LegalPointType::of(point)
            .is_some_and(|t| t.slot() == slot && self.kind.types_for(slot).contains(&t))
    }

    pub fn append(&mut self, point: OrderedTaskPoint, auto_mutate: bool) -> bool {
        if !auto_mutate {
            return self.task.append(point);
        }
        if self.task.is_empty() {
            let point = if self.is_valid_in(&point, Slot::Start) {
                point
            } else {
                self.mutate(&point, Slot::Start)
            };
            return self.task.append(point);
        }
        if self.task.has_finish() {
            let last = self.task.task_size() - 1;
            let demoted = match self.task.point(last) {
                Some(old) => self.mutate(old, Slot::Intermediate),
                None => return false,
            };
            if !self.task.replace(demoted, last) {
                return false;
            }
        }
        let point = if self.is_valid_in(&point, Slot::Finish) {
            point
        } else {
            self.mutate(&point, Slot::Finish)
        };
        self.task.append(point)
    }

    pub fn insert(&mut self, point: OrderedTaskPoint, position: usize, auto_mutate: bool) -> bool {
        if position >= self.task.task_size() {
            return self.append(point, auto_mutate);
        }
        if !auto_mutate {
            return self.task.insert(point, position);
        }
        if position == 0 {
            if self.task.has_start() {
                let demoted = match self.task.point(0) {
                    Some(old) => self.mutate(old, Slot::Intermediate),
                    None => return false,
                };
                self.task.replace(demoted, 0);
            }
            let point = if self.is_valid_in(&point, Slot::Start) {
                point
            } else {
                self.mutate(&point, Slot::Start)
            };
            return self.task.insert(point, 0);
        }
        let point = if self.is_valid_in(&point, Slot::Intermediate) {
            point
        } else {
            self.mutate(&point, Slot::Intermediate)
        };
        self.task.insert(point, position)
    }

    pub fn replace(&mut self, point: OrderedTaskPoint, position: usize, auto_mutate: bool) -> bool {
        let size = self.task.task_size();
        if position >= size {
            return false;
        }
        if !auto_mutate {
            return self.task.replace(point, position);
        }
        let slot = if position == 0 {
            Slot::Start
        } else if position + 1 == size {
            Slot::Finish
        } else {
            Slot::Intermediate
        };
        let point = if self.is_valid_in(&point, slot) {
            point
        } else {
            self.mutate(&point, slot)
        };
        self.task.replace(point, position)
    }

    pub fn remove(&mut self, position: usize, auto_mutate: bool) -> bool {
        let size = self.task.task_size();
        if position >= size {
            return false;
        }
        if !auto_mutate {
            return self.task.remove(position);
        }
        if position == 0 {
            if size == 1 {
                return self.task.remove(0);
            }
            let promoted = match self.task.point(1) {
                Some(next) => self.mutate(next, Slot::Start),
                None => return false,
            };
            return self.task.remove(0) && self.task.replace(promoted, 0);
        }
        if position + 1 == size && position > 1 {
            let promoted = match self.task.point(position - 1) {
                Some(previous) => self.mutate(previous, Slot::Finish),
                None => return false,
            };
            return self.task.remove(position) && self.task.replace(promoted, position - 1);
        }
        self.task.remove(position)
    }

    /// Move point `position` to another waypoint, keeping its type.
    pub fn relocate(&mut self, position: usize, waypoint: Waypoint) -> bool {
        let moved = match self.task.point(position) {
            Some(point) => point.relocated(waypoint),
            None => return false,
        };
        self.task.replace(moved, position)
    }

    /// Exchange point `position` with its successor.
    pub fn swap(&mut self, position: usize, auto_mutate: bool) -> bool {
        let size = self.task.task_size();
        if size <= 1 || position + 1 >= size {
            return false;
        }
        let next = match self.task.point(position + 1) {
            Some(point) => point.clone(),
            None => return false,
        };
        self.insert(next, position, auto_mutate) && self.remove(position + 2, auto_mutate)
    }

    /// Append a waypoint as the first legal type of whichever slot it lands in.
    pub fn append_waypoint(&mut self, waypoint: Waypoint) -> bool {
        let slot = if self.task.is_empty() {
            Slot::Start
        } else {
            Slot::Finish
        };
        let point = self.create_point(self.kind.types_for(slot)[0], waypoint);
        self.append(point, true)
    }

    pub fn validation_errors(&self) -> Vec<TaskValidationError> {
        let mut errors = self.task.validation_errors();
        if matches!(self.kind, FactoryKind::Fai | FactoryKind::Mixed) {
            if !self.task.has_start() && !errors.contains(&TaskValidationError::NotStart(0)) {
                errors.push(TaskValidationError::NoStart);
            }
            if !self.task.has_finish() {
                errors.push(TaskValidationError::NoFinish);
            }
        }
        errors
    }

    /// Structural check plus, for FAI and mixed tasks, presence of both a
    /// start and a finish.
    pub fn validate(&self) -> bool {
        let ok = self.validation_errors().is_empty();
        if !ok {
            tracing::warn!(factory = %self.kind, "task failed validation");
        }
        ok
    }
}
