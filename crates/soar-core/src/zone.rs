//! Observation zone geometry.
//!
//! Every zone is a shape tag plus a reference location. Symmetric shapes are
//! oriented from the neighbouring task legs by [`ObservationZonePoint::set_legs`].

use crate::aircraft::AircraftState;
use crate::geo::{bearing_difference, bearing_in_arc, normalize_bearing, GeoPoint};
use serde::{Deserialize, Serialize};

/// Parametric step used to sample zone boundaries.
pub const BOUNDARY_STEP: f64 = 0.05;

/// Angular extent of a sector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectorSpan {
    /// Opening angle in degrees, centred on the leg bisector
    Symmetric { angle: f64 },
    /// Fixed clockwise radials in degrees
    Radials { start: f64, end: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum OzShape {
    Line { length: f64 },
    Cylinder { radius: f64 },
    Sector { radius: f64, span: SectorSpan },
    /// 90° sector on the outside of the turn
    FaiSector { radius: f64 },
    /// FAI sector plus a small cylinder around the turnpoint
    Keyhole { inner_radius: f64, radius: f64 },
}

impl OzShape {
    /// Largest distance from the reference covered by the zone.
    pub fn max_radius(&self) -> f64 {
        match *self {
            OzShape::Line { length } => length / 2.0,
            OzShape::Cylinder { radius }
            | OzShape::Sector { radius, .. }
            | OzShape::FaiSector { radius }
            | OzShape::Keyhole { radius, .. } => radius,
        }
    }

    fn symmetric_angle(&self) -> Option<f64> {
        match *self {
            OzShape::Line { .. } => Some(180.0),
            OzShape::Sector {
                span: SectorSpan::Symmetric { angle },
                ..
            } => Some(angle),
            OzShape::FaiSector { .. } | OzShape::Keyhole { .. } => Some(90.0),
            OzShape::Cylinder { .. }
            | OzShape::Sector {
                span: SectorSpan::Radials { .. },
                ..
            } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationZonePoint {
    reference: GeoPoint,
    shape: OzShape,
    start_radial: f64,
    end_radial: f64,
}

impl ObservationZonePoint {
    pub fn new(reference: GeoPoint, shape: OzShape) -> Self {
        let mut zone = Self {
            reference,
            shape,
            start_radial: 0.0,
            end_radial: 0.0,
        };
        zone.orient(180.0);
        if let OzShape::Sector {
            span: SectorSpan::Radials { start, end },
            ..
        } = shape
        {
            zone.start_radial = normalize_bearing(start);
            zone.end_radial = normalize_bearing(end);
        }
        zone
    }

    pub fn reference(&self) -> GeoPoint {
        self.reference
    }

    pub fn shape(&self) -> &OzShape {
        &self.shape
    }

    pub fn start_radial(&self) -> f64 {
        self.start_radial
    }

    pub fn end_radial(&self) -> f64 {
        self.end_radial
    }

    /// Fix the radials of a sector. Only sectors accept explicit radials.
    pub fn set_radials(&mut self, start: f64, end: f64) -> bool {
        match &mut self.shape {
            OzShape::Sector { span, .. } => {
                *span = SectorSpan::Radials { start, end };
                self.start_radial = normalize_bearing(start);
                self.end_radial = normalize_bearing(end);
                true
            }
            _ => false,
        }
    }

    fn orient(&mut self, bisector: f64) {
        if let Some(angle) = self.shape.symmetric_angle() {
            self.start_radial = normalize_bearing(bisector - angle / 2.0);
            self.end_radial = normalize_bearing(bisector + angle / 2.0);
        }
    }

    /// Orient symmetric shapes from the neighbouring reference locations.
    ///
    /// Start zones face away from the outbound leg; finish lines lie beyond
    /// the finish, finish sectors face the inbound leg; turnpoints face the
    /// outside of the turn.
    pub fn set_legs(&mut self, previous: Option<&GeoPoint>, next: Option<&GeoPoint>) {
        let bisector = match (previous, next) {
            (None, Some(next)) => self.reference.bearing(next) + 180.0,
            (Some(previous), None) => match self.shape {
                OzShape::Line { .. } => previous.bearing(&self.reference),
                _ => self.reference.bearing(previous),
            },
            (Some(previous), Some(next)) => {
                let to_previous = self.reference.bearing(previous);
                let to_next = self.reference.bearing(next);
                let inside = to_previous + bearing_difference(to_previous, to_next) / 2.0;
                inside + 180.0
            }
            (None, None) => return,
        };
        self.orient(bisector);
    }

    pub fn contains(&self, location: &GeoPoint) -> bool {
        let d = self.reference.distance(location);
        let in_arc = || {
            d <= f64::EPSILON
                || bearing_in_arc(
                    self.reference.bearing(location),
                    self.start_radial,
                    self.end_radial,
                )
        };
        match self.shape {
            OzShape::Cylinder { radius } => d <= radius,
            OzShape::Line { length } => d <= length / 2.0 && in_arc(),
            OzShape::Sector { radius, .. } | OzShape::FaiSector { radius } => {
                d <= radius && in_arc()
            }
            OzShape::Keyhole {
                inner_radius,
                radius,
            } => d <= inner_radius || (d <= radius && in_arc()),
        }
    }

    pub fn is_in_sector(&self, state: &AircraftState) -> bool {
        self.contains(&state.location)
    }

    /// Distance subtracted from scored task distance for this zone.
    pub fn score_adjustment(&self) -> f64 {
        match self.shape {
            OzShape::Cylinder { radius } => radius,
            _ => 0.0,
        }
    }

    /// Extra gating on transitions; a line only counts when crossed
    /// within its length.
    pub fn transition_constraint(&self, now: &GeoPoint, last: &GeoPoint) -> bool {
        match self.shape {
            OzShape::Line { length } => {
                let half = length / 2.0;
                self.reference.distance(now) <= half && self.reference.distance(last) <= half
            }
            _ => true,
        }
    }

    pub fn transition_enter(&self, now: &AircraftState, last: &AircraftState) -> bool {
        self.is_in_sector(now)
            && !self.is_in_sector(last)
            && self.transition_constraint(&now.location, &last.location)
    }

    pub fn transition_exit(&self, now: &AircraftState, last: &AircraftState) -> bool {
        self.transition_enter(last, now)
    }

    fn arc_span(&self) -> f64 {
        let span = (self.end_radial - self.start_radial).rem_euclid(360.0);
        if span <= f64::EPSILON {
            360.0
        } else {
            span
        }
    }

    /// Point on the closed zone boundary, `t` in [0, 1].
    pub fn boundary_parametric(&self, t: f64) -> GeoPoint {
        let t = t.clamp(0.0, 1.0);
        match self.shape {
            OzShape::Cylinder { radius } => self.reference.intermediate_point(360.0 * t, radius),
            OzShape::Line { length } => {
                let half = length / 2.0;
                let left = self.reference.intermediate_point(self.start_radial, half);
                let right = self.reference.intermediate_point(self.end_radial, half);
                if t <= 0.5 {
                    left.interpolate(&right, t * 2.0)
                } else {
                    right.interpolate(&left, (t - 0.5) * 2.0)
                }
            }
            OzShape::Sector { radius, .. } | OzShape::FaiSector { radius } => {
                self.sector_boundary(t, 0.0, radius)
            }
            OzShape::Keyhole {
                inner_radius,
                radius,
            } => self.sector_boundary(t, inner_radius, radius),
        }
    }

    /// Sector outline: inner arc (outside the sector, if any), start radial,
    /// outer arc, end radial.
    fn sector_boundary(&self, t: f64, inner_radius: f64, radius: f64) -> GeoPoint {
        let span = self.arc_span();
        let inner_span = 360.0 - span;
        let radial = radius - inner_radius;
        let outer_arc = radius * span.to_radians();
        let inner_arc = inner_radius * inner_span.to_radians();
        let total = inner_arc + 2.0 * radial + outer_arc;
        if total <= f64::EPSILON {
            return self.reference;
        }

        let mut u = t * total;
        if u < inner_arc {
            let bearing = self.end_radial + inner_span * (u / inner_arc);
            return self.reference.intermediate_point(bearing, inner_radius);
        }
        u -= inner_arc;
        if u < radial {
            return self
                .reference
                .intermediate_point(self.start_radial, inner_radius + u);
        }
        u -= radial;
        if u < outer_arc {
            let bearing = self.start_radial + span * (u / outer_arc);
            return self.reference.intermediate_point(bearing, radius);
        }
        u -= outer_arc;
        self.reference
            .intermediate_point(self.end_radial, (radius - u).max(inner_radius))
    }

    /// Boundary sampled at [`BOUNDARY_STEP`].
    pub fn boundary_points(&self) -> Vec<GeoPoint> {
        let steps = (1.0 / BOUNDARY_STEP).round() as usize;
        (0..steps)
            .map(|i| self.boundary_parametric(i as f64 * BOUNDARY_STEP))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centre() -> GeoPoint {
        GeoPoint::new(7.0, 51.0)
    }

    fn at(bearing: f64, distance: f64) -> GeoPoint {
        centre().intermediate_point(bearing, distance)
    }

    fn state(location: GeoPoint) -> AircraftState {
        AircraftState::new(location, 1_000.0, 0.0)
    }

    #[test]
    fn test_cylinder_containment_and_score_adjustment() {
        let zone = ObservationZonePoint::new(centre(), OzShape::Cylinder { radius: 1_000.0 });
        assert!(zone.contains(&at(45.0, 900.0)));
        assert!(!zone.contains(&at(45.0, 1_100.0)));
        assert_eq!(zone.score_adjustment(), 1_000.0);
    }

    #[test]
    fn test_transition_exit_mirrors_enter() {
        let zone = ObservationZonePoint::new(centre(), OzShape::Cylinder { radius: 1_000.0 });
        let inside = state(at(10.0, 500.0));
        let outside = state(at(10.0, 1_500.0));
        assert!(zone.transition_enter(&inside, &outside));
        assert!(!zone.transition_enter(&outside, &inside));
        assert!(zone.transition_exit(&outside, &inside));
        assert_eq!(
            zone.transition_exit(&outside, &inside),
            zone.transition_enter(&inside, &outside)
        );
    }

    #[test]
    fn test_fai_sector_faces_outside_of_turn() {
        let mut zone = ObservationZonePoint::new(centre(), OzShape::FaiSector { radius: 10_000.0 });
        // previous to the west, next to the south: outside of the turn is north-east
        zone.set_legs(Some(&at(270.0, 50_000.0)), Some(&at(180.0, 50_000.0)));
        assert!(zone.contains(&at(45.0, 5_000.0)));
        assert!(!zone.contains(&at(225.0, 5_000.0)));
        assert!((zone.start_radial() - 0.0).abs() < 0.5 || (zone.start_radial() - 360.0).abs() < 0.5);
        assert!((zone.end_radial() - 90.0).abs() < 0.5);
    }

    #[test]
    fn test_start_line_requires_crossing_within_length() {
        let mut zone = ObservationZonePoint::new(centre(), OzShape::Line { length: 2_000.0 });
        // first leg heads north: the zone lies south of the line
        zone.set_legs(None, Some(&at(0.0, 50_000.0)));
        let south = state(at(180.0, 200.0));
        let north = state(at(0.0, 200.0));
        assert!(zone.transition_exit(&north, &south));

        let far_south = state(at(180.0, 5_000.0));
        let far_north = state(at(0.0, 5_000.0));
        assert!(!zone.transition_exit(&far_north, &far_south));
    }

    #[test]
    fn test_keyhole_includes_inner_cylinder() {
        let mut zone = ObservationZonePoint::new(
            centre(),
            OzShape::Keyhole {
                inner_radius: 500.0,
                radius: 10_000.0,
            },
        );
        zone.set_legs(Some(&at(270.0, 50_000.0)), Some(&at(180.0, 50_000.0)));
        assert!(zone.contains(&at(225.0, 400.0)));
        assert!(!zone.contains(&at(225.0, 600.0)));
        assert!(zone.contains(&at(45.0, 9_000.0)));
    }

    #[test]
    fn test_boundary_is_closed_loop_on_zone_edge() {
        let zone = ObservationZonePoint::new(centre(), OzShape::Cylinder { radius: 3_000.0 });
        let a = zone.boundary_parametric(0.0);
        let b = zone.boundary_parametric(1.0);
        assert!(a.distance(&b) < 1.0);
        for p in zone.boundary_points() {
            assert!((centre().distance(&p) - 3_000.0).abs() < 1.0);
        }
        assert_eq!(zone.boundary_points().len(), 20);
    }

    #[test]
    fn test_sector_boundary_starts_and_ends_at_reference() {
        let zone = ObservationZonePoint::new(
            centre(),
            OzShape::Sector {
                radius: 5_000.0,
                span: SectorSpan::Radials {
                    start: 0.0,
                    end: 90.0,
                },
            },
        );
        assert!(zone.boundary_parametric(0.0).distance(&centre()) < 1.0);
        assert!(zone.boundary_parametric(1.0).distance(&centre()) < 1.0);
        let mid = zone.boundary_parametric(0.5);
        assert!((centre().distance(&mid) - 5_000.0).abs() < 1.0);
    }

    #[test]
    fn test_radials_only_settable_on_sectors() {
        let mut cyl = ObservationZonePoint::new(centre(), OzShape::Cylinder { radius: 1.0 });
        assert!(!cyl.set_radials(0.0, 90.0));
        let mut sector = ObservationZonePoint::new(
            centre(),
            OzShape::Sector {
                radius: 5_000.0,
                span: SectorSpan::Symmetric { angle: 90.0 },
            },
        );
        assert!(sector.set_radials(90.0, 180.0));
        assert!(sector.contains(&at(135.0, 1_000.0)));
        assert!(!sector.contains(&at(45.0, 1_000.0)));
    }
}
