//! Assigned-area targets and the isoline of equal double-leg distance.

use crate::flat::FlatPoint;
use crate::geo::GeoPoint;
use crate::projection::TaskProjection;
use crate::zone::ObservationZonePoint;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

const ISOLINE_SAMPLES: usize = 64;
const BISECTION_STEPS: usize = 24;

/// Floating target inside an assigned area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AatTarget {
    pub location: GeoPoint,
    pub locked: bool,
}

impl AatTarget {
    pub fn new(location: GeoPoint) -> Self {
        Self {
            location,
            locked: false,
        }
    }
}

/// Distance `previous -> candidate -> next`.
pub fn double_leg_distance(previous: &GeoPoint, candidate: &GeoPoint, next: &GeoPoint) -> f64 {
    previous.distance(candidate) + candidate.distance(next)
}

/// Ellipse in projected coordinates with foci `f1`, `f2` through `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatEllipse {
    center: FlatPoint,
    axis: FlatPoint,
    semi_major: f64,
    semi_minor: f64,
}

impl FlatEllipse {
    pub fn new(f1: FlatPoint, f2: FlatPoint, p: FlatPoint) -> Self {
        let center = (f1 + f2) * 0.5;
        let focal = f2 - f1;
        let half_focal = focal.magnitude() / 2.0;
        let axis = if half_focal > f64::EPSILON {
            focal * (0.5 / half_focal)
        } else {
            FlatPoint::new(1.0, 0.0)
        };
        let semi_major = (p.distance_to(&f1) + p.distance_to(&f2)) / 2.0;
        let semi_minor = (semi_major * semi_major - half_focal * half_focal)
            .max(0.0)
            .sqrt();
        Self {
            center,
            axis,
            semi_major,
            semi_minor,
        }
    }

    pub fn parametric(&self, theta: f64) -> FlatPoint {
        let normal = FlatPoint::new(-self.axis.y, self.axis.x);
        self.center
            + self.axis * (self.semi_major * theta.cos())
            + normal * (self.semi_minor * theta.sin())
    }

    /// Eccentric anomaly of a point on (or near) the ellipse.
    pub fn angle_of(&self, p: &FlatPoint) -> f64 {
        let rel = *p - self.center;
        let normal = FlatPoint::new(-self.axis.y, self.axis.x);
        let x = rel.dot(&self.axis);
        let y = rel.dot(&normal);
        let cos = if self.semi_major > f64::EPSILON {
            x / self.semi_major
        } else {
            0.0
        };
        if self.semi_minor <= f64::EPSILON {
            // flattened onto the focal segment
            return cos.clamp(-1.0, 1.0).acos();
        }
        (y / self.semi_minor).atan2(cos).rem_euclid(TAU)
    }
}

/// Arc of the equal double-leg ellipse through the target, clipped to the
/// observation zone.
#[derive(Debug, Clone, PartialEq)]
pub struct AatIsolineSegment {
    ellipse: FlatEllipse,
    projection: TaskProjection,
    /// (down crossing, up crossing) angles, up > down
    span: Option<(f64, f64)>,
}

impl AatIsolineSegment {
    pub fn new(
        previous: &GeoPoint,
        target: &GeoPoint,
        next: &GeoPoint,
        zone: &ObservationZonePoint,
        projection: &TaskProjection,
    ) -> Self {
        let ellipse = FlatEllipse::new(
            projection.fproject(previous),
            projection.fproject(next),
            projection.fproject(target),
        );
        let mut segment = Self {
            ellipse,
            projection: projection.clone(),
            span: None,
        };
        if zone.contains(target) {
            let start = ellipse.angle_of(&projection.fproject(target));
            segment.span = segment.find_crossings(start, zone);
        }
        segment
    }

    fn inside(&self, theta: f64, zone: &ObservationZonePoint) -> bool {
        zone.contains(&self.location_at(theta))
    }

    fn location_at(&self, theta: f64) -> GeoPoint {
        self.projection.funproject(&self.ellipse.parametric(theta))
    }

    /// Walk both ways from `start` until the zone is left, then bisect onto
    /// the boundary.
    fn find_crossings(&self, start: f64, zone: &ObservationZonePoint) -> Option<(f64, f64)> {
        let step = TAU / ISOLINE_SAMPLES as f64;
        let search = |direction: f64| -> Option<f64> {
            let mut inside_at = start;
            for i in 1..ISOLINE_SAMPLES {
                let theta = start + direction * step * i as f64;
                if !self.inside(theta, zone) {
                    return Some(self.bisect(inside_at, theta, zone));
                }
                inside_at = theta;
            }
            None
        };
        let up = search(1.0)?;
        let down = search(-1.0)?;
        (up > down).then_some((down, up))
    }

    fn bisect(&self, mut inside: f64, mut outside: f64, zone: &ObservationZonePoint) -> f64 {
        for _ in 0..BISECTION_STEPS {
            let mid = (inside + outside) / 2.0;
            if self.inside(mid, zone) {
                inside = mid;
            } else {
                outside = mid;
            }
        }
        inside
    }

    pub fn valid(&self) -> bool {
        self.span.is_some()
    }

    /// Location along the segment, `t` in [0, 1]. `None` unless valid.
    pub fn parametric(&self, t: f64) -> Option<GeoPoint> {
        let (down, up) = self.span?;
        let theta = down + (up - down) * t.clamp(0.0, 1.0);
        Some(self.location_at(theta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::OzShape;

    fn setup(radius: f64) -> (GeoPoint, GeoPoint, GeoPoint, ObservationZonePoint, TaskProjection) {
        let centre = GeoPoint::new(7.0, 51.0);
        let previous = centre.intermediate_point(270.0, 40_000.0);
        let next = centre.intermediate_point(90.0, 40_000.0);
        let zone = ObservationZonePoint::new(centre, OzShape::Cylinder { radius });
        let mut proj = TaskProjection::new();
        proj.reset(&previous);
        proj.scan_location(&next);
        proj.scan_location(&centre.intermediate_point(0.0, 20_000.0));
        proj.scan_location(&centre.intermediate_point(180.0, 20_000.0));
        proj.update_fast();
        (centre, previous, next, zone, proj)
    }

    #[test]
    fn test_double_leg_through_midpoint_is_shortest() {
        let (centre, previous, next, _, _) = setup(5_000.0);
        let off = centre.intermediate_point(0.0, 5_000.0);
        assert!(
            double_leg_distance(&previous, &centre, &next)
                < double_leg_distance(&previous, &off, &next)
        );
    }

    #[test]
    fn test_isoline_through_centre_spans_cylinder() {
        let (centre, previous, next, zone, proj) = setup(5_000.0);
        let seg = AatIsolineSegment::new(&previous, &centre, &next, &zone, &proj);
        assert!(seg.valid());
        let ends = [seg.parametric(0.0), seg.parametric(1.0)];
        for end in ends.into_iter().flatten() {
            assert!((centre.distance(&end) - 5_000.0).abs() < 100.0);
        }
    }

    #[test]
    fn test_isoline_invalid_when_target_outside_zone() {
        let (centre, previous, next, zone, proj) = setup(5_000.0);
        let outside = centre.intermediate_point(0.0, 8_000.0);
        let seg = AatIsolineSegment::new(&previous, &outside, &next, &zone, &proj);
        assert!(!seg.valid());
        assert_eq!(seg.parametric(0.5), None);
    }

    #[test]
    fn test_isoline_invalid_when_zone_swallows_ellipse() {
        let (centre, previous, next, zone, proj) = setup(200_000.0);
        let seg = AatIsolineSegment::new(&previous, &centre, &next, &zone, &proj);
        assert!(!seg.valid());
    }
}
