//! Flat-earth projection of a task's bounding region.
//!
//! The projection must be finalised with [`TaskProjection::update_fast`]
//! after the bounds are scanned. Each finalisation that changes the
//! parameters bumps the [`ProjectionEpoch`]; projected polygons remember the
//! epoch they were computed against and re-project when it moves on.

use crate::flat::{FlatGeoPoint, FlatPoint};
use crate::geo::{GeoPoint, EARTH_RADIUS_M};
use serde::{Deserialize, Serialize};

/// Projected units per degree of latitude (~1.1 m per unit).
pub const FLAT_SCALE: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ProjectionEpoch(u64);

impl ProjectionEpoch {
    fn next(self) -> Self {
        ProjectionEpoch(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskProjection {
    location_min: GeoPoint,
    location_max: GeoPoint,
    location_mid: GeoPoint,
    cos_midloc: f64,
    epoch: ProjectionEpoch,
    finalised: bool,
}

impl Default for TaskProjection {
    fn default() -> Self {
        Self {
            location_min: GeoPoint::default(),
            location_max: GeoPoint::default(),
            location_mid: GeoPoint::default(),
            cos_midloc: 1.0,
            epoch: ProjectionEpoch::default(),
            finalised: false,
        }
    }
}

impl TaskProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the bounds with a single location.
    pub fn reset(&mut self, reference: &GeoPoint) {
        self.location_min = *reference;
        self.location_max = *reference;
    }

    /// Widen the bounds to include `reference`. Does not touch the projection.
    pub fn scan_location(&mut self, reference: &GeoPoint) {
        self.location_min.longitude = self.location_min.longitude.min(reference.longitude);
        self.location_min.latitude = self.location_min.latitude.min(reference.latitude);
        self.location_max.longitude = self.location_max.longitude.max(reference.longitude);
        self.location_max.latitude = self.location_max.latitude.max(reference.latitude);
    }

    /// Recompute midpoint and longitude scale from the scanned bounds.
    ///
    /// Returns true when the projection changed (and the epoch moved on).
    pub fn update_fast(&mut self) -> bool {
        let mid = self.location_min.midpoint(&self.location_max);
        let cos_midloc = mid.latitude.to_radians().cos().max(1e-6);
        if self.finalised && mid == self.location_mid && cos_midloc == self.cos_midloc {
            return false;
        }
        self.location_mid = mid;
        self.cos_midloc = cos_midloc;
        self.epoch = self.epoch.next();
        self.finalised = true;
        tracing::debug!(
            lat = mid.latitude,
            lon = mid.longitude,
            epoch = self.epoch.0,
            "task projection updated"
        );
        true
    }

    pub fn is_finalised(&self) -> bool {
        self.finalised
    }

    pub fn epoch(&self) -> ProjectionEpoch {
        self.epoch
    }

    pub fn center(&self) -> GeoPoint {
        self.location_mid
    }

    pub fn bounds(&self) -> (GeoPoint, GeoPoint) {
        (self.location_min, self.location_max)
    }

    pub fn fproject(&self, location: &GeoPoint) -> FlatPoint {
        FlatPoint::new(
            (location.longitude - self.location_mid.longitude) * self.cos_midloc * FLAT_SCALE,
            (location.latitude - self.location_mid.latitude) * FLAT_SCALE,
        )
    }

    pub fn project(&self, location: &GeoPoint) -> FlatGeoPoint {
        self.fproject(location).round()
    }

    pub fn funproject(&self, point: &FlatPoint) -> GeoPoint {
        GeoPoint::new(
            point.x / (FLAT_SCALE * self.cos_midloc) + self.location_mid.longitude,
            point.y / FLAT_SCALE + self.location_mid.latitude,
        )
    }

    pub fn unproject(&self, point: &FlatGeoPoint) -> GeoPoint {
        self.funproject(&FlatPoint::from(*point))
    }

    /// Physical distance (m) expressed in projected units at `location`.
    pub fn fproject_range(&self, location: &GeoPoint, distance_m: f64) -> f64 {
        let north = location.intermediate_point(0.0, distance_m);
        (north.latitude - location.latitude).abs() * FLAT_SCALE
    }

    pub fn project_range(&self, location: &GeoPoint, distance_m: f64) -> u32 {
        self.fproject_range(location, distance_m).round() as u32
    }

    /// Inverse of [`fproject_range`](Self::fproject_range) along a meridian.
    pub fn flat_to_meters(&self, units: f64) -> f64 {
        (units / FLAT_SCALE).to_radians() * EARTH_RADIUS_M
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned(points: &[GeoPoint]) -> TaskProjection {
        let mut proj = TaskProjection::new();
        proj.reset(&points[0]);
        for p in points {
            proj.scan_location(p);
        }
        proj.update_fast();
        proj
    }

    #[test]
    fn test_round_trip_within_rounding_tolerance() {
        let a = GeoPoint::new(7.1, 51.0);
        let b = GeoPoint::new(8.4, 52.3);
        let proj = scanned(&[a, b]);
        for p in [a, b, GeoPoint::new(7.77, 51.61)] {
            let back = proj.unproject(&proj.project(&p));
            assert!((back.longitude - p.longitude).abs() < 2e-5);
            assert!((back.latitude - p.latitude).abs() < 1e-5);
        }
    }

    #[test]
    fn test_epoch_moves_only_when_projection_changes() {
        let mut proj = scanned(&[GeoPoint::new(7.0, 51.0), GeoPoint::new(8.0, 52.0)]);
        let first = proj.epoch();
        assert!(!proj.update_fast());
        assert_eq!(proj.epoch(), first);

        proj.scan_location(&GeoPoint::new(9.0, 52.0));
        assert!(proj.update_fast());
        assert!(proj.epoch() > first);
    }

    #[test]
    fn test_scan_does_not_move_projection_until_finalised() {
        let mut proj = scanned(&[GeoPoint::new(7.0, 51.0)]);
        let centre = proj.center();
        proj.scan_location(&GeoPoint::new(10.0, 55.0));
        assert_eq!(proj.center(), centre);
    }

    #[test]
    fn test_range_matches_distance() {
        let a = GeoPoint::new(7.0, 51.0);
        let proj = scanned(&[a]);
        let units = proj.fproject_range(&a, 10_000.0);
        let b = a.intermediate_point(0.0, 10_000.0);
        let flat = proj.project(&a).distance_to(&proj.project(&b));
        assert!((units - flat).abs() < 2.0);
        assert!((proj.flat_to_meters(units) - 10_000.0).abs() < 1.0);
    }
}
