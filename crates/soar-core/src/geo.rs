//! Geodetic primitives and great-circle math.
//!
//! Bearings on the public surface are in degrees (0 = north, clockwise),
//! distances in meters.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A location on the earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Initial bearing towards `other` in degrees, normalised to [0, 360).
    pub fn bearing(&self, other: &GeoPoint) -> f64 {
        normalize_bearing(
            bearing(self.latitude, self.longitude, other.latitude, other.longitude).to_degrees(),
        )
    }

    pub fn vector_to(&self, other: &GeoPoint) -> GeoVector {
        GeoVector::between(self, other)
    }

    /// Point reached by travelling `distance_m` along `bearing_deg`.
    pub fn intermediate_point(&self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        let (lat, lon) = offset_by_bearing(
            self.latitude,
            self.longitude,
            distance_m,
            bearing_deg.to_radians(),
        );
        GeoPoint::new(lon, lat)
    }

    /// Linear interpolation in degrees; adequate over task-leg distances.
    pub fn interpolate(&self, other: &GeoPoint, t: f64) -> GeoPoint {
        GeoPoint::new(
            self.longitude + (other.longitude - self.longitude) * t,
            self.latitude + (other.latitude - self.latitude) * t,
        )
    }

    pub fn midpoint(&self, other: &GeoPoint) -> GeoPoint {
        self.interpolate(other, 0.5)
    }

    /// Along-track distance of this point projected onto the great circle
    /// `from` -> `to`, measured from `from`. Negative when behind `from`.
    pub fn projected_distance(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        let d13 = from.distance(self) / EARTH_RADIUS_M;
        if d13 <= f64::EPSILON {
            return 0.0;
        }
        let theta = (from.bearing(self) - from.bearing(to)).to_radians();
        let cross = (d13.sin() * theta.sin()).clamp(-1.0, 1.0).asin();
        let cos_cross = cross.cos();
        if cos_cross.abs() <= f64::EPSILON {
            return 0.0;
        }
        let along = (d13.cos() / cos_cross).clamp(-1.0, 1.0).acos() * EARTH_RADIUS_M;
        if theta.cos() < 0.0 {
            -along
        } else {
            along
        }
    }
}

/// Distance and initial bearing between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoVector {
    pub distance: f64,
    pub bearing: f64,
}

impl GeoVector {
    pub const fn new(distance: f64, bearing: f64) -> Self {
        Self { distance, bearing }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn between(origin: &GeoPoint, destination: &GeoPoint) -> Self {
        Self {
            distance: origin.distance(destination),
            bearing: origin.bearing(destination),
        }
    }

    pub fn end_point(&self, origin: &GeoPoint) -> GeoPoint {
        origin.intermediate_point(self.bearing, self.distance)
    }
}

/// Normalise a bearing in degrees to [0, 360).
pub fn normalize_bearing(deg: f64) -> f64 {
    let b = deg.rem_euclid(360.0);
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

/// Signed smallest difference `to - from` in degrees, in (-180, 180].
pub fn bearing_difference(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Whether `bearing_deg` lies on the clockwise arc from `start` to `end`.
pub fn bearing_in_arc(bearing_deg: f64, start: f64, end: f64) -> bool {
    let span = (end - start).rem_euclid(360.0);
    if span <= f64::EPSILON {
        return true;
    }
    (bearing_deg - start).rem_euclid(360.0) <= span
}

/// Calculate distance between two points in meters using Haversine formula.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Calculate bearing from point 1 to point 2 in radians.
/// Returns bearing in radians, 0 = north, π/2 = east.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_m` - Distance in meters
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn test_distance_same_point() {
        let p = GeoPoint::new(7.5, 51.2);
        assert!(p.distance(&p) < 0.001);
    }

    #[test]
    fn test_bearing_is_normalised() {
        let a = GeoPoint::new(7.0, 51.0);
        let west = GeoPoint::new(6.0, 51.0);
        let b = a.bearing(&west);
        assert!((b - 270.0).abs() < 1.0, "got {b}");
    }

    #[test]
    fn test_intermediate_point_round_trips_distance_and_bearing() {
        let origin = GeoPoint::new(10.0, 45.0);
        let p = origin.intermediate_point(60.0, 25_000.0);
        assert!((origin.distance(&p) - 25_000.0).abs() < 1.0);
        assert!((origin.bearing(&p) - 60.0).abs() < 0.1);
    }

    #[test]
    fn test_projected_distance_along_meridian() {
        let from = GeoPoint::new(0.0, 0.0);
        let to = GeoPoint::new(0.0, 1.0);
        let p = GeoPoint::new(0.01, 0.5);
        let d = p.projected_distance(&from, &to);
        assert!((d - 55_597.0).abs() < 50.0, "got {d}");

        let behind = GeoPoint::new(0.0, -0.1);
        assert!(behind.projected_distance(&from, &to) < 0.0);
    }

    #[test]
    fn test_bearing_arc_wraps_through_north() {
        assert!(bearing_in_arc(10.0, 315.0, 45.0));
        assert!(bearing_in_arc(350.0, 315.0, 45.0));
        assert!(!bearing_in_arc(180.0, 315.0, 45.0));
        assert!((bearing_difference(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((bearing_difference(10.0, 350.0) + 20.0).abs() < 1e-9);
    }
}
