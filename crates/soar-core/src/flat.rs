//! Planar geometry in projected task coordinates.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Integer point in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FlatGeoPoint {
    pub x: i32,
    pub y: i32,
}

impl FlatGeoPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &FlatGeoPoint) -> i64 {
        self.x as i64 * other.x as i64 + self.y as i64 * other.y as i64
    }

    pub fn cross(&self, other: &FlatGeoPoint) -> i64 {
        self.x as i64 * other.y as i64 - self.y as i64 * other.x as i64
    }

    pub fn distance_squared(&self, other: &FlatGeoPoint) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &FlatGeoPoint) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

impl Add for FlatGeoPoint {
    type Output = FlatGeoPoint;

    fn add(self, rhs: Self) -> Self::Output {
        FlatGeoPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for FlatGeoPoint {
    type Output = FlatGeoPoint;

    fn sub(self, rhs: Self) -> Self::Output {
        FlatGeoPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Floating-point point in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlatPoint {
    pub x: f64,
    pub y: f64,
}

impl FlatPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &FlatPoint) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(&self, other: &FlatPoint) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn distance_to(&self, other: &FlatPoint) -> f64 {
        (*self - *other).magnitude()
    }

    /// Rotate counter-clockwise by `angle_rad` about the origin.
    pub fn rotate(&self, angle_rad: f64) -> FlatPoint {
        let (s, c) = angle_rad.sin_cos();
        FlatPoint::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    pub fn round(&self) -> FlatGeoPoint {
        FlatGeoPoint::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<FlatGeoPoint> for FlatPoint {
    fn from(p: FlatGeoPoint) -> Self {
        FlatPoint::new(p.x as f64, p.y as f64)
    }
}

impl Add for FlatPoint {
    type Output = FlatPoint;

    fn add(self, rhs: Self) -> Self::Output {
        FlatPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for FlatPoint {
    type Output = FlatPoint;

    fn sub(self, rhs: Self) -> Self::Output {
        FlatPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for FlatPoint {
    type Output = FlatPoint;

    fn mul(self, rhs: f64) -> Self::Output {
        FlatPoint::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned box in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatBoundingBox {
    pub lower_left: FlatGeoPoint,
    pub upper_right: FlatGeoPoint,
}

impl FlatBoundingBox {
    pub fn new(point: FlatGeoPoint) -> Self {
        Self {
            lower_left: point,
            upper_right: point,
        }
    }

    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = FlatGeoPoint>,
    {
        let mut iter = points.into_iter();
        let mut bb = FlatBoundingBox::new(iter.next()?);
        for p in iter {
            bb.expand(p);
        }
        Some(bb)
    }

    pub fn expand(&mut self, p: FlatGeoPoint) {
        self.lower_left.x = self.lower_left.x.min(p.x);
        self.lower_left.y = self.lower_left.y.min(p.y);
        self.upper_right.x = self.upper_right.x.max(p.x);
        self.upper_right.y = self.upper_right.y.max(p.y);
    }

    pub fn expanded(&self, margin: i32) -> Self {
        Self {
            lower_left: FlatGeoPoint::new(self.lower_left.x - margin, self.lower_left.y - margin),
            upper_right: FlatGeoPoint::new(
                self.upper_right.x + margin,
                self.upper_right.y + margin,
            ),
        }
    }

    pub fn contains(&self, p: &FlatGeoPoint) -> bool {
        p.x >= self.lower_left.x
            && p.x <= self.upper_right.x
            && p.y >= self.lower_left.y
            && p.y <= self.upper_right.y
    }

    pub fn overlaps(&self, other: &FlatBoundingBox) -> bool {
        self.lower_left.x <= other.upper_right.x
            && other.lower_left.x <= self.upper_right.x
            && self.lower_left.y <= other.upper_right.y
            && other.lower_left.y <= self.upper_right.y
    }

    /// Gap between the boxes, zero when they overlap.
    pub fn distance(&self, other: &FlatBoundingBox) -> f64 {
        let dx = (other.lower_left.x as i64 - self.upper_right.x as i64)
            .max(self.lower_left.x as i64 - other.upper_right.x as i64)
            .max(0);
        let dy = (other.lower_left.y as i64 - self.upper_right.y as i64)
            .max(self.lower_left.y as i64 - other.upper_right.y as i64)
            .max(0);
        ((dx * dx + dy * dy) as f64).sqrt()
    }
}

/// A ray from `point` along `vector`; parameter 1 reaches `point + vector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRay {
    pub point: FlatGeoPoint,
    pub vector: FlatGeoPoint,
}

impl FlatRay {
    pub fn new(from: FlatGeoPoint, to: FlatGeoPoint) -> Self {
        Self {
            point: from,
            vector: to - from,
        }
    }

    pub fn parametric(&self, t: f64) -> FlatPoint {
        FlatPoint::from(self.point) + FlatPoint::from(self.vector) * t
    }

    /// Parameter along `self` where the two segments cross.
    ///
    /// `None` for parallel or degenerate rays and for segments that do not
    /// meet within both parameter ranges.
    pub fn intersects(&self, other: &FlatRay) -> Option<f64> {
        let denom = self.vector.cross(&other.vector);
        if denom == 0 {
            return None;
        }
        let delta = other.point - self.point;
        let ua = delta.cross(&other.vector) as f64 / denom as f64;
        if !(0.0..=1.0).contains(&ua) {
            return None;
        }
        let ub = delta.cross(&self.vector) as f64 / denom as f64;
        if !(0.0..=1.0).contains(&ub) {
            return None;
        }
        Some(ua)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_symmetric_and_zero_on_self() {
        let a = FlatGeoPoint::new(3, 4);
        let b = FlatGeoPoint::new(-2, 9);
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
        assert_eq!(a.distance_to(&a), 0.0);
        assert_eq!(FlatGeoPoint::new(0, 0).distance_to(&FlatGeoPoint::new(3, 4)), 5.0);
    }

    #[test]
    fn test_crossing_rays_meet_halfway() {
        let a = FlatRay::new(FlatGeoPoint::new(0, 0), FlatGeoPoint::new(10, 10));
        let b = FlatRay::new(FlatGeoPoint::new(0, 10), FlatGeoPoint::new(10, 0));
        let t = a.intersects(&b).expect("rays cross");
        assert!((t - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_rays_do_not_intersect() {
        let a = FlatRay::new(FlatGeoPoint::new(0, 0), FlatGeoPoint::new(10, 0));
        let b = FlatRay::new(FlatGeoPoint::new(0, 5), FlatGeoPoint::new(10, 5));
        assert_eq!(a.intersects(&b), None);
    }

    #[test]
    fn test_disjoint_segments_do_not_intersect() {
        let a = FlatRay::new(FlatGeoPoint::new(0, 0), FlatGeoPoint::new(1, 1));
        let b = FlatRay::new(FlatGeoPoint::new(5, 0), FlatGeoPoint::new(0, 5));
        assert_eq!(a.intersects(&b), None);
    }

    #[test]
    fn test_bounding_box_distance() {
        let a = FlatBoundingBox::from_points([FlatGeoPoint::new(0, 0), FlatGeoPoint::new(2, 2)])
            .unwrap();
        let b = FlatBoundingBox::new(FlatGeoPoint::new(5, 6));
        assert!(!a.overlaps(&b));
        assert_eq!(a.distance(&b), 5.0);
        assert!(a.expanded(4).contains(&FlatGeoPoint::new(5, 6)));
    }
}
