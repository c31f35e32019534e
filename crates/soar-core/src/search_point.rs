//! Projected sample polygons used for zone containment and distance search.

use crate::flat::{FlatBoundingBox, FlatGeoPoint};
use crate::geo::GeoPoint;
use crate::projection::{ProjectionEpoch, TaskProjection};

/// A polygon vertex: geodetic location plus its projection.
///
/// `actual` marks points that were really flown through, as opposed to
/// points generated from a zone boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchPoint {
    location: GeoPoint,
    flat: FlatGeoPoint,
    actual: bool,
}

impl SearchPoint {
    pub fn new(location: GeoPoint, projection: &TaskProjection, actual: bool) -> Self {
        Self {
            location,
            flat: projection.project(&location),
            actual,
        }
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    pub fn flat(&self) -> FlatGeoPoint {
        self.flat
    }

    pub fn is_actual(&self) -> bool {
        self.actual
    }

    pub fn project(&mut self, projection: &TaskProjection) {
        self.flat = projection.project(&self.location);
    }
}

/// Ordered set of search points, pruned to its convex hull on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPointVector {
    points: Vec<SearchPoint>,
    epoch: Option<ProjectionEpoch>,
}

impl SearchPointVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SearchPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchPoint> {
        self.points.iter()
    }

    pub fn last(&self) -> Option<&SearchPoint> {
        self.points.last()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Drop everything but the most recent point.
    pub fn keep_last(&mut self) {
        let n = self.points.len();
        if n > 1 {
            self.points.drain(..n - 1);
        }
    }

    /// Replace the contents with a single point.
    pub fn replace_with(&mut self, point: SearchPoint) {
        self.points.clear();
        self.points.push(point);
    }

    /// Append a point projected with `projection`.
    pub fn push_location(&mut self, location: GeoPoint, projection: &TaskProjection, actual: bool) {
        self.ensure_projected(projection);
        self.points.push(SearchPoint::new(location, projection, actual));
    }

    pub fn epoch(&self) -> Option<ProjectionEpoch> {
        self.epoch
    }

    /// Re-project every point and record the projection epoch.
    pub fn project(&mut self, projection: &TaskProjection) {
        for p in &mut self.points {
            p.project(projection);
        }
        self.epoch = Some(projection.epoch());
    }

    /// Re-project only when the projection has moved on. Returns true if it did.
    pub fn ensure_projected(&mut self, projection: &TaskProjection) -> bool {
        if self.epoch == Some(projection.epoch()) {
            return false;
        }
        self.project(projection);
        true
    }

    /// Remove all points strictly inside the convex hull (and collinear
    /// boundary points). Returns true if anything was removed.
    ///
    /// Monotone-chain variant of the Graham scan; the hull is left in
    /// counter-clockwise order.
    pub fn prune_interior(&mut self) -> bool {
        let before = self.points.len();
        if before < 3 {
            return false;
        }

        let mut sorted = self.points.clone();
        sorted.sort_by(|a, b| (a.flat.x, a.flat.y).cmp(&(b.flat.x, b.flat.y)));
        sorted.dedup_by(|a, b| a.flat == b.flat);
        if sorted.len() < 3 {
            let changed = sorted.len() != before;
            self.points = sorted;
            return changed;
        }

        fn turn(o: &SearchPoint, a: &SearchPoint, b: &SearchPoint) -> i64 {
            (a.flat - o.flat).cross(&(b.flat - o.flat))
        }

        let mut hull: Vec<SearchPoint> = Vec::with_capacity(sorted.len() * 2);
        for p in &sorted {
            while hull.len() >= 2 && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0 {
                hull.pop();
            }
            hull.push(*p);
        }
        let lower_len = hull.len() + 1;
        for p in sorted.iter().rev().skip(1) {
            while hull.len() >= lower_len
                && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0
            {
                hull.pop();
            }
            hull.push(*p);
        }
        hull.pop();

        let changed = hull.len() != before;
        self.points = hull;
        changed
    }

    /// Drop vertices with the least hull area contribution until at most
    /// `max` remain.
    pub fn thin_to(&mut self, max: usize) -> bool {
        if self.points.len() <= max {
            return false;
        }
        while self.points.len() > max.max(1) {
            let n = self.points.len();
            let mut weakest = 0;
            let mut weakest_area = i64::MAX;
            for i in 0..n {
                let prev = self.points[(i + n - 1) % n].flat;
                let next = self.points[(i + 1) % n].flat;
                let area = (self.points[i].flat - prev).cross(&(next - prev)).abs();
                if area < weakest_area {
                    weakest_area = area;
                    weakest = i;
                }
            }
            self.points.remove(weakest);
        }
        true
    }

    /// Point-in-polygon for a hull in counter-clockwise order.
    pub fn is_inside(&self, p: &FlatGeoPoint) -> bool {
        match self.points.len() {
            0 => false,
            1 => self.points[0].flat == *p,
            2 => {
                let a = self.points[0].flat;
                let b = self.points[1].flat;
                (b - a).cross(&(*p - a)) == 0
                    && FlatBoundingBox::from_points([a, b]).is_some_and(|bb| bb.contains(p))
            }
            n => (0..n).all(|i| {
                let a = self.points[i].flat;
                let b = self.points[(i + 1) % n].flat;
                (b - a).cross(&(*p - a)) >= 0
            }),
        }
    }

    pub fn nearest(&self, p: &FlatGeoPoint) -> Option<&SearchPoint> {
        self.points
            .iter()
            .min_by_key(|sp| sp.flat.distance_squared(p))
    }

    pub fn farthest(&self, p: &FlatGeoPoint) -> Option<&SearchPoint> {
        self.points
            .iter()
            .max_by_key(|sp| sp.flat.distance_squared(p))
    }

    pub fn bounding_box(&self) -> Option<FlatBoundingBox> {
        FlatBoundingBox::from_points(self.points.iter().map(|p| p.flat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_centre() -> (TaskProjection, SearchPointVector) {
        let mut proj = TaskProjection::new();
        proj.reset(&GeoPoint::new(7.0, 51.0));
        proj.scan_location(&GeoPoint::new(7.1, 51.1));
        proj.update_fast();

        let mut v = SearchPointVector::new();
        for (lon, lat) in [
            (7.0, 51.0),
            (7.1, 51.0),
            (7.05, 51.05),
            (7.1, 51.1),
            (7.0, 51.1),
            (7.05, 51.0),
        ] {
            v.push_location(GeoPoint::new(lon, lat), &proj, true);
        }
        (proj, v)
    }

    #[test]
    fn test_prune_keeps_only_hull_corners() {
        let (_, mut v) = square_with_centre();
        assert!(v.prune_interior());
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn test_inside_test_after_pruning() {
        let (proj, mut v) = square_with_centre();
        v.prune_interior();
        assert!(v.is_inside(&proj.project(&GeoPoint::new(7.05, 51.05))));
        assert!(!v.is_inside(&proj.project(&GeoPoint::new(7.2, 51.05))));
    }

    #[test]
    fn test_reprojects_when_epoch_changes() {
        let (mut proj, mut v) = square_with_centre();
        assert!(!v.ensure_projected(&proj));
        proj.scan_location(&GeoPoint::new(8.0, 52.0));
        proj.update_fast();
        assert!(v.ensure_projected(&proj));
        assert_eq!(v.epoch(), Some(proj.epoch()));
        assert_eq!(v.points()[0].flat(), proj.project(&GeoPoint::new(7.0, 51.0)));
    }

    #[test]
    fn test_thinning_respects_cap() {
        let mut proj = TaskProjection::new();
        let centre = GeoPoint::new(7.0, 51.0);
        proj.reset(&centre);
        proj.update_fast();
        let mut v = SearchPointVector::new();
        for i in 0..100 {
            let p = centre.intermediate_point(i as f64 * 3.6, 5_000.0);
            v.push_location(p, &proj, false);
        }
        v.prune_interior();
        assert!(v.thin_to(64));
        assert_eq!(v.len(), 64);
    }
}
