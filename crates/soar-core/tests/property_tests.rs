//! Property-based tests for geometric invariants.

use proptest::prelude::*;
use soar_core::geo::{bearing_difference, normalize_bearing};
use soar_core::{FlatGeoPoint, FlatPoint, GeoPoint, ObservationZonePoint, OzShape, TaskProjection};

fn location() -> impl Strategy<Value = GeoPoint> {
    (-30.0_f64..30.0, -60.0_f64..60.0).prop_map(|(lon, lat)| GeoPoint::new(lon, lat))
}

fn flat_geo_point() -> impl Strategy<Value = FlatGeoPoint> {
    (-10_000_000_i32..10_000_000, -10_000_000_i32..10_000_000)
        .prop_map(|(x, y)| FlatGeoPoint::new(x, y))
}

fn flat_point() -> impl Strategy<Value = FlatPoint> {
    (-1.0e7_f64..1.0e7, -1.0e7_f64..1.0e7).prop_map(|(x, y)| FlatPoint::new(x, y))
}

proptest! {
    #[test]
    fn flat_geo_distance_is_symmetric(p in flat_geo_point(), q in flat_geo_point()) {
        prop_assert_eq!(p.distance_to(&q), q.distance_to(&p));
        prop_assert_eq!(p.distance_to(&p), 0.0);
        prop_assert!(p.distance_to(&q) >= 0.0);
        if p != q {
            prop_assert!(p.distance_to(&q) > 0.0);
        }
    }

    #[test]
    fn flat_distance_is_symmetric(p in flat_point(), q in flat_point()) {
        let pq = p.distance_to(&q);
        let qp = q.distance_to(&p);
        prop_assert!((pq - qp).abs() <= 1e-9 * pq.max(1.0), "d(p,q)={} d(q,p)={}", pq, qp);
        prop_assert_eq!(p.distance_to(&p), 0.0);
    }

    #[test]
    fn distance_is_symmetric(a in location(), b in location()) {
        let ab = a.distance(&b);
        let ba = b.distance(&a);
        prop_assert!(ab >= 0.0);
        prop_assert!((ab - ba).abs() < 1e-6, "d(a,b)={} d(b,a)={}", ab, ba);
    }

    #[test]
    fn intermediate_point_travels_requested_distance(
        a in location(),
        bearing in 0.0_f64..360.0,
        distance in 10.0_f64..200_000.0,
    ) {
        let b = a.intermediate_point(bearing, distance);
        prop_assert!((a.distance(&b) - distance).abs() < 0.01 * distance.max(1.0));
    }

    #[test]
    fn bearings_normalise_into_range(deg in -2_000.0_f64..2_000.0) {
        let n = normalize_bearing(deg);
        prop_assert!((0.0..360.0).contains(&n));
        prop_assert!(bearing_difference(deg, n).abs() < 1e-9);
    }

    #[test]
    fn projection_round_trip(
        centre in location(),
        dx in -0.5_f64..0.5,
        dy in -0.5_f64..0.5,
    ) {
        let mut proj = TaskProjection::new();
        proj.reset(&centre);
        let other = GeoPoint::new(centre.longitude + dx, centre.latitude + dy);
        proj.scan_location(&other);
        proj.update_fast();

        let back = proj.funproject(&proj.fproject(&other));
        prop_assert!((back.longitude - other.longitude).abs() < 1e-9);
        prop_assert!((back.latitude - other.latitude).abs() < 1e-9);

        // integer projection loses at most half a unit per axis
        let rounded = proj.unproject(&proj.project(&other));
        prop_assert!(rounded.distance(&other) < 2.0);
    }

    #[test]
    fn cylinder_contains_points_inside_radius(
        centre in location(),
        bearing in 0.0_f64..360.0,
        fraction in 0.0_f64..0.99,
    ) {
        let radius = 5_000.0;
        let zone = ObservationZonePoint::new(centre, OzShape::Cylinder { radius });
        prop_assert!(zone.contains(&centre.intermediate_point(bearing, radius * fraction)));
        prop_assert!(!zone.contains(&centre.intermediate_point(bearing, radius * 1.05)));
    }
}
