//! Flight path implementations.

use soar_core::geo::normalize_bearing;
use soar_core::{AircraftState, GeoPoint};

/// Trait for flight path implementations.
pub trait FlightPath: Send + Sync {
    /// Aircraft state `t` seconds after the start of the path.
    fn state_at(&self, t: f64) -> AircraftState;

    /// Seconds until the path ends.
    fn duration(&self) -> f64;
}

/// Straight glides along a sequence of locations at constant speed, losing
/// height at a fixed glide ratio.
#[derive(Debug, Clone)]
pub struct RoutePath {
    route: Vec<GeoPoint>,
    cumulative: Vec<f64>,
    pub speed_mps: f64,
    pub start_altitude_m: f64,
    pub glide_ratio: f64,
}

impl RoutePath {
    pub fn new(route: Vec<GeoPoint>, speed_mps: f64, start_altitude_m: f64, glide_ratio: f64) -> Self {
        let mut cumulative = Vec::with_capacity(route.len());
        let mut total = 0.0;
        for (i, location) in route.iter().enumerate() {
            if let Some(previous) = i.checked_sub(1).map(|j| &route[j]) {
                total += previous.distance(location);
            }
            cumulative.push(total);
        }
        Self {
            route,
            cumulative,
            speed_mps,
            start_altitude_m,
            glide_ratio,
        }
    }

    /// Total route length in meters.
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    fn location_at_distance(&self, distance: f64) -> GeoPoint {
        let (Some(first), Some(last)) = (self.route.first(), self.route.last()) else {
            return GeoPoint::default();
        };
        let i = self.cumulative.partition_point(|&c| c < distance);
        if i == 0 {
            return *first;
        }
        if i >= self.route.len() {
            return *last;
        }
        let from = self.route[i - 1];
        let to = self.route[i];
        from.intermediate_point(from.bearing(&to), distance - self.cumulative[i - 1])
    }
}

impl FlightPath for RoutePath {
    fn state_at(&self, t: f64) -> AircraftState {
        let length = self.length();
        let distance = (t.max(0.0) * self.speed_mps).min(length);
        let location = self.location_at_distance(distance);
        let ahead = self.location_at_distance((distance + 10.0).min(length));
        let track = if location.distance(&ahead) > 1e-3 {
            location.bearing(&ahead)
        } else {
            0.0
        };
        let loss = if self.glide_ratio > 0.0 {
            distance / self.glide_ratio
        } else {
            0.0
        };
        AircraftState::new(location, self.start_altitude_m - loss, t)
            .with_motion(self.speed_mps, track)
    }

    fn duration(&self) -> f64 {
        if self.speed_mps > 0.0 {
            self.length() / self.speed_mps
        } else {
            0.0
        }
    }
}

/// Thermalling circle with a constant climb rate.
#[derive(Debug, Clone)]
pub struct CircularPath {
    pub center: GeoPoint,
    pub radius_m: f64,
    pub speed_mps: f64,
    pub start_altitude_m: f64,
    pub climb_mps: f64,
    pub clockwise: bool,
    duration: f64,
}

impl CircularPath {
    pub fn new(
        center: GeoPoint,
        radius_m: f64,
        speed_mps: f64,
        start_altitude_m: f64,
        climb_mps: f64,
        duration: f64,
    ) -> Self {
        Self {
            center,
            radius_m,
            speed_mps,
            start_altitude_m,
            climb_mps,
            clockwise: true,
            duration,
        }
    }

    pub fn counter_clockwise(mut self) -> Self {
        self.clockwise = false;
        self
    }

    /// Seconds for one full turn.
    pub fn period(&self) -> f64 {
        if self.speed_mps > 0.0 {
            2.0 * std::f64::consts::PI * self.radius_m / self.speed_mps
        } else {
            f64::INFINITY
        }
    }
}

impl FlightPath for CircularPath {
    fn state_at(&self, t: f64) -> AircraftState {
        let turned = if self.radius_m > 0.0 {
            (self.speed_mps * t / self.radius_m).to_degrees()
        } else {
            0.0
        };
        let (radial, track) = if self.clockwise {
            (turned, turned + 90.0)
        } else {
            (-turned, -turned - 90.0)
        };
        let location = self
            .center
            .intermediate_point(normalize_bearing(radial), self.radius_m);
        AircraftState::new(location, self.start_altitude_m + self.climb_mps * t, t)
            .with_motion(self.speed_mps, normalize_bearing(track))
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}
