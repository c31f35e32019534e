//! Synthetic glider flights.

pub mod paths;
pub mod scenarios;

pub use paths::{CircularPath, FlightPath, RoutePath};
pub use scenarios::{
    create_aat_scenario, create_thermal_scenario, create_triangle_scenario, Scenario,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use soar_core::AircraftState;
use std::sync::Arc;

/// Samples a flight path at a fixed interval, optionally adding random
/// vertical gusts to the altitude.
pub struct Simulator {
    path: Arc<dyn FlightPath>,
    interval: f64,
    altitude_noise_m: f64,
    rng: StdRng,
    t: f64,
}

impl Simulator {
    pub fn new(path: Arc<dyn FlightPath>, interval: f64, seed: u64) -> Self {
        Self {
            path,
            interval: interval.max(0.1),
            altitude_noise_m: 0.0,
            rng: StdRng::seed_from_u64(seed),
            t: 0.0,
        }
    }

    pub fn with_altitude_noise(mut self, noise_m: f64) -> Self {
        self.altitude_noise_m = noise_m.max(0.0);
        self
    }
}

impl Iterator for Simulator {
    type Item = AircraftState;

    fn next(&mut self) -> Option<AircraftState> {
        if self.t > self.path.duration() {
            return None;
        }
        let mut state = self.path.state_at(self.t);
        if self.altitude_noise_m > 0.0 {
            state.altitude += self
                .rng
                .random_range(-self.altitude_noise_m..=self.altitude_noise_m);
        }
        self.t += self.interval;
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soar_core::GeoPoint;

    fn straight() -> Arc<dyn FlightPath> {
        let a = GeoPoint::new(9.0, 47.5);
        Arc::new(RoutePath::new(
            vec![a, a.intermediate_point(45.0, 3_000.0)],
            30.0,
            1_000.0,
            0.0,
        ))
    }

    #[test]
    fn test_simulator_covers_path() {
        let states: Vec<_> = Simulator::new(straight(), 7.0, 1).collect();
        assert_eq!(states.len(), 15);
        assert_eq!(states[3].time, 21.0);
    }

    #[test]
    fn test_noise_is_bounded_and_seeded() {
        let a: Vec<f64> = Simulator::new(straight(), 5.0, 42)
            .with_altitude_noise(20.0)
            .map(|s| s.altitude)
            .collect();
        let b: Vec<f64> = Simulator::new(straight(), 5.0, 42)
            .with_altitude_noise(20.0)
            .map(|s| s.altitude)
            .collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|alt| (alt - 1_000.0).abs() <= 20.0));
    }
}
