//! MacCready glide model used as a pure-function glide solver.
//!
//! The polar is a quadratic sink curve `w(v) = a·v² + b·v + c` (m/s, sink
//! positive). Solutions assume still air.

use crate::aircraft::AircraftState;
use crate::geo::{GeoPoint, GeoVector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlidePolar {
    mc: f64,
    a: f64,
    b: f64,
    c: f64,
}

impl Default for GlidePolar {
    /// Standard-class sailplane: best L/D ~40 at 28 m/s, min sink ~0.63 m/s.
    fn default() -> Self {
        Self::new(0.0, 0.002_083, -0.091_67, 1.633)
    }
}

impl GlidePolar {
    pub fn new(mc: f64, a: f64, b: f64, c: f64) -> Self {
        Self {
            mc: mc.max(0.0),
            a,
            b,
            c,
        }
    }

    pub fn mc(&self) -> f64 {
        self.mc
    }

    pub fn set_mc(&mut self, mc: f64) {
        self.mc = mc.max(0.0);
    }

    pub fn with_mc(&self, mc: f64) -> Self {
        let mut polar = *self;
        polar.set_mc(mc);
        polar
    }

    pub fn sink_rate(&self, speed: f64) -> f64 {
        self.a * speed * speed + self.b * speed + self.c
    }

    /// Speed to fly between climbs at the current MacCready setting.
    pub fn speed_to_fly(&self) -> f64 {
        ((self.c + self.mc) / self.a).sqrt()
    }

    pub fn v_best_ld(&self) -> f64 {
        (self.c / self.a).sqrt()
    }

    pub fn best_ld(&self) -> f64 {
        let v = self.v_best_ld();
        v / self.sink_rate(v)
    }

    /// Glide ratio flown at the MacCready speed to fly.
    pub fn glide_ratio(&self) -> f64 {
        let v = self.speed_to_fly();
        v / self.sink_rate(v)
    }

    /// Solve a glide from `state` to `destination` arriving at
    /// `destination_altitude` (already including any safety margin).
    pub fn solve(
        &self,
        state: &AircraftState,
        destination: &GeoPoint,
        destination_altitude: f64,
    ) -> GlideResult {
        let vector = GeoVector::between(&state.location, destination);
        self.solve_vector(state, vector, destination_altitude)
    }

    pub fn solve_vector(
        &self,
        state: &AircraftState,
        vector: GeoVector,
        destination_altitude: f64,
    ) -> GlideResult {
        let v = self.speed_to_fly();
        let height_glide = vector.distance / self.glide_ratio();
        let altitude_required = destination_altitude + height_glide;
        let altitude_difference = state.altitude - altitude_required;
        let cruise_time = if v > 0.0 { vector.distance / v } else { 0.0 };

        if altitude_difference >= 0.0 {
            return GlideResult {
                validity: GlideValidity::Ok,
                vector,
                v_opt: v,
                height_glide,
                height_climb: 0.0,
                altitude_required,
                altitude_difference,
                time_elapsed: cruise_time,
            };
        }

        if self.mc <= 0.0 {
            return GlideResult {
                validity: GlideValidity::NoSolution,
                vector,
                v_opt: v,
                height_glide,
                height_climb: -altitude_difference,
                altitude_required,
                altitude_difference,
                time_elapsed: -1.0,
            };
        }

        let height_climb = -altitude_difference;
        GlideResult {
            validity: GlideValidity::Ok,
            vector,
            v_opt: v,
            height_glide,
            height_climb,
            altitude_required,
            altitude_difference,
            time_elapsed: cruise_time + height_climb / self.mc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlideValidity {
    Ok,
    NoSolution,
    #[default]
    NotSolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GlideResult {
    pub validity: GlideValidity,
    pub vector: GeoVector,
    pub v_opt: f64,
    pub height_glide: f64,
    pub height_climb: f64,
    pub altitude_required: f64,
    pub altitude_difference: f64,
    /// Seconds to destination; negative when unreachable
    pub time_elapsed: f64,
}

impl GlideResult {
    pub fn is_ok(&self) -> bool {
        self.validity == GlideValidity::Ok
    }

    /// Reachable at all, climbing on the way if needed.
    pub fn is_achievable(&self) -> bool {
        self.is_ok() && self.time_elapsed >= 0.0
    }

    /// Reachable without further climb.
    pub fn is_final_glide(&self) -> bool {
        self.is_achievable() && self.altitude_difference >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_polar_has_sensible_best_glide() {
        let polar = GlidePolar::default();
        assert!((polar.best_ld() - 40.0).abs() < 1.0);
        assert!((polar.v_best_ld() - 28.0).abs() < 0.5);
    }

    #[test]
    fn test_final_glide_when_high_enough() {
        let polar = GlidePolar::default();
        let state = AircraftState::new(GeoPoint::new(7.0, 51.0), 1_500.0, 0.0);
        let dest = state.location.intermediate_point(90.0, 20_000.0);
        let result = polar.solve(&state, &dest, 100.0);
        assert!(result.is_final_glide());
        assert!(result.time_elapsed > 0.0);
    }

    #[test]
    fn test_zero_mc_below_glide_has_no_solution() {
        let polar = GlidePolar::default();
        let state = AircraftState::new(GeoPoint::new(7.0, 51.0), 300.0, 0.0);
        let dest = state.location.intermediate_point(90.0, 50_000.0);
        let result = polar.solve(&state, &dest, 100.0);
        assert!(!result.is_achievable());
    }

    #[test]
    fn test_positive_mc_adds_climb_time() {
        let polar = GlidePolar::default().with_mc(2.0);
        let state = AircraftState::new(GeoPoint::new(7.0, 51.0), 300.0, 0.0);
        let dest = state.location.intermediate_point(90.0, 50_000.0);
        let result = polar.solve(&state, &dest, 100.0);
        assert!(result.is_achievable());
        assert!(!result.is_final_glide());
        assert!(result.height_climb > 0.0);
    }
}
