//! Navigation sample fed to the task engine once per fix.

use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AircraftState {
    pub location: GeoPoint,
    /// Altitude above MSL in meters
    pub altitude: f64,
    /// Ground speed in m/s
    #[serde(default)]
    pub ground_speed: f64,
    /// Track over ground in degrees
    #[serde(default)]
    pub track: f64,
    /// Seconds since an arbitrary epoch (usually midnight UTC)
    pub time: f64,
}

impl AircraftState {
    pub fn new(location: GeoPoint, altitude: f64, time: f64) -> Self {
        Self {
            location,
            altitude,
            ground_speed: 0.0,
            track: 0.0,
            time,
        }
    }

    /// Set ground speed and track.
    pub fn with_motion(mut self, ground_speed: f64, track: f64) -> Self {
        self.ground_speed = ground_speed;
        self.track = track;
        self
    }

    /// Copy of this state with extra altitude, used for what-if reach checks.
    pub fn with_altitude_boost(mut self, boost_m: f64) -> Self {
        self.altitude += boost_m;
        self
    }
}
