//! Waypoint snapshots and the query interface of the waypoint database.

use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaypointFlags {
    #[serde(default)]
    pub landable: bool,
    /// Prepared airfield (implies landable)
    #[serde(default)]
    pub airport: bool,
    #[serde(default)]
    pub home: bool,
    #[serde(default)]
    pub turnpoint: bool,
}

/// Immutable waypoint snapshot. Task points keep their own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: u32,
    pub name: String,
    pub location: GeoPoint,
    /// Elevation above MSL in meters
    pub elevation: f64,
    #[serde(default)]
    pub flags: WaypointFlags,
}

impl Waypoint {
    pub fn new(id: u32, name: impl Into<String>, location: GeoPoint, elevation: f64) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            elevation,
            flags: WaypointFlags {
                turnpoint: true,
                ..WaypointFlags::default()
            },
        }
    }

    /// Mark as an outlanding field.
    pub fn landable(mut self) -> Self {
        self.flags.landable = true;
        self
    }

    /// Mark as a prepared airfield.
    pub fn airport(mut self) -> Self {
        self.flags.landable = true;
        self.flags.airport = true;
        self
    }

    pub fn home(mut self) -> Self {
        self.flags.home = true;
        self
    }

    pub fn is_landable(&self) -> bool {
        self.flags.landable || self.flags.airport
    }

    pub fn is_airport(&self) -> bool {
        self.flags.airport
    }
}

/// Read-only query surface of a waypoint database.
pub trait WaypointSource: Send + Sync {
    /// Call `visitor` for every waypoint within `radius` meters of `center`.
    fn visit_within_radius(
        &self,
        center: &GeoPoint,
        radius: f64,
        visitor: &mut dyn FnMut(&Waypoint),
    );

    fn nearest(&self, location: &GeoPoint, max_range: f64) -> Option<Waypoint>;

    fn home(&self) -> Option<Waypoint>;

    fn lookup_id(&self, id: u32) -> Option<Waypoint>;
}

/// Simple in-memory waypoint set.
#[derive(Debug, Clone, Default)]
pub struct Waypoints {
    items: Vec<Waypoint>,
}

impl Waypoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert or replace by id.
    pub fn insert(&mut self, waypoint: Waypoint) {
        match self.items.iter_mut().find(|w| w.id == waypoint.id) {
            Some(existing) => *existing = waypoint,
            None => self.items.push(waypoint),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.items.iter()
    }
}

impl FromIterator<Waypoint> for Waypoints {
    fn from_iter<I: IntoIterator<Item = Waypoint>>(iter: I) -> Self {
        let mut waypoints = Waypoints::new();
        for wp in iter {
            waypoints.insert(wp);
        }
        waypoints
    }
}

impl WaypointSource for Waypoints {
    fn visit_within_radius(
        &self,
        center: &GeoPoint,
        radius: f64,
        visitor: &mut dyn FnMut(&Waypoint),
    ) {
        for wp in self.items.iter().filter(|w| w.location.distance(center) <= radius) {
            visitor(wp);
        }
    }

    fn nearest(&self, location: &GeoPoint, max_range: f64) -> Option<Waypoint> {
        self.items
            .iter()
            .map(|w| (w.location.distance(location), w))
            .filter(|(d, _)| *d <= max_range)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, w)| w.clone())
    }

    fn home(&self) -> Option<Waypoint> {
        self.items.iter().find(|w| w.flags.home).cloned()
    }

    fn lookup_id(&self, id: u32) -> Option<Waypoint> {
        self.items.iter().find(|w| w.id == id).cloned()
    }
}
