//! Pre-defined task flights for replay and testing.

use super::paths::{CircularPath, RoutePath};
use super::FlightPath;
use soar_core::{
    FactoryKind, GeoPoint, LegalPointType, OrderedTask, TaskFactory, Waypoint, Waypoints,
};
use std::sync::Arc;

const CRUISE_SPEED_MPS: f64 = 30.0;
const CRUISE_GLIDE_RATIO: f64 = 40.0;

/// A named flight: waypoint database, optional ordered task and the path
/// the glider flies.
pub struct Scenario {
    pub name: String,
    pub waypoints: Waypoints,
    pub task: Option<OrderedTask>,
    pub path: Arc<dyn FlightPath>,
}

/// Home airfield at `center` plus a ring of outlanding fields.
fn base_waypoints(center: GeoPoint) -> Waypoints {
    let mut waypoints = Waypoints::new();
    waypoints.insert(Waypoint::new(1, "Home", center, 450.0).airport().home());
    for (i, bearing) in [45.0, 135.0, 225.0, 315.0].into_iter().enumerate() {
        let id = 10 + i as u32;
        waypoints.insert(
            Waypoint::new(
                id,
                format!("Field {id}"),
                center.intermediate_point(bearing, 12_000.0),
                430.0,
            )
            .landable(),
        );
    }
    waypoints
}

fn build_task(kind: FactoryKind, points: Vec<(LegalPointType, Waypoint)>) -> OrderedTask {
    let mut task = OrderedTask::default();
    let mut factory = TaskFactory::new(&mut task, kind);
    for (ty, waypoint) in points {
        let point = factory.create_point(ty, waypoint);
        if !factory.append(point, true) {
            tracing::warn!(?ty, "scenario point rejected");
        }
    }
    factory.validate();
    task
}

/// 75 km FAI triangle from the home airfield with cylinder turnpoints.
///
/// - Start: home, 1 km cylinder
/// - Turnpoints: 25 km north and 25 km north-east, 500 m cylinders
/// - Finish: home, 1 km cylinder
pub fn create_triangle_scenario(center: GeoPoint) -> Scenario {
    let mut waypoints = base_waypoints(center);
    let north = Waypoint::new(2, "North", center.intermediate_point(0.0, 25_000.0), 600.0);
    let east = Waypoint::new(3, "East", center.intermediate_point(60.0, 25_000.0), 520.0);
    waypoints.insert(north.clone());
    waypoints.insert(east.clone());
    let home = Waypoint::new(1, "Home", center, 450.0).airport().home();

    let task = build_task(
        FactoryKind::Fai,
        vec![
            (LegalPointType::StartCylinder, home.clone()),
            (LegalPointType::AstCylinder, north.clone()),
            (LegalPointType::AstCylinder, east.clone()),
            (LegalPointType::FinishCylinder, home),
        ],
    );
    let path = RoutePath::new(
        vec![center, north.location, east.location, center],
        CRUISE_SPEED_MPS,
        2_400.0,
        CRUISE_GLIDE_RATIO,
    );

    Scenario {
        name: "triangle".to_string(),
        waypoints,
        task: Some(task),
        path: Arc::new(path),
    }
}

/// Assigned-area task with two 10 km areas; the glider flies beyond the
/// area centres before turning.
pub fn create_aat_scenario(center: GeoPoint) -> Scenario {
    let mut waypoints = base_waypoints(center);
    let west = Waypoint::new(4, "West Area", center.intermediate_point(300.0, 30_000.0), 500.0);
    let south = Waypoint::new(5, "South Area", center.intermediate_point(200.0, 30_000.0), 480.0);
    waypoints.insert(west.clone());
    waypoints.insert(south.clone());
    let home = Waypoint::new(1, "Home", center, 450.0).airport().home();

    let task = build_task(
        FactoryKind::Aat,
        vec![
            (LegalPointType::StartCylinder, home.clone()),
            (LegalPointType::AatCylinder, west.clone()),
            (LegalPointType::AatCylinder, south.clone()),
            (LegalPointType::FinishLine, home),
        ],
    );
    let deep_west = center.intermediate_point(300.0, 36_000.0);
    let deep_south = center.intermediate_point(200.0, 35_000.0);
    let path = RoutePath::new(
        vec![center, deep_west, deep_south, center],
        CRUISE_SPEED_MPS,
        3_000.0,
        CRUISE_GLIDE_RATIO,
    );

    Scenario {
        name: "aat".to_string(),
        waypoints,
        task: Some(task),
        path: Arc::new(path),
    }
}

/// No task: a glider climbing in a thermal 8 km west of home.
pub fn create_thermal_scenario(center: GeoPoint) -> Scenario {
    let path = CircularPath::new(
        center.intermediate_point(270.0, 8_000.0),
        150.0,
        25.0,
        700.0,
        1.5,
        900.0,
    );
    Scenario {
        name: "thermal".to_string(),
        waypoints: base_waypoints(center),
        task: None,
        path: Arc::new(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Simulator;
    use soar_core::{NullTaskEvents, TaskManager, TaskMode, TaskPointType, WaypointSource};

    fn center() -> GeoPoint {
        GeoPoint::new(9.0, 47.5)
    }

    #[test]
    fn test_triangle_scenario_builds_valid_task() {
        let scenario = create_triangle_scenario(center());
        let task = scenario.task.as_ref().unwrap();
        let types: Vec<_> = task.points().iter().map(|p| p.point_type()).collect();
        assert_eq!(
            types,
            vec![
                TaskPointType::Start,
                TaskPointType::Ast,
                TaskPointType::Ast,
                TaskPointType::Finish
            ]
        );
        assert!(task.check_task());
        assert_eq!(scenario.name, "triangle");
    }

    #[test]
    fn test_aat_scenario_has_targets() {
        let scenario = create_aat_scenario(center());
        assert!(scenario.task.as_ref().unwrap().has_targets());
    }

    #[test]
    fn test_triangle_flight_finishes_task() {
        let scenario = create_triangle_scenario(center());
        let mut tm = TaskManager::new(Arc::new(scenario.waypoints.clone()), Box::new(NullTaskEvents));
        assert!(tm.commit(scenario.task.clone().unwrap()));

        let mut last = None;
        for state in Simulator::new(scenario.path.clone(), 5.0, 1) {
            let previous = last.unwrap_or(state);
            tm.update(&state, &previous);
            last = Some(state);
        }
        let stats = tm.ordered_stats();
        assert!(stats.task_started);
        assert!(stats.task_finished);
        assert_eq!(tm.active_index(), 3);
        assert!(stats.distance_scored > 70_000.0);
    }

    #[test]
    fn test_thermal_scenario_goes_home() {
        let scenario = create_thermal_scenario(center());
        assert!(scenario.task.is_none());
        let home = scenario.waypoints.home().unwrap();
        let mut tm = TaskManager::new(Arc::new(scenario.waypoints.clone()), Box::new(NullTaskEvents));
        assert!(tm.do_goto(home));
        assert_eq!(tm.mode(), TaskMode::Goto);

        let state = scenario.path.state_at(0.0);
        tm.update(&state, &state);
        assert!((tm.stats().total.remaining.distance - 8_000.0).abs() < 200.0);
    }
}
