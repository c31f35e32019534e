//! End-to-end task construction and flight tests.
//!
//! A synthetic glider is flown along great-circle legs in fixed steps and
//! fed to the ordered task one sample at a time.

use soar_core::{
    ActiveState, AdvanceMode, AircraftState, EventLog, FactoryKind, GeoPoint, LegalPointType,
    OrderedTask, TaskEvent, TaskFactory, TaskPointType, Waypoint,
};

fn wp(id: u32, lon: f64, lat: f64) -> Waypoint {
    Waypoint::new(id, format!("TP{id}"), GeoPoint::new(lon, lat), 120.0)
}

fn types(task: &OrderedTask) -> Vec<TaskPointType> {
    task.points().iter().map(|p| p.point_type()).collect()
}

/// Samples every `step` meters from `from` to `to`, excluding `from`.
fn leg(from: GeoPoint, to: GeoPoint, step: f64) -> Vec<GeoPoint> {
    let distance = from.distance(&to);
    let n = (distance / step).ceil() as usize;
    (1..=n)
        .map(|i| from.interpolate(&to, i as f64 / n as f64))
        .collect()
}

struct Flight {
    last: AircraftState,
    log: EventLog,
}

impl Flight {
    fn new(origin: GeoPoint) -> Self {
        Self {
            last: AircraftState::new(origin, 1_200.0, 0.0).with_motion(30.0, 90.0),
            log: EventLog::new(),
        }
    }

    fn fly(&mut self, task: &mut OrderedTask, path: &[GeoPoint]) {
        for location in path {
            let state = AircraftState::new(*location, self.last.altitude, self.last.time + 7.0)
                .with_motion(30.0, self.last.location.bearing(location));
            task.update_sample(&state, &self.last, &self.log);
            self.last = state;
        }
    }
}

fn out_and_return(mode: AdvanceMode) -> OrderedTask {
    let mut task = OrderedTask::default();
    task.advance_mut().set_mode(mode);
    let mut factory = TaskFactory::new(&mut task, FactoryKind::Fai);
    let start = factory
        .create_start(LegalPointType::StartCylinder, wp(1, 7.0, 51.0))
        .unwrap();
    let turn = factory
        .create_intermediate(LegalPointType::AstCylinder, wp(2, 7.3, 51.0))
        .unwrap();
    let finish = factory
        .create_finish(LegalPointType::FinishCylinder, wp(1, 7.0, 51.0))
        .unwrap();
    assert!(factory.append(start, true));
    assert!(factory.append(finish, true));
    assert!(factory.insert(turn, 1, true));
    assert!(factory.validate());
    task
}

#[test]
fn fai_append_mutates_finish_into_turnpoint() {
    let mut task = OrderedTask::default();
    let mut factory = TaskFactory::new(&mut task, FactoryKind::Fai);
    factory.append_waypoint(wp(1, 7.0, 51.0));
    assert_eq!(types(factory.task()), vec![TaskPointType::Start]);
    factory.append_waypoint(wp(2, 7.3, 51.0));
    assert_eq!(
        types(factory.task()),
        vec![TaskPointType::Start, TaskPointType::Finish]
    );
    factory.append_waypoint(wp(3, 7.15, 51.2));
    assert_eq!(
        types(factory.task()),
        vec![TaskPointType::Start, TaskPointType::Ast, TaskPointType::Finish]
    );
    let ids: Vec<u32> = task.points().iter().map(|p| p.waypoint().id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn removing_start_of_two_point_task_leaves_start() {
    let mut task = OrderedTask::default();
    let mut factory = TaskFactory::new(&mut task, FactoryKind::Fai);
    factory.append_waypoint(wp(1, 7.0, 51.0));
    factory.append_waypoint(wp(2, 7.3, 51.0));
    assert!(factory.remove(0, true));
    assert_eq!(types(&task), vec![TaskPointType::Start]);
    assert_eq!(task.points()[0].waypoint().id, 2);
}

#[test]
fn active_labels_follow_index() {
    let mut task = OrderedTask::default();
    let mut factory = TaskFactory::new(&mut task, FactoryKind::Fai);
    for (i, lon) in [7.0, 7.3, 7.6, 7.9].into_iter().enumerate() {
        factory.append_waypoint(wp(i as u32 + 1, lon, 51.0));
    }
    assert!(task.set_active(2));
    let states: Vec<ActiveState> = task.points().iter().map(|p| p.active_state()).collect();
    assert_eq!(
        states,
        vec![
            ActiveState::BeforeActive,
            ActiveState::BeforeActive,
            ActiveState::CurrentActive,
            ActiveState::AfterActive,
        ]
    );
    assert!(!task.set_active(4));
}

#[test]
fn auto_advance_flies_whole_task() {
    let mut task = out_and_return(AdvanceMode::Auto);
    let a = GeoPoint::new(7.0, 51.0);
    let b = GeoPoint::new(7.3, 51.0);
    let mut flight = Flight::new(a);

    flight.fly(&mut task, &leg(a, b, 150.0));
    assert!(task.task_started());
    assert_eq!(task.active_index(), 2);

    flight.fly(&mut task, &leg(b, a, 150.0));
    assert!(task.task_finished());

    let events = flight.log.events();
    let position = |e: &TaskEvent| events.iter().position(|x| x == e);
    let started = position(&TaskEvent::TaskStart).unwrap();
    let turned = position(&TaskEvent::Advanced {
        waypoint_id: 1,
        index: 2,
    })
    .unwrap();
    let finished = position(&TaskEvent::TaskFinish).unwrap();
    assert!(started < turned && turned < finished);
    assert!(flight.log.contains(&TaskEvent::Enter(2)));
}

#[test]
fn scored_distance_after_finish() {
    let mut task = out_and_return(AdvanceMode::Auto);
    let a = GeoPoint::new(7.0, 51.0);
    let b = GeoPoint::new(7.3, 51.0);
    let mut flight = Flight::new(a);
    flight.fly(&mut task, &leg(a, b, 150.0));
    flight.fly(&mut task, &leg(b, a, 150.0));

    task.update_stats(&flight.last, &soar_core::GlidePolar::default());
    let stats = task.stats();
    let nominal = 2.0 * a.distance(&b);
    assert!((stats.distance_nominal - nominal).abs() < 1.0);
    assert!(stats.task_finished);
    assert!(stats.start_time.is_some());
    assert!(stats.distance_scored > 0.0);
    assert!(stats.distance_scored < nominal);
}

#[test]
fn armstart_holds_start_until_armed() {
    let mut task = out_and_return(AdvanceMode::ArmStart);
    let a = GeoPoint::new(7.0, 51.0);
    let out = a.intermediate_point(90.0, 3_000.0);
    let mut flight = Flight::new(a);

    flight.fly(&mut task, &leg(a, out, 150.0));
    assert!(task.task_started());
    assert_eq!(task.active_index(), 0);

    task.advance_mut().set_armed(true);
    flight.fly(&mut task, &leg(out, a, 150.0));
    flight.fly(&mut task, &leg(a, out, 150.0));
    assert_eq!(task.active_index(), 1);
    assert!(!task.advance().is_armed());
}

#[test]
fn auto_advances_on_start_exit() {
    let mut task = out_and_return(AdvanceMode::Auto);
    let a = GeoPoint::new(7.0, 51.0);
    let mut flight = Flight::new(a);
    flight.fly(&mut task, &leg(a, a.intermediate_point(90.0, 3_000.0), 150.0));
    assert_eq!(task.active_index(), 1);
}

#[test]
fn manual_mode_never_advances() {
    let mut task = out_and_return(AdvanceMode::Manual);
    let a = GeoPoint::new(7.0, 51.0);
    let b = GeoPoint::new(7.3, 51.0);
    let mut flight = Flight::new(a);
    flight.fly(&mut task, &leg(a, b, 150.0));
    assert!(task.task_started());
    assert_eq!(task.active_index(), 0);
}

#[test]
fn finish_through_start_cylinder_keeps_start_exit() {
    let mut task = out_and_return(AdvanceMode::Auto);
    let a = GeoPoint::new(7.0, 51.0);
    let b = GeoPoint::new(7.3, 51.0);
    let beyond = a.intermediate_point(270.0, 900.0);
    let mut flight = Flight::new(a);

    flight.fly(&mut task, &leg(a, b, 150.0));
    let exit_sample = task.points()[0].interior().points().to_vec();
    assert_eq!(exit_sample.len(), 1);

    flight.fly(&mut task, &leg(b, beyond, 150.0));
    assert!(task.task_finished());
    assert_eq!(task.points()[0].interior().points(), exit_sample.as_slice());

    task.update_stats(&flight.last, &soar_core::GlidePolar::default());
    let stats = task.stats();
    assert!(stats.total.travelled.distance <= stats.distance_nominal);
    assert!(stats.distance_scored < stats.distance_nominal);
}

#[test]
fn restart_replaces_start_exit_sample() {
    let mut task = out_and_return(AdvanceMode::Auto);
    let a = GeoPoint::new(7.0, 51.0);
    let east = a.intermediate_point(90.0, 3_000.0);
    let west = a.intermediate_point(270.0, 3_000.0);
    let mut flight = Flight::new(a);

    flight.fly(&mut task, &leg(a, east, 150.0));
    assert_eq!(task.active_index(), 1);
    let first = task.points()[0].interior().points()[0].location();
    assert!(first.longitude > a.longitude);

    flight.fly(&mut task, &leg(east, west, 150.0));
    let samples = task.points()[0].interior().points();
    assert_eq!(samples.len(), 1);
    assert!(samples[0].location().longitude < a.longitude);
}
