//! Fly a simulated glider around a task and report progress.
//!
//! The calculation loop takes an exclusive lease per sample; progress lines
//! are produced from shared leases in between.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use soar_cli::sim::{
    create_aat_scenario, create_thermal_scenario, create_triangle_scenario, Simulator,
};
use soar_cli::{format_clock, Config, ReplaySummary};
use soar_core::{
    AircraftState, GeoPoint, ProtectedTaskManager, TaskManager, TaskMode, TracingTaskEvents,
    WaypointSource,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Available flights
#[derive(Debug, Clone, ValueEnum)]
enum ScenarioType {
    /// FAI triangle with cylinder turnpoints
    Triangle,
    /// Assigned-area task with two areas
    Aat,
    /// Thermalling west of home with a goto home
    Thermal,
}

/// Replay a simulated soaring flight
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Scenario to fly
    #[arg(long, value_enum, default_value = "triangle")]
    scenario: ScenarioType,

    /// Home latitude
    #[arg(long, default_value_t = 47.5)]
    lat: f64,

    /// Home longitude
    #[arg(long, default_value_t = 9.0)]
    lon: f64,

    /// Seconds between samples (overrides SOAR_SAMPLE_INTERVAL)
    #[arg(long)]
    interval: Option<f64>,

    /// Random seed for altitude noise (overrides SOAR_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Switch to abort mode at this flight time (s)
    #[arg(long)]
    abort_at: Option<f64>,

    /// Print a progress line every N samples
    #[arg(long, default_value_t = 60)]
    report_every: usize,
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("soar_core=debug".parse()?)
        .add_directive("replay_task=info".parse()?);
    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(config.log_json)?;

    let behaviour = config.load_behaviour()?;
    let center = GeoPoint::new(args.lon, args.lat);
    let scenario = match args.scenario {
        ScenarioType::Triangle => create_triangle_scenario(center),
        ScenarioType::Aat => create_aat_scenario(center),
        ScenarioType::Thermal => create_thermal_scenario(center),
    };
    tracing::info!(scenario = %scenario.name, "starting replay");

    let waypoints = Arc::new(scenario.waypoints.clone());
    let mut manager =
        TaskManager::with_behaviour(behaviour, waypoints.clone(), Box::new(TracingTaskEvents));
    match scenario.task.clone() {
        Some(task) => {
            if !manager.commit(task) {
                tracing::warn!("scenario task is not valid, flying it anyway");
            }
        }
        None => match waypoints.home() {
            Some(home) => {
                manager.do_goto(home);
            }
            None => anyhow::bail!("scenario has neither a task nor a home waypoint"),
        },
    }
    let ptm = ProtectedTaskManager::new(manager);

    let interval = args.interval.unwrap_or(config.sample_interval_s);
    let seed = args.seed.unwrap_or(config.seed);
    let simulator = Simulator::new(scenario.path.clone(), interval, seed)
        .with_altitude_noise(config.altitude_noise_m);
    let report_every = args.report_every.max(1);

    let mut last: Option<AircraftState> = None;
    let mut samples = 0usize;
    for state in simulator {
        let previous = last.unwrap_or(state);
        {
            let mut tm = ptm.exclusive_lease();
            if args.abort_at.is_some_and(|t| state.time >= t) && tm.mode() != TaskMode::Abort {
                tm.abort();
            }
            tm.update(&state, &previous);
            tm.update_idle(&state);
        }

        if samples % report_every == 0 {
            let tm = ptm.lease();
            let stats = tm.stats();
            tracing::info!(
                clock = %format_clock(state.time),
                mode = %tm.mode(),
                active = tm.active_waypoint().map(|w| w.name.as_str()).unwrap_or("-"),
                altitude = state.altitude.round(),
                remaining_km = (stats.total.remaining.distance / 1000.0 * 10.0).round() / 10.0,
                "progress"
            );
        }
        last = Some(state);
        samples += 1;
    }

    let summary = ReplaySummary::capture(&scenario.name, samples, &ptm.lease());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
