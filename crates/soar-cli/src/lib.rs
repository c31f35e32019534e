//! Soar CLI - simulated glider flights for the soaring task engine.
//!
//! This crate provides:
//! - sim: flight paths, scenarios and a sampling simulator
//! - replay_task: flies a scenario through the task manager and reports

pub mod config;
pub mod report;
pub mod sim;

pub use config::Config;
pub use report::{format_clock, ReplaySummary};
