//! Turnpoint advance state machine.

use crate::aircraft::AircraftState;
use crate::error::TaskError;
use crate::task_point::{OrderedTaskPoint, PointRole};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceMode {
    /// Never advance automatically
    Manual,
    /// Advance on every valid transition
    #[default]
    Auto,
    /// Advance only when armed, for every point
    Arm,
    /// Armed only for the start, automatic afterwards
    ArmStart,
}

impl AdvanceMode {
    /// Parse a mode name; anything unrecognised resolves to `Manual`.
    pub fn parse_or_manual(s: &str) -> Self {
        s.parse().unwrap_or(AdvanceMode::Manual)
    }
}

impl FromStr for AdvanceMode {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(AdvanceMode::Manual),
            "auto" => Ok(AdvanceMode::Auto),
            "arm" => Ok(AdvanceMode::Arm),
            "armstart" | "arm_start" => Ok(AdvanceMode::ArmStart),
            _ => Err(TaskError::UnknownAdvanceMode(s.to_string())),
        }
    }
}

impl fmt::Display for AdvanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdvanceMode::Manual => "manual",
            AdvanceMode::Auto => "auto",
            AdvanceMode::Arm => "arm",
            AdvanceMode::ArmStart => "armstart",
        };
        f.write_str(name)
    }
}

/// Summary for display of what the advance logic is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceState {
    Manual,
    Auto,
    StartArmed,
    StartDisarmed,
    TurnArmed,
    TurnDisarmed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAdvance {
    mode: AdvanceMode,
    armed: bool,
}

impl TaskAdvance {
    pub fn new(mode: AdvanceMode) -> Self {
        Self { mode, armed: false }
    }

    pub fn mode(&self) -> AdvanceMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AdvanceMode) {
        if self.mode != mode {
            tracing::debug!(from = %self.mode, to = %mode, "advance mode changed");
        }
        self.mode = mode;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn set_armed(&mut self, armed: bool) {
        self.armed = armed;
    }

    /// Flip the arm flag and return the new value.
    pub fn toggle_arm(&mut self) -> bool {
        self.armed = !self.armed;
        self.armed
    }

    /// Whether the aircraft should move on from `point`.
    ///
    /// Start and AAT points need an exit transition; plain turnpoints only
    /// need the aircraft to be inside the zone right now.
    pub fn ready_to_advance(
        &self,
        point: &OrderedTaskPoint,
        state: &AircraftState,
        _entered: bool,
        exited: bool,
    ) -> bool {
        let (transition_ok, needs_arm) = match point.role() {
            PointRole::Start => (
                exited,
                matches!(self.mode, AdvanceMode::Arm | AdvanceMode::ArmStart),
            ),
            PointRole::Aat(_) => (exited, self.mode == AdvanceMode::Arm),
            PointRole::Ast => (point.is_in_sector(state), self.mode == AdvanceMode::Arm),
            PointRole::Finish => return false,
        };

        match self.mode {
            AdvanceMode::Manual => false,
            AdvanceMode::Auto | AdvanceMode::Arm | AdvanceMode::ArmStart => {
                transition_ok && (!needs_arm || self.armed)
            }
        }
    }

    /// Called once the active point has moved on because of this logic.
    pub fn advanced(&mut self) {
        if self.armed {
            tracing::debug!(mode = %self.mode, "disarming after advance");
        }
        self.armed = false;
    }

    /// What the advance logic is waiting for at `point`.
    pub fn advance_state(&self, point: Option<&OrderedTaskPoint>) -> AdvanceState {
        let is_start = point.is_some_and(|p| matches!(p.role(), PointRole::Start));
        match (self.mode, is_start) {
            (AdvanceMode::Manual, _) => AdvanceState::Manual,
            (AdvanceMode::Auto, _) | (AdvanceMode::ArmStart, false) => AdvanceState::Auto,
            (AdvanceMode::Arm | AdvanceMode::ArmStart, true) => {
                if self.armed {
                    AdvanceState::StartArmed
                } else {
                    AdvanceState::StartDisarmed
                }
            }
            (AdvanceMode::Arm, false) => {
                if self.armed {
                    AdvanceState::TurnArmed
                } else {
                    AdvanceState::TurnDisarmed
                }
            }
        }
    }
}
