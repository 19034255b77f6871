//! Race-level identifiers, phases and events

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PitPhase;

/// Index of a car in entrant (grid) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CarId(pub usize);

impl CarId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Overall state of the race clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum RacePhase {
    /// Cars held on the grid; seconds until green
    Countdown { remaining: f64 },
    Green,
    /// Leader has finished; seconds left for the rest of the field
    Finishing { remaining: f64 },
    Finished,
}

impl RacePhase {
    pub fn is_running(self) -> bool {
        matches!(self, RacePhase::Green | RacePhase::Finishing { .. })
    }

    pub fn is_finished(self) -> bool {
        matches!(self, RacePhase::Finished)
    }
}

/// Something that happened during a tick.
///
/// Events are collected per tick, published with the snapshot, and never
/// carried over to the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum RaceEvent {
    PhaseChanged { phase: RacePhase },
    CheckpointPassed { car: CarId, index: usize },
    LapCompleted { car: CarId, lap: u32, time: f64, personal_best: bool },
    RaceFinished { car: CarId, position: usize, total_time: f64 },
    PitPhaseChanged { car: CarId, from: PitPhase, to: PitPhase },
    PitStopCompleted { car: CarId, service_time: f64 },
    /// Left the pit lane without stopping in the box
    PitAborted { car: CarId },
    BoostExhausted { car: CarId },
    Collision { car: CarId, other: Option<CarId>, impact_speed: f32, damage: f32 },
    Incident { car: CarId, damage: f32, speed_penalty: f32 },
}

impl RaceEvent {
    /// Car the event concerns, if any.
    pub fn car(&self) -> Option<CarId> {
        match self {
            RaceEvent::PhaseChanged { .. } => None,
            RaceEvent::CheckpointPassed { car, .. }
            | RaceEvent::LapCompleted { car, .. }
            | RaceEvent::RaceFinished { car, .. }
            | RaceEvent::PitPhaseChanged { car, .. }
            | RaceEvent::PitStopCompleted { car, .. }
            | RaceEvent::PitAborted { car }
            | RaceEvent::BoostExhausted { car }
            | RaceEvent::Collision { car, .. }
            | RaceEvent::Incident { car, .. } => Some(*car),
        }
    }
}
