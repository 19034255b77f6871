//! Race fixtures shared by unit tests and benchmarks
//!
//! All layouts come from [`TrackConfig`] presets, so integration tests can build
//! the same races through the public API.

#![cfg(any(test, feature = "benchmark"))]

use std::sync::Arc;

use crate::config::{EntrantConfig, RaceConfig, TrackConfig};
use crate::sim::RaceSimulation;
use crate::types::{InputCommand, RaceSnapshot};

/// Single-lap race on the drag strip: standing start behind the line, pit lane
/// from z = 100 to z = 400, service box at z = 300..310.
pub fn drag_strip_race(entrants: usize) -> RaceConfig {
    RaceConfig {
        total_laps: 1,
        track: TrackConfig::drag_strip(),
        entrants: entrant_list(entrants),
        ..RaceConfig::default()
    }
}

/// One-lap sprint that a car at full throttle finishes in well under ten seconds.
pub fn sprint_race(entrants: usize) -> RaceConfig {
    RaceConfig {
        total_laps: 1,
        track: TrackConfig::sprint(),
        entrants: entrant_list(entrants),
        ..RaceConfig::default()
    }
}

/// Race on the default rectangular circuit.
pub fn circuit_race(entrants: usize, laps: u32) -> RaceConfig {
    RaceConfig { total_laps: laps, entrants: entrant_list(entrants), ..RaceConfig::default() }
}

pub fn entrant_list(count: usize) -> Vec<EntrantConfig> {
    (0..count).map(|i| EntrantConfig::named(format!("Car {}", i + 1))).collect()
}

/// Step `ticks` times with the same command for every car, collecting snapshots.
pub fn drive(
    simulation: &mut RaceSimulation,
    input: InputCommand,
    ticks: usize,
) -> Vec<Arc<RaceSnapshot>> {
    let inputs = vec![input; simulation.car_count()];
    (0..ticks).map(|_| simulation.step(&inputs)).collect()
}
