//! Aggregate race outcome handed to persistence.

use serde::{Deserialize, Serialize};

use crate::types::{BestLap, CarId};

/// Final (or provisional) classification of a race.
///
/// Plain data: the simulation never writes it anywhere itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct RaceResult {
    pub total_laps: u32,
    /// Seconds from session start to the moment the result was taken
    pub session_time: f64,
    /// Whether the race had reached its Finished phase
    pub complete: bool,
    /// Finishers first, in finishing order, then everyone else by running order
    pub classification: Vec<ClassifiedCar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ClassifiedCar {
    /// 1-based
    pub position: usize,
    pub car: CarId,
    pub name: String,
    pub finished: bool,
    /// Race time at the finish line; `None` if the car did not finish
    pub total_time: Option<f64>,
    pub lap_times: Vec<f64>,
    pub best_lap: Option<BestLap>,
    pub damage: f32,
    pub fuel: f32,
    pub tire_wear: f32,
    pub energy_reserve: f32,
}

impl RaceResult {
    pub fn winner(&self) -> Option<&ClassifiedCar> {
        self.classification.first().filter(|car| car.finished)
    }

    pub fn entry(&self, car: CarId) -> Option<&ClassifiedCar> {
        self.classification.iter().find(|entry| entry.car == car)
    }

    /// Fastest lap of the race across all cars.
    pub fn fastest_lap(&self) -> Option<(CarId, BestLap)> {
        self.classification
            .iter()
            .filter_map(|entry| entry.best_lap.map(|best| (entry.car, best)))
            .min_by(|a, b| a.1.time.total_cmp(&b.1.time))
    }
}
