//! Immutable end-of-tick state published to render, HUD and audio consumers

use serde::{Deserialize, Serialize};

use super::{CarId, Gear, PitPhase, RaceEvent, RacePhase};

/// How often a consumer wants snapshots delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum FrameRate {
    /// Every published tick the consumer keeps up with
    Native,
    /// At most this many snapshots per wall-clock second; `Max(0)` is `Native`
    Max(u32),
}

/// Public state of one car at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CarSnapshot {
    pub id: CarId,
    pub name: String,

    // Kinematics
    pub position: [f32; 3],
    pub yaw: f32,
    pub steering_angle: f32,
    pub speed_kmh: f32,
    pub gear: Gear,
    pub rpm: f32,
    pub drs_active: bool,

    // Resources
    pub fuel: f32,
    pub tire_wear: f32,
    /// Tread lost during this tick
    pub tire_wear_delta: f32,
    pub tire_temperature: [f32; 4],
    pub energy_reserve: f32,
    pub boost_used_this_lap: f32,
    pub boost_available: bool,
    pub damage: f32,

    // Race progress
    pub pit: PitPhase,
    /// 1-based lap currently being driven
    pub lap: u32,
    pub laps_completed: u32,
    /// Index of the next checkpoint to pass
    pub next_checkpoint: usize,
    pub current_lap_time: f64,
    pub last_lap_time: Option<f64>,
    pub best_lap_time: Option<f64>,
    pub race_time: f64,
    /// 1-based running order
    pub position_in_race: usize,
    pub finished: bool,
}

/// Immutable state of the whole race at the end of a tick.
///
/// Snapshots are shared behind `Arc` and never mutated once published, so every
/// reader sees a fully-updated tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct RaceSnapshot {
    /// Monotonic tick counter, 0 before the first step
    pub tick: u64,
    /// Simulated seconds since the session started
    pub time: f64,
    pub phase: RacePhase,
    pub total_laps: u32,
    /// Cars in entrant order (index == `CarId`)
    pub cars: Vec<CarSnapshot>,
    /// Events raised during this tick
    pub events: Vec<RaceEvent>,
}

impl RaceSnapshot {
    pub fn car(&self, id: CarId) -> Option<&CarSnapshot> {
        self.cars.get(id.index())
    }

    /// Cars sorted by running order.
    pub fn running_order(&self) -> Vec<&CarSnapshot> {
        let mut order: Vec<&CarSnapshot> = self.cars.iter().collect();
        order.sort_by_key(|car| car.position_in_race);
        order
    }

    pub fn leader(&self) -> Option<&CarSnapshot> {
        self.cars.iter().find(|car| car.position_in_race == 1)
    }

    /// Events concerning one car.
    pub fn events_for(&self, id: CarId) -> impl Iterator<Item = &RaceEvent> {
        self.events.iter().filter(move |event| event.car() == Some(id))
    }
}
