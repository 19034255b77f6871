//! Built-in views for the HUD, engine audio and the renderer

use serde::{Deserialize, Serialize};

use super::{SnapshotView, ViewBinding};
use crate::types::{Gear, PitPhase, RaceSnapshot};

/// Everything a heads-up display draws for the player's car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct HudView {
    pub speed_kmh: f32,
    pub gear: Gear,
    pub rpm: f32,
    /// 0 at idle, 1 at the redline
    pub rpm_fraction: f32,
    pub lap: u32,
    pub total_laps: u32,
    pub current_lap_time: f64,
    pub last_lap_time: Option<f64>,
    pub best_lap_time: Option<f64>,
    pub position_in_race: usize,
    pub car_count: usize,
    pub fuel: f32,
    pub tire_wear: f32,
    pub energy_reserve: f32,
    pub boost_available: bool,
    pub drs_active: bool,
    pub pit: PitPhase,
    pub finished: bool,
}

impl HudView {
    /// Shift light: the last tenth of the rev band.
    pub fn shift_light(&self) -> bool {
        self.rpm_fraction >= 0.9
    }

    pub fn pit_label(&self) -> &'static str {
        self.pit.label()
    }
}

impl SnapshotView for HudView {
    fn adapt(snapshot: &RaceSnapshot, binding: &ViewBinding) -> Option<Self> {
        let car = binding.car(snapshot)?;
        Some(Self {
            speed_kmh: car.speed_kmh,
            gear: car.gear,
            rpm: car.rpm,
            rpm_fraction: rpm_fraction(car.rpm, binding),
            lap: car.lap,
            total_laps: binding.total_laps,
            current_lap_time: car.current_lap_time,
            last_lap_time: car.last_lap_time,
            best_lap_time: car.best_lap_time,
            position_in_race: car.position_in_race,
            car_count: snapshot.cars.len(),
            fuel: car.fuel,
            tire_wear: car.tire_wear,
            energy_reserve: car.energy_reserve,
            boost_available: car.boost_available,
            drs_active: car.drs_active,
            pit: car.pit,
            finished: car.finished,
        })
    }
}

/// Inputs for an engine sound model: engine and road speed, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct EngineAudio {
    pub rpm: f32,
    pub speed_kmh: f32,
}

impl SnapshotView for EngineAudio {
    fn adapt(snapshot: &RaceSnapshot, binding: &ViewBinding) -> Option<Self> {
        let car = binding.car(snapshot)?;
        Some(Self { rpm: car.rpm, speed_kmh: car.speed_kmh })
    }
}

/// Pose and visual state for drawing one car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct RenderView {
    pub position: [f32; 3],
    pub yaw: f32,
    /// Front wheel angle
    pub steering_angle: f32,
    pub speed_kmh: f32,
    pub gear: Gear,
    pub rpm: f32,
    pub drs_active: bool,
    pub pit: PitPhase,
    pub tire_wear: f32,
    pub damage: f32,
    /// Tread loss this tick is high enough to emit smoke
    pub tire_smoke: bool,
}

impl SnapshotView for RenderView {
    fn adapt(snapshot: &RaceSnapshot, binding: &ViewBinding) -> Option<Self> {
        let car = binding.car(snapshot)?;
        Some(Self {
            position: car.position,
            yaw: car.yaw,
            steering_angle: car.steering_angle,
            speed_kmh: car.speed_kmh,
            gear: car.gear,
            rpm: car.rpm,
            drs_active: car.drs_active,
            pit: car.pit,
            tire_wear: car.tire_wear,
            damage: car.damage,
            tire_smoke: car.tire_wear_delta > binding.smoke_threshold,
        })
    }
}

fn rpm_fraction(rpm: f32, binding: &ViewBinding) -> f32 {
    let band = binding.redline_rpm - binding.idle_rpm;
    if band <= 0.0 {
        return 0.0;
    }
    ((rpm - binding.idle_rpm) / band).clamp(0.0, 1.0)
}
