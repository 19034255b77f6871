//! Per-car consumables and the gates derived from them

use serde::{Deserialize, Serialize};

/// Ceiling of fuel, tire wear and damage.
pub const PERCENT: f32 = 100.0;

/// Tire corners in `tire_temperature` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Corner {
    FrontLeft = 0,
    FrontRight = 1,
    RearLeft = 2,
    RearRight = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] =
        [Corner::FrontLeft, Corner::FrontRight, Corner::RearLeft, Corner::RearRight];

    pub fn is_front(self) -> bool {
        matches!(self, Corner::FrontLeft | Corner::FrontRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Corner::FrontLeft | Corner::RearLeft)
    }
}

/// Consumable state of one car.
///
/// Every quantity saturates inside its range: fuel, tire wear and damage in
/// `[0, 100]`, energy in `[0, max_energy]`, boost usage in
/// `[0, max_boost_per_lap]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ResourceState {
    /// Fuel load, 0..=100
    pub fuel: f32,
    /// Remaining tread, 100 = fresh set
    pub tire_wear: f32,
    /// Per-corner tire temperature (°C), indexed by [`Corner`]
    pub tire_temperature: [f32; 4],
    /// Energy-recovery store
    pub energy_reserve: f32,
    /// Boost energy spent since the current lap started
    pub boost_used_this_lap: f32,
    /// Accumulated damage, 0..=100
    pub damage: f32,
}

impl ResourceState {
    pub fn new(fuel: f32, tire_wear: f32, energy_reserve: f32, ambient: f32) -> Self {
        Self {
            fuel: fuel.clamp(0.0, PERCENT),
            tire_wear: tire_wear.clamp(0.0, PERCENT),
            tire_temperature: [ambient; 4],
            energy_reserve: energy_reserve.max(0.0),
            boost_used_this_lap: 0.0,
            damage: 0.0,
        }
    }

    pub fn temperature(&self, corner: Corner) -> f32 {
        self.tire_temperature[corner as usize]
    }

    pub fn average_tire_temperature(&self) -> f32 {
        self.tire_temperature.iter().sum::<f32>() / 4.0
    }

    pub fn tires_worn_out(&self) -> bool {
        self.tire_wear <= 0.0
    }

    /// Top the tank up to `target`, saturating at a full tank. Returns the amount added.
    pub fn refuel(&mut self, target: f32) -> f32 {
        let before = self.fuel;
        self.fuel = self.fuel.max(target.clamp(0.0, PERCENT));
        self.fuel - before
    }
}

/// Permissions computed from a [`ResourceState`] before dynamics run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ResourceGates {
    /// Throttle produces force only while fuel remains
    pub fuel_available: bool,
    /// ERS boost may be drawn this tick
    pub boost_available: bool,
    /// Multiplier on steering response, 1.0 = healthy car
    pub steering_penalty: f32,
    /// Multiplier on engine force from damage, 1.0 = healthy car
    pub power_factor: f32,
}

impl Default for ResourceGates {
    fn default() -> Self {
        Self { fuel_available: true, boost_available: false, steering_penalty: 1.0, power_factor: 1.0 }
    }
}
