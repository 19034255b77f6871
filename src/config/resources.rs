use serde::{Deserialize, Serialize};

use super::{require_fraction, require_non_negative, require_positive};
use crate::Result;

const SECTION: &str = "resources";

/// Consumption, wear and recovery rates.
///
/// Fuel, tire wear and damage are percentages. Rates are per second at full
/// input unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Fuel burnt per second at full throttle
    pub fuel_per_second: f32,
    /// Tread lost per second per m/s^2 of lateral load
    pub tire_wear_lateral: f32,
    /// Tread lost per second at full brake
    pub tire_wear_brake: f32,
    /// Degrees gained per percent of tread lost
    pub tire_heat_per_wear: f32,
    /// Rate (1/s) at which tire temperature relaxes toward ambient
    pub tire_cooling_rate: f32,
    pub ambient_temperature: f32,
    pub max_energy: f32,
    /// Energy drawn per second of full-throttle boost
    pub boost_drain_per_second: f32,
    pub max_boost_per_lap: f32,
    /// Energy recovered per second at full brake
    pub regen_per_second: f32,
    /// Damage accrued per second while running on worn-out tires
    pub worn_tire_damage_per_second: f32,
    /// Steering response multiplier once the tires are worn out
    pub worn_steering_factor: f32,
    /// Steering response lost at 100% damage
    pub damage_steering_loss: f32,
    /// Engine force lost at 100% damage
    pub damage_power_loss: f32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            fuel_per_second: 0.5,
            tire_wear_lateral: 0.004,
            tire_wear_brake: 0.2,
            tire_heat_per_wear: 400.0,
            tire_cooling_rate: 0.05,
            ambient_temperature: 25.0,
            max_energy: 100.0,
            boost_drain_per_second: 25.0,
            max_boost_per_lap: 40.0,
            regen_per_second: 10.0,
            worn_tire_damage_per_second: 2.0,
            worn_steering_factor: 0.5,
            damage_steering_loss: 0.3,
            damage_power_loss: 0.3,
        }
    }
}

impl ResourceConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive(SECTION, "max_energy", self.max_energy)?;
        for (name, value) in [
            ("fuel_per_second", self.fuel_per_second),
            ("tire_wear_lateral", self.tire_wear_lateral),
            ("tire_wear_brake", self.tire_wear_brake),
            ("tire_heat_per_wear", self.tire_heat_per_wear),
            ("tire_cooling_rate", self.tire_cooling_rate),
            ("boost_drain_per_second", self.boost_drain_per_second),
            ("max_boost_per_lap", self.max_boost_per_lap),
            ("regen_per_second", self.regen_per_second),
            ("worn_tire_damage_per_second", self.worn_tire_damage_per_second),
        ] {
            require_non_negative(SECTION, name, value)?;
        }
        if !self.ambient_temperature.is_finite() {
            return Err(crate::SimError::invalid_config(SECTION, "ambient_temperature must be finite"));
        }
        require_fraction(SECTION, "worn_steering_factor", self.worn_steering_factor)?;
        require_fraction(SECTION, "damage_steering_loss", self.damage_steering_loss)?;
        require_fraction(SECTION, "damage_power_loss", self.damage_power_loss)
    }
}
