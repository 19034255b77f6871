use serde::{Deserialize, Serialize};

use super::{require_fraction, require_non_negative, require_positive};
use crate::Result;

const SECTION: &str = "collision";

/// Contact response tuning. Contacts are damage and speed-penalty events, not
/// rigid-body impulses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Cars are circles of this radius (m) on the track plane
    pub car_radius: f32,
    /// Impacts slower than this (m/s) only separate the cars
    pub min_impact_speed: f32,
    /// Damage per m/s of impact speed into a wall
    pub wall_damage_per_mps: f32,
    /// Fraction of speed lost on a wall impact
    pub wall_speed_penalty: f32,
    /// Damage per m/s of closing speed between two cars
    pub car_damage_per_mps: f32,
    /// Fraction of speed lost by both cars in a contact
    pub car_speed_penalty: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            car_radius: 1.2,
            min_impact_speed: 1.0,
            wall_damage_per_mps: 0.8,
            wall_speed_penalty: 0.5,
            car_damage_per_mps: 1.0,
            car_speed_penalty: 0.2,
        }
    }
}

impl CollisionConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive(SECTION, "car_radius", self.car_radius)?;
        require_non_negative(SECTION, "min_impact_speed", self.min_impact_speed)?;
        require_non_negative(SECTION, "wall_damage_per_mps", self.wall_damage_per_mps)?;
        require_non_negative(SECTION, "car_damage_per_mps", self.car_damage_per_mps)?;
        require_fraction(SECTION, "wall_speed_penalty", self.wall_speed_penalty)?;
        require_fraction(SECTION, "car_speed_penalty", self.car_speed_penalty)
    }
}
