//! Subscription-time binding of a view to one car

use crate::types::{CarId, CarSnapshot, RaceSnapshot};
use crate::{RaceConfig, SimError};

/// Sustained tread loss (percent per second) that reads as tire smoke.
pub const SMOKE_WEAR_RATE: f32 = 0.15;

/// Pre-validated data a view needs every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewBinding {
    pub car: CarId,
    pub total_laps: u32,
    pub idle_rpm: f32,
    pub redline_rpm: f32,
    pub max_speed_kmh: f32,
    /// Per-tick tread loss above which a car is smoking
    pub smoke_threshold: f32,
}

impl ViewBinding {
    pub fn new(config: &RaceConfig, car: CarId) -> crate::Result<Self> {
        let entrants = config.entrants.len();
        if car.index() >= entrants {
            return Err(SimError::UnknownCar { car: car.index(), entrants });
        }
        let gearbox = &config.vehicle.gearbox;
        Ok(Self {
            car,
            total_laps: config.total_laps,
            idle_rpm: gearbox.idle_rpm,
            redline_rpm: gearbox.redline_rpm,
            max_speed_kmh: config.vehicle.max_speed_kmh,
            smoke_threshold: SMOKE_WEAR_RATE * config.dt() as f32,
        })
    }

    /// The bound car's entry in a snapshot.
    pub fn car<'a>(&self, snapshot: &'a RaceSnapshot) -> Option<&'a CarSnapshot> {
        snapshot.car(self.car)
    }
}
