use serde::{Deserialize, Serialize};

use super::{require_fraction, require_non_negative, require_positive};
use crate::Result;
use crate::types::{Gearbox, MPS_TO_KMH};

const SECTION: &str = "vehicle";

/// Physical constants of the car model.
///
/// Forces are in newtons, speeds in m/s unless the name says km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// kg
    pub mass: f32,
    /// Peak tractive force at full throttle
    pub engine_force: f32,
    /// Extra force at full throttle while ERS boost is drawn
    pub boost_force: f32,
    /// Engine force is cut at this forward speed
    pub max_speed_kmh: f32,
    /// Braking deceleration per unit of speed (1/s) at full pedal
    pub brake_coefficient: f32,
    /// At or below this forward speed the brake pedal selects reverse
    pub brake_speed_threshold: f32,
    pub reverse_force: f32,
    pub max_reverse_speed: f32,
    /// Quadratic aerodynamic drag, N per (m/s)^2
    pub drag_coefficient: f32,
    /// Linear rolling resistance, N per m/s
    pub rolling_resistance: f32,
    /// Rate (1/s) at which lateral velocity is absorbed at zero speed
    pub base_grip: f32,
    /// Grip gained at max speed, as a fraction of base grip
    pub downforce: f32,
    /// Front wheel lock (rad)
    pub max_steering_angle: f32,
    /// rad/s
    pub steering_speed: f32,
    /// No yaw torque below this forward speed
    pub min_steering_speed: f32,
    /// Yaw acceleration per rad of steering per m/s of forward speed
    pub steering_torque: f32,
    pub angular_damping: f32,
    /// Fraction of aerodynamic drag removed while DRS is open
    pub drs_drag_reduction: f32,
    pub drs_min_speed: f32,
    pub gearbox: Gearbox,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            mass: 800.0,
            engine_force: 12_000.0,
            boost_force: 4_000.0,
            max_speed_kmh: 300.0,
            brake_coefficient: 2.5,
            brake_speed_threshold: 1.0,
            reverse_force: 3_000.0,
            max_reverse_speed: 8.0,
            drag_coefficient: 0.9,
            rolling_resistance: 12.0,
            base_grip: 6.0,
            downforce: 1.0,
            max_steering_angle: 0.6,
            steering_speed: 2.5,
            min_steering_speed: 0.5,
            steering_torque: 0.25,
            angular_damping: 4.0,
            drs_drag_reduction: 0.3,
            drs_min_speed: 20.0,
            gearbox: Gearbox::default(),
        }
    }
}

impl VehicleConfig {
    /// Top speed in m/s.
    pub fn max_speed(&self) -> f32 {
        self.max_speed_kmh / MPS_TO_KMH
    }

    pub fn validate(&self) -> Result<()> {
        require_positive(SECTION, "mass", self.mass)?;
        require_positive(SECTION, "engine_force", self.engine_force)?;
        require_positive(SECTION, "max_speed_kmh", self.max_speed_kmh)?;
        require_positive(SECTION, "max_steering_angle", self.max_steering_angle)?;
        require_positive(SECTION, "steering_speed", self.steering_speed)?;
        require_positive(SECTION, "base_grip", self.base_grip)?;

        for (name, value) in [
            ("boost_force", self.boost_force),
            ("brake_coefficient", self.brake_coefficient),
            ("brake_speed_threshold", self.brake_speed_threshold),
            ("reverse_force", self.reverse_force),
            ("max_reverse_speed", self.max_reverse_speed),
            ("drag_coefficient", self.drag_coefficient),
            ("rolling_resistance", self.rolling_resistance),
            ("downforce", self.downforce),
            ("min_steering_speed", self.min_steering_speed),
            ("steering_torque", self.steering_torque),
            ("angular_damping", self.angular_damping),
            ("drs_min_speed", self.drs_min_speed),
        ] {
            require_non_negative(SECTION, name, value)?;
        }
        require_fraction(SECTION, "drs_drag_reduction", self.drs_drag_reduction)?;

        self.gearbox.validate()
    }
}
