use serde::{Deserialize, Serialize};

use super::{require_non_negative, require_positive};
use crate::Result;
use crate::types::{MPS_TO_KMH, PERCENT};

const SECTION: &str = "pit";

/// Pit-lane rules and the work done during a stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitConfig {
    pub speed_limit_kmh: f32,
    /// Margin above the limit still accepted as "slowed down"
    pub speed_tolerance_kmh: f32,
    /// Seconds stationary in the service box
    pub service_duration: f64,
    /// m/s^2 applied above the speed limit
    pub limiter_deceleration: f32,
    /// m/s^2 applied while held in the box
    pub hold_deceleration: f32,
    /// Fuel level the crew fills to
    pub refuel_to: f32,
    pub repair: bool,
    pub change_tires: bool,
}

impl Default for PitConfig {
    fn default() -> Self {
        Self {
            speed_limit_kmh: 80.0,
            speed_tolerance_kmh: 1.0,
            service_duration: 3.0,
            limiter_deceleration: 25.0,
            hold_deceleration: 30.0,
            refuel_to: PERCENT,
            repair: true,
            change_tires: true,
        }
    }
}

impl PitConfig {
    /// Lane speed limit in m/s.
    pub fn speed_limit(&self) -> f32 {
        self.speed_limit_kmh / MPS_TO_KMH
    }

    /// Highest speed (m/s) accepted as within the limit.
    pub fn entry_speed(&self) -> f32 {
        (self.speed_limit_kmh + self.speed_tolerance_kmh) / MPS_TO_KMH
    }

    pub fn validate(&self) -> Result<()> {
        require_positive(SECTION, "speed_limit_kmh", self.speed_limit_kmh)?;
        require_non_negative(SECTION, "speed_tolerance_kmh", self.speed_tolerance_kmh)?;
        require_positive(SECTION, "limiter_deceleration", self.limiter_deceleration)?;
        require_positive(SECTION, "hold_deceleration", self.hold_deceleration)?;
        require_non_negative(SECTION, "refuel_to", self.refuel_to)?;
        if !(self.service_duration.is_finite() && self.service_duration >= 0.0) {
            return Err(crate::SimError::invalid_config(
                SECTION,
                format!("service_duration must not be negative, got {}", self.service_duration),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_speed_includes_tolerance() {
        let config = PitConfig { speed_limit_kmh: 72.0, speed_tolerance_kmh: 3.6, ..Default::default() };
        assert!((config.speed_limit() - 20.0).abs() < 1e-4);
        assert!((config.entry_speed() - 21.0).abs() < 1e-4);
    }

    #[test]
    fn rejects_negative_service_time() {
        let config = PitConfig { service_duration: -1.0, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
