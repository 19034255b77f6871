//! Race configuration loaded from YAML.
//!
//! Every section carries defaults, so a file only needs the fields it wants to
//! change. The track section describes a flat layout on the x/z plane: a
//! start/finish gate, an ordered list of checkpoint gates, the pit lane with its
//! service box, optional DRS zones, the outer bounds and the starting grid.
//!
//! ```rust
//! use slipstream::RaceConfig;
//!
//! let config = RaceConfig::parse(
//!     r#"
//! total_laps: 5
//! entrants:
//!   - name: Ada
//!   - name: Grace
//!     starting_fuel: 60.0
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.total_laps, 5);
//! assert_eq!(config.entrants.len(), 2);
//! assert!(config.validate().is_ok());
//! ```

mod collision;
mod pit;
mod resources;
mod track;
mod vehicle;

pub use collision::CollisionConfig;
pub use pit::PitConfig;
pub use resources::ResourceConfig;
pub use track::{EntrantConfig, GridSlot, TrackConfig};
pub use vehicle::VehicleConfig;

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::debug;

use crate::{Result, SimError};

/// Accepted simulation rates, in Hz.
pub const TICK_RATE_RANGE: RangeInclusive<f64> = 1.0..=10_000.0;

/// Complete description of one race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Fixed simulation rate, within [`TICK_RATE_RANGE`]
    pub tick_rate_hz: f64,
    pub total_laps: u32,
    /// Grid hold before green; 0 starts racing on the first tick
    pub countdown_seconds: f64,
    /// Time the rest of the field has to finish once the leader is home
    pub finish_grace_seconds: f64,
    pub vehicle: VehicleConfig,
    pub resources: ResourceConfig,
    pub pit: PitConfig,
    pub collision: CollisionConfig,
    pub track: TrackConfig,
    pub entrants: Vec<EntrantConfig>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            total_laps: 3,
            countdown_seconds: 0.0,
            finish_grace_seconds: 60.0,
            vehicle: VehicleConfig::default(),
            resources: ResourceConfig::default(),
            pit: PitConfig::default(),
            collision: CollisionConfig::default(),
            track: TrackConfig::default(),
            entrants: vec![EntrantConfig::named("Player")],
        }
    }
}

impl RaceConfig {
    /// Parse a YAML race configuration.
    ///
    /// Only syntax and field types are checked here; call [`RaceConfig::validate`]
    /// (or construct a simulation, which validates) for semantic checks.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| SimError::Parse {
            context: "RaceConfig deserialization".to_string(),
            details: e.to_string(),
        })
    }

    /// Read, parse and validate a YAML race configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| SimError::file_error(path.to_path_buf(), e))?;
        let config = Self::parse(&yaml)?;
        config.validate()?;
        debug!(path = %path.display(), entrants = config.entrants.len(), "Loaded race config");
        Ok(config)
    }

    /// Fixed timestep in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }

    /// Check every section, reporting the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !TICK_RATE_RANGE.contains(&self.tick_rate_hz) {
            return Err(SimError::invalid_config(
                "race",
                format!(
                    "tick_rate_hz must be between {} and {}, got {}",
                    TICK_RATE_RANGE.start(),
                    TICK_RATE_RANGE.end(),
                    self.tick_rate_hz
                ),
            ));
        }
        if self.total_laps == 0 {
            return Err(SimError::invalid_config("race", "total_laps must be at least 1"));
        }
        if self.countdown_seconds < 0.0 || self.finish_grace_seconds < 0.0 {
            return Err(SimError::invalid_config(
                "race",
                "countdown_seconds and finish_grace_seconds must not be negative",
            ));
        }
        if self.entrants.is_empty() {
            return Err(SimError::invalid_config("entrants", "a race needs at least one entrant"));
        }
        for entrant in &self.entrants {
            entrant.validate(&self.resources)?;
        }

        self.vehicle.validate()?;
        self.resources.validate()?;
        self.pit.validate()?;
        self.collision.validate()?;
        self.track.validate(self.entrants.len())?;
        Ok(())
    }
}

/// Reject non-finite or non-positive constants.
pub(crate) fn require_positive(section: &str, name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid_config(section, format!("{name} must be positive, got {value}")))
    }
}

pub(crate) fn require_non_negative(section: &str, name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid_config(section, format!("{name} must not be negative, got {value}")))
    }
}

pub(crate) fn require_fraction(section: &str, name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::invalid_config(section, format!("{name} must be within 0..=1, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gate, Zone};

    #[test]
    fn default_config_is_valid() {
        let config = RaceConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.dt() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = RaceConfig::parse("{}").unwrap();
        assert_eq!(config, RaceConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = RaceConfig::parse(
            r#"
tick_rate_hz: 120
vehicle:
  max_speed_kmh: 250.0
pit:
  service_duration: 4.5
"#,
        )
        .unwrap();
        assert_eq!(config.tick_rate_hz, 120.0);
        assert_eq!(config.vehicle.max_speed_kmh, 250.0);
        assert_eq!(config.vehicle.mass, VehicleConfig::default().mass);
        assert_eq!(config.pit.service_duration, 4.5);
        assert_eq!(config.pit.speed_limit_kmh, PitConfig::default().speed_limit_kmh);
    }

    #[test]
    fn track_section_parses_gates_and_zones() {
        let config = RaceConfig::parse(
            r#"
track:
  start_finish: { a: [-10.0, 0.0], b: [10.0, 0.0], heading: 0.0 }
  checkpoints:
    - { a: [-10.0, 100.0], b: [10.0, 100.0], heading: 0.0 }
  pit_lane: { min: [-10.0, 20.0], max: [10.0, 80.0] }
  service_box: { min: [-10.0, 40.0], max: [10.0, 50.0] }
  bounds: { min: [-50.0, -50.0], max: [50.0, 200.0] }
  grid:
    - { position: [0.0, -5.0] }
"#,
        )
        .unwrap();
        assert_eq!(config.track.checkpoints, vec![Gate::new([-10.0, 100.0], [10.0, 100.0], 0.0)]);
        assert_eq!(config.track.service_box, Zone::new([-10.0, 40.0], [10.0, 50.0]));
        assert_eq!(config.track.drs_zones, TrackConfig::default().drs_zones);
        assert_eq!(config.track.grid[0].speed_kmh, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let error = RaceConfig::parse("total_laps: [not, a, number]").unwrap_err();
        assert!(matches!(error, SimError::Parse { .. }));
    }

    #[test]
    fn zero_laps_rejected() {
        let config = RaceConfig { total_laps: 0, ..RaceConfig::default() };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfig { ref section, .. }) if section == "race"
        ));
    }

    #[test]
    fn no_entrants_rejected() {
        let config = RaceConfig { entrants: Vec::new(), ..RaceConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn tick_rate_outside_range_rejected() {
        for rate in [0.0, -60.0, f64::NAN, 1e-25, 0.5, 20_000.0, f64::INFINITY] {
            let config = RaceConfig { tick_rate_hz: rate, ..RaceConfig::default() };
            assert!(config.validate().is_err(), "tick rate {rate} accepted");
        }
        for rate in [1.0, 240.0, 10_000.0] {
            let config = RaceConfig { tick_rate_hz: rate, ..RaceConfig::default() };
            assert!(config.validate().is_ok(), "tick rate {rate} rejected");
        }
    }

    #[test]
    fn missing_file_is_file_error() {
        let error = RaceConfig::from_file("/definitely/not/here/race.yaml").unwrap_err();
        assert!(matches!(error, SimError::File { .. }));
        assert!(error.is_recoverable());
    }
}
