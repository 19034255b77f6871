//! Error types for race setup and session management.
//!
//! The simulation itself never fails mid-race: empty fuel tanks, worn tires and
//! exhausted boost are modelled as state and simply reduce the forces a car can
//! apply. The errors in this module are raised once, when a race is configured or a
//! session is started.
//!
//! ## Error Categories
//!
//! - **Track Errors**: malformed checkpoint lists, degenerate gates, empty grids
//! - **Vehicle Errors**: inconsistent gearbox tables or non-physical constants
//! - **Config Errors**: any other section of the race configuration
//! - **Parse / File Errors**: loading a YAML race configuration
//! - **Session Errors**: addressing an unknown car or a stopped session
//!
//! ## Recovery Guidance
//!
//! ```rust
//! use slipstream::SimError;
//!
//! let error = SimError::invalid_track("checkpoint 2 has zero length");
//! assert!(!error.is_recoverable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for simulation setup operations.
pub type Result<T, E = SimError> = std::result::Result<T, E>;

/// Main error type for race configuration and session management.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SimError {
    #[error("Invalid track layout: {reason}")]
    InvalidTrack { reason: String },

    #[error("Invalid vehicle setup: {reason}")]
    InvalidVehicle { reason: String },

    #[error("Invalid {section} configuration: {reason}")]
    InvalidConfig { section: String, reason: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Race config file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Car {car} is not part of this race ({entrants} entrants)")]
    UnknownCar { car: usize, entrants: usize },

    #[error("Race session is no longer running")]
    SessionClosed,
}

impl SimError {
    /// Returns whether retrying the failed operation can succeed without changing
    /// the configuration.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimError::InvalidTrack { .. } => false,
            SimError::InvalidVehicle { .. } => false,
            SimError::InvalidConfig { .. } => false,
            SimError::Parse { .. } => false,
            SimError::File { .. } => true,
            SimError::UnknownCar { .. } => false,
            SimError::SessionClosed => true,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SimError::InvalidTrack { .. } => vec![
                "Check that every checkpoint gate has two distinct endpoints",
                "Provide at least one checkpoint before the finish gate",
                "Make sure the service box lies inside the pit lane",
                "Provide a grid slot for every entrant",
            ],
            SimError::InvalidVehicle { .. } => vec![
                "Gear thresholds must start at 0.0 and strictly increase",
                "Provide one gear ratio per forward gear",
                "Idle RPM must be below redline RPM",
            ],
            SimError::InvalidConfig { .. } => vec![
                "Check the named section for negative or zero rates",
                "Compare against RaceConfig::default() for sane values",
            ],
            SimError::Parse { .. } => vec![
                "Validate the YAML syntax",
                "Check field names against the RaceConfig documentation",
            ],
            SimError::File { .. } => vec![
                "Check the file exists and is readable",
                "Check file permissions",
            ],
            SimError::UnknownCar { .. } => vec![
                "Use a car id taken from the race snapshot",
                "Car ids follow the entrant order of the config",
            ],
            SimError::SessionClosed => vec![
                "Start a new race session",
                "Keep the RaceSession alive while streams are consumed",
            ],
        }
    }

    /// Helper constructor for track layout errors.
    pub fn invalid_track(reason: impl Into<String>) -> Self {
        SimError::InvalidTrack { reason: reason.into() }
    }

    /// Helper constructor for vehicle setup errors.
    pub fn invalid_vehicle(reason: impl Into<String>) -> Self {
        SimError::InvalidVehicle { reason: reason.into() }
    }

    /// Helper constructor for errors in any other config section.
    pub fn invalid_config(section: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::InvalidConfig { section: section.into(), reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        SimError::File { path, source }
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
