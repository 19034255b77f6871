//! Normalized driver command

use serde::{Deserialize, Serialize};

/// Steering magnitudes below this are treated as "no steering input".
pub const STEER_EPSILON: f32 = 1e-3;

/// One tick worth of driver intent, produced by an input collaborator.
///
/// Every field has a defined default (no input). Values coming from outside are
/// clamped with [`InputCommand::clamped`] before the simulation reads them; NaN
/// is treated as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(default)]
pub struct InputCommand {
    /// Accelerator, 0.0..=1.0
    pub throttle: f32,
    /// Brake / reverse, 0.0..=1.0
    pub brake: f32,
    /// Steering, -1.0 (full left) ..= 1.0 (full right)
    pub steer: f32,
    /// Request reduced drag (only honoured inside DRS zones)
    pub drs_request: bool,
    /// Request energy-recovery boost
    pub ers_request: bool,
}

impl InputCommand {
    /// Full throttle, wheel straight.
    pub fn full_throttle() -> Self {
        Self { throttle: 1.0, ..Self::default() }
    }

    /// Full brake, wheel straight.
    pub fn full_brake() -> Self {
        Self { brake: 1.0, ..Self::default() }
    }

    pub fn with_steer(mut self, steer: f32) -> Self {
        self.steer = steer;
        self
    }

    pub fn with_ers(mut self, ers_request: bool) -> Self {
        self.ers_request = ers_request;
        self
    }

    pub fn with_drs(mut self, drs_request: bool) -> Self {
        self.drs_request = drs_request;
        self
    }

    /// Clamp every axis into its valid range.
    pub fn clamped(self) -> Self {
        Self {
            throttle: unit(self.throttle),
            brake: unit(self.brake),
            steer: if self.steer.is_nan() { 0.0 } else { self.steer.clamp(-1.0, 1.0) },
            drs_request: self.drs_request,
            ers_request: self.ers_request,
        }
    }

    pub fn is_steering(&self) -> bool {
        self.steer.abs() > STEER_EPSILON
    }
}

fn unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
