//! Gear selection and engine speed derivation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::SimError;

/// Selected gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Gear {
    Reverse,
    Neutral,
    /// Forward gear, 1-based
    Forward(u8),
}

impl Gear {
    /// Signed gear number as shown on a dash: -1 reverse, 0 neutral.
    pub fn number(self) -> i8 {
        match self {
            Gear::Reverse => -1,
            Gear::Neutral => 0,
            Gear::Forward(n) => n as i8,
        }
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gear::Reverse => f.write_str("R"),
            Gear::Neutral => f.write_str("N"),
            Gear::Forward(n) => write!(f, "{n}"),
        }
    }
}

/// Speed-ratio gearbox.
///
/// Gear `n` is engaged when `speed / max_speed` is at or above `thresholds[n - 1]`
/// and below `thresholds[n]`. There is no hysteresis band: a car hovering on a
/// threshold can flick between two gears from one tick to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gearbox {
    /// Lower speed-ratio bound of each forward gear; first entry is 0.0
    pub thresholds: Vec<f32>,
    /// Speed-ratio span used for RPM in each forward gear
    pub ratios: Vec<f32>,
    /// Speed-ratio span used for RPM in reverse
    pub reverse_ratio: f32,
    /// Below this speed (m/s) the box reports Neutral
    pub neutral_speed: f32,
    pub idle_rpm: f32,
    pub redline_rpm: f32,
}

impl Default for Gearbox {
    fn default() -> Self {
        Self {
            thresholds: vec![0.0, 0.15, 0.30, 0.45, 0.60, 0.75],
            ratios: vec![0.15, 0.30, 0.45, 0.60, 0.75, 1.0],
            reverse_ratio: 0.1,
            neutral_speed: 0.1,
            idle_rpm: 4_000.0,
            redline_rpm: 12_000.0,
        }
    }
}

impl Gearbox {
    /// Select the gear for a speed ratio and signed forward speed (m/s).
    pub fn select(&self, speed_ratio: f32, forward_speed: f32) -> Gear {
        if forward_speed < -self.neutral_speed {
            return Gear::Reverse;
        }
        if forward_speed.abs() < self.neutral_speed {
            return Gear::Neutral;
        }
        let engaged = self.thresholds.iter().filter(|&&t| speed_ratio >= t).count().max(1);
        Gear::Forward(engaged as u8)
    }

    /// Engine speed for a gear and speed ratio, clamped to `[idle, redline]`.
    pub fn rpm(&self, gear: Gear, speed_ratio: f32) -> f32 {
        let span = match gear {
            Gear::Neutral => return self.idle_rpm,
            Gear::Reverse => self.reverse_ratio,
            Gear::Forward(n) => {
                self.ratios.get(usize::from(n).saturating_sub(1)).copied().unwrap_or(1.0)
            }
        };
        let range = self.redline_rpm - self.idle_rpm;
        (self.idle_rpm + (speed_ratio.abs() / span) * range).clamp(self.idle_rpm, self.redline_rpm)
    }

    /// Validate the gearbox tables for consistency.
    pub fn validate(&self) -> crate::Result<()> {
        if self.thresholds.is_empty() {
            return Err(SimError::invalid_vehicle("gearbox needs at least one forward gear"));
        }
        if self.thresholds.len() > u8::MAX as usize {
            return Err(SimError::invalid_vehicle("too many forward gears"));
        }
        if self.thresholds[0] != 0.0 {
            return Err(SimError::invalid_vehicle(format!(
                "first gear threshold must be 0.0, got {}",
                self.thresholds[0]
            )));
        }
        if self.thresholds.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SimError::invalid_vehicle("gear thresholds must strictly increase"));
        }
        if self.ratios.len() != self.thresholds.len() {
            return Err(SimError::invalid_vehicle(format!(
                "{} gear ratios for {} forward gears",
                self.ratios.len(),
                self.thresholds.len()
            )));
        }
        if self.ratios.iter().chain(std::iter::once(&self.reverse_ratio)).any(|r| *r <= 0.0) {
            return Err(SimError::invalid_vehicle("gear ratios must be positive"));
        }
        if !(self.idle_rpm > 0.0 && self.idle_rpm < self.redline_rpm) {
            return Err(SimError::invalid_vehicle(format!(
                "idle rpm {} must be positive and below redline {}",
                self.idle_rpm, self.redline_rpm
            )));
        }
        if self.neutral_speed < 0.0 {
            return Err(SimError::invalid_vehicle("neutral speed must not be negative"));
        }
        Ok(())
    }
}
