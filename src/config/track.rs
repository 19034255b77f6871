use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use super::ResourceConfig;
use crate::types::{Gate, PERCENT, Zone};
use crate::{Result, SimError};

/// Flat circuit layout on the x/z plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub start_finish: Gate,
    /// Passed cyclically, in order, before the finish gate
    pub checkpoints: Vec<Gate>,
    pub pit_lane: Zone,
    /// Where the car stops for service; must lie inside the pit lane
    pub service_box: Zone,
    pub drs_zones: Vec<Zone>,
    /// Walls
    pub bounds: Zone,
    /// One slot per entrant, in entrant order
    pub grid: Vec<GridSlot>,
}

/// Starting position of one car.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct GridSlot {
    /// `[x, z]`
    pub position: [f32; 2],
    #[serde(default)]
    pub yaw: f32,
    /// Non-zero for a rolling start
    #[serde(default)]
    pub speed_kmh: f32,
}

impl GridSlot {
    pub fn standing(x: f32, z: f32) -> Self {
        Self { position: [x, z], yaw: 0.0, speed_kmh: 0.0 }
    }
}

/// The default layout is a 200 m x 540 m rectangle driven clockwise from the
/// bottom of its left straight, with the pit lane alongside that straight.
impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            start_finish: Gate::new([-15.0, 0.0], [15.0, 0.0], 0.0),
            checkpoints: vec![
                Gate::new([-15.0, 250.0], [15.0, 250.0], 0.0),
                Gate::new([100.0, 485.0], [100.0, 515.0], FRAC_PI_2),
                Gate::new([185.0, 250.0], [215.0, 250.0], PI),
                Gate::new([185.0, 50.0], [215.0, 50.0], PI),
                Gate::new([100.0, -55.0], [100.0, -25.0], -FRAC_PI_2),
            ],
            pit_lane: Zone::new([-30.0, 20.0], [-18.0, 220.0]),
            service_box: Zone::new([-30.0, 150.0], [-18.0, 165.0]),
            drs_zones: vec![Zone::new([-15.0, 20.0], [15.0, 480.0])],
            bounds: Zone::new([-60.0, -80.0], [260.0, 560.0]),
            grid: vec![
                GridSlot::standing(0.0, -8.0),
                GridSlot::standing(6.0, -16.0),
                GridSlot::standing(0.0, -24.0),
                GridSlot::standing(6.0, -32.0),
            ],
        }
    }
}

impl TrackConfig {
    /// A 1.3 km straight with the pit lane on the racing line, for acceleration,
    /// braking and pit-stop runs. The single checkpoint sits beyond the pit exit.
    pub fn drag_strip() -> Self {
        Self {
            start_finish: Gate::new([-20.0, 0.0], [20.0, 0.0], 0.0),
            checkpoints: vec![Gate::new([-20.0, 600.0], [20.0, 600.0], 0.0)],
            pit_lane: Zone::new([-20.0, 100.0], [20.0, 400.0]),
            service_box: Zone::new([-20.0, 300.0], [20.0, 310.0]),
            drs_zones: vec![Zone::new([-20.0, 450.0], [20.0, 1100.0])],
            bounds: Zone::new([-20.0, -100.0], [20.0, 1200.0]),
            grid: vec![
                GridSlot::standing(-6.0, -5.0),
                GridSlot::standing(6.0, -15.0),
                GridSlot::standing(-6.0, -25.0),
                GridSlot::standing(6.0, -35.0),
            ],
        }
    }

    /// A 400 m point-to-point sprint: one checkpoint at half distance, the
    /// finish gate at the far end and a pit lane off to the right.
    pub fn sprint() -> Self {
        Self {
            start_finish: Gate::new([-20.0, 400.0], [20.0, 400.0], 0.0),
            checkpoints: vec![Gate::new([-20.0, 200.0], [20.0, 200.0], 0.0)],
            pit_lane: Zone::new([25.0, 50.0], [35.0, 350.0]),
            service_box: Zone::new([25.0, 200.0], [35.0, 210.0]),
            drs_zones: Vec::new(),
            bounds: Zone::new([-20.0, -60.0], [40.0, 500.0]),
            ..Self::drag_strip()
        }
    }

    /// Gate that closes the lap for a checkpoint cursor value.
    pub fn target(&self, cursor: usize) -> &Gate {
        self.checkpoints.get(cursor).unwrap_or(&self.start_finish)
    }

    pub fn in_drs_zone(&self, p: nalgebra::Vector2<f32>) -> bool {
        self.drs_zones.iter().any(|zone| zone.contains(p))
    }

    pub fn validate(&self, entrants: usize) -> Result<()> {
        if self.checkpoints.is_empty() {
            return Err(SimError::invalid_track("at least one checkpoint is required"));
        }
        check_gate("start/finish gate", &self.start_finish)?;
        for (i, gate) in self.checkpoints.iter().enumerate() {
            check_gate(&format!("checkpoint {i}"), gate)?;
        }

        for (name, zone) in [
            ("pit lane", &self.pit_lane),
            ("service box", &self.service_box),
            ("track bounds", &self.bounds),
        ] {
            check_zone(name, zone)?;
        }
        for (i, zone) in self.drs_zones.iter().enumerate() {
            check_zone(&format!("DRS zone {i}"), zone)?;
        }
        if !self.pit_lane.contains_zone(&self.service_box) {
            return Err(SimError::invalid_track("service box must lie inside the pit lane"));
        }

        if self.grid.len() < entrants {
            return Err(SimError::invalid_track(format!(
                "{} grid slots for {} entrants",
                self.grid.len(),
                entrants
            )));
        }
        for (i, slot) in self.grid.iter().take(entrants).enumerate() {
            if !self.bounds.contains(slot.position.into()) {
                return Err(SimError::invalid_track(format!("grid slot {i} is outside the track")));
            }
            if !(slot.speed_kmh.is_finite() && slot.speed_kmh >= 0.0) || !slot.yaw.is_finite() {
                return Err(SimError::invalid_track(format!("grid slot {i} has a bad yaw or speed")));
            }
        }
        Ok(())
    }
}

fn check_gate(name: &str, gate: &Gate) -> Result<()> {
    let finite = gate.a.iter().chain(gate.b.iter()).all(|v| v.is_finite()) && gate.heading.is_finite();
    if !finite || gate.length() <= f32::EPSILON {
        return Err(SimError::invalid_track(format!("{name} is degenerate")));
    }
    Ok(())
}

fn check_zone(name: &str, zone: &Zone) -> Result<()> {
    if !(zone.area() > 0.0) {
        return Err(SimError::invalid_track(format!("{name} has no area")));
    }
    Ok(())
}

/// One car on the entry list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntrantConfig {
    pub name: String,
    pub starting_fuel: f32,
    pub starting_tire_wear: f32,
    /// Defaults to a full store
    pub starting_energy: Option<f32>,
}

impl Default for EntrantConfig {
    fn default() -> Self {
        Self::named("Driver")
    }
}

impl EntrantConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            starting_fuel: PERCENT,
            starting_tire_wear: PERCENT,
            starting_energy: None,
        }
    }

    pub(crate) fn validate(&self, resources: &ResourceConfig) -> Result<()> {
        let section = format!("entrant {}", self.name);
        if !(0.0..=PERCENT).contains(&self.starting_fuel) {
            return Err(SimError::invalid_config(section, "starting_fuel must be within 0..=100"));
        }
        if !(0.0..=PERCENT).contains(&self.starting_tire_wear) {
            return Err(SimError::invalid_config(
                section,
                "starting_tire_wear must be within 0..=100",
            ));
        }
        if let Some(energy) = self.starting_energy
            && !(0.0..=resources.max_energy).contains(&energy)
        {
            return Err(SimError::invalid_config(
                section,
                format!("starting_energy must be within 0..={}", resources.max_energy),
            ));
        }
        Ok(())
    }
}
