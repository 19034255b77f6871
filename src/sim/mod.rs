//! The simulation core.
//!
//! [`RaceSimulation`] owns one instance of each component and drives them in a
//! fixed order every tick:
//!
//! ```text
//!   inputs ──► ResourceManager::gates_for ─┐
//!              PitStopController::override_for ─┤
//!                                               ▼
//!                         VehicleDynamics::update ──► ResourceManager::consume
//!                                               │
//!                         CollisionResolver::detect ──► apply_impact / apply_damage
//!                                               │
//!                         PitStopController::evaluate
//!                                               │
//!                         RaceProgressTracker::on_tick ──► ResourceManager::on_lap_start
//!                                               │
//!                                               ▼
//!                                      Arc<RaceSnapshot>
//! ```
//!
//! Components never call each other directly; the orchestrator passes values
//! between them.

mod collision;
mod dynamics;
mod pit;
mod progress;
mod resources;
mod step;

pub use collision::{CollisionResolver, Contact};
pub use dynamics::{DriveLoads, Impact, VehicleDynamics};
pub use pit::{PitSession, PitStopController};
pub use progress::{LapProgress, ProgressEvent, RaceProgressTracker};
pub use resources::{Consumption, ResourceManager};
pub use step::RaceSimulation;
