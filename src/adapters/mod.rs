//! Per-car views over published race snapshots.
//!
//! Consumers rarely want the whole [`RaceSnapshot`](crate::types::RaceSnapshot).
//! A [`SnapshotView`] projects it onto one car and one concern, in two phases:
//! - **Subscribe time**: `bind()` checks the car against the race configuration
//!   and captures the static data the view needs (lap count, rev band, tick length)
//! - **Per frame**: `adapt()` indexes the bound car and copies fields out
//!
//! Unknown cars are therefore rejected when subscribing, not on every frame.
//!
//! # Example
//!
//! ```rust
//! use slipstream::{RaceConfig, RaceSimulation, types::{CarId, InputCommand}};
//! use slipstream::adapters::{HudView, SnapshotView};
//!
//! # fn main() -> slipstream::Result<()> {
//! let config = RaceConfig::default();
//! let binding = HudView::bind(&config, CarId(0))?;
//! let mut simulation = RaceSimulation::new(config)?;
//!
//! let snapshot = simulation.step(&[InputCommand::full_throttle()]);
//! let hud = HudView::adapt(&snapshot, &binding).expect("car 0 is on the grid");
//! assert_eq!(hud.lap, 1);
//! assert!(hud.speed_kmh > 0.0);
//! # Ok(())
//! # }
//! ```

mod binding;
mod snapshot_view;
mod views;

pub use binding::{SMOKE_WEAR_RATE, ViewBinding};
pub use snapshot_view::SnapshotView;
pub use views::{EngineAudio, HudView, RenderView};
