//! Deterministic fixed-step simulation core for arcade racing games.
//!
//! Slipstream owns everything between the controller and the screen: vehicle
//! dynamics with gears, drag and lateral grip; fuel, tire, energy and damage
//! budgets; a pit-lane state machine with timed service; checkpoint-validated lap
//! timing and race classification. Rendering, audio and input devices stay outside
//! and talk to the core through snapshots and input sources.
//!
//! # Features
//!
//! - **Deterministic**: fixed timestep, fixed component order, no globals
//! - **Snapshot-based**: every tick publishes an immutable `Arc<RaceSnapshot>`
//! - **Async sessions**: run the loop on a tokio task and sample views at any rate
//! - **YAML configuration**: every tunable has a default, so minimal files work
//!
//! # Quick Start
//!
//! ## Stepping a race by hand
//!
//! ```rust
//! use slipstream::{RaceConfig, RaceSimulation};
//! use slipstream::types::InputCommand;
//!
//! # fn main() -> slipstream::Result<()> {
//! let mut simulation = RaceSimulation::new(RaceConfig::default())?;
//! for _ in 0..60 {
//!     simulation.step(&[InputCommand::full_throttle()]);
//! }
//! let car = &simulation.snapshot().cars[0];
//! assert!(car.speed_kmh > 30.0);
//! assert!(car.gear.number() > 0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a session
//!
//! ```rust,no_run
//! use slipstream::{Slipstream, HudView, driver::Pacing, providers::ChannelInput};
//! use slipstream::types::{CarId, FrameRate, InputCommand};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> slipstream::Result<()> {
//!     let (input, handle) = ChannelInput::new();
//!     let session = Slipstream::open("race.yaml", vec![Box::new(input)], Pacing::Realtime)?;
//!
//!     handle.send(InputCommand::full_throttle());
//!     let mut hud = session.subscribe::<HudView>(CarId(0), FrameRate::Max(30))?;
//!     while let Some(view) = hud.next().await {
//!         println!("{:>3.0} km/h  gear {}", view.speed_kmh, view.gear);
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod adapters;
pub mod config;
mod error;
pub mod result;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Simulation
pub mod sim;

// Task-based session architecture
pub mod driver;
pub mod provider;
pub mod providers;
pub mod session;
pub mod stream;

// Core exports
pub use adapters::{EngineAudio, HudView, RenderView, SnapshotView, ViewBinding};
pub use config::RaceConfig;
pub use error::*;
pub use result::{ClassifiedCar, RaceResult};
pub use sim::RaceSimulation;

// Session exports
pub use driver::Pacing;
pub use provider::InputSource;
pub use session::RaceSession;

use std::path::Path;

/// Unified entry point for races.
///
/// # Examples
///
/// ```rust
/// use slipstream::{RaceConfig, Slipstream};
///
/// # fn main() -> slipstream::Result<()> {
/// let mut simulation = Slipstream::simulate(RaceConfig::default())?;
/// let snapshot = simulation.step(&[]);
/// assert_eq!(snapshot.tick, 1);
/// # Ok(())
/// # }
/// ```
pub struct Slipstream;

impl Slipstream {
    /// Build a race to be stepped by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if any section of `config` fails validation.
    pub fn simulate(config: RaceConfig) -> Result<RaceSimulation> {
        RaceSimulation::new(config)
    }

    /// Start a race on a background task. Requires a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if any section of `config` fails validation.
    pub fn start(
        config: RaceConfig,
        inputs: Vec<Box<dyn InputSource>>,
        pacing: Pacing,
    ) -> Result<RaceSession> {
        RaceSession::start(config, inputs, pacing)
    }

    /// Load a YAML race configuration and start it on a background task.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML does not describe a race configuration
    /// - Any section fails validation
    pub fn open<P: AsRef<Path>>(
        path: P,
        inputs: Vec<Box<dyn InputSource>>,
        pacing: Pacing,
    ) -> Result<RaceSession> {
        let config = RaceConfig::from_file(path)?;
        RaceSession::start(config, inputs, pacing)
    }
}
