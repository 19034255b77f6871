//! Asynchronous race sessions.
//!
//! A [`RaceSession`] runs a [`RaceSimulation`] on a background task (see
//! [`Driver`]) and hands snapshots to any number of consumers through a watch
//! channel. Consumers never slow the simulation down: each one samples the latest
//! published snapshot at its own rate and projects it with a [`SnapshotView`].
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use slipstream::adapters::HudView;
//! use slipstream::driver::Pacing;
//! use slipstream::providers::Autopilot;
//! use slipstream::session::RaceSession;
//! use slipstream::types::{CarId, FrameRate};
//! use slipstream::RaceConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> slipstream::Result<()> {
//!     let config = RaceConfig::from_file("race.yaml")?;
//!     let autopilot = Autopilot::new(Arc::new(config.track.clone()));
//!     let session = RaceSession::start(config, vec![Box::new(autopilot)], Pacing::Realtime)?;
//!
//!     let mut hud = session.subscribe::<HudView>(CarId(0), FrameRate::Max(30))?;
//!     while let Some(view) = hud.next().await {
//!         println!("lap {}/{} {:.0} km/h", view.lap, view.total_laps, view.speed_kmh);
//!     }
//!
//!     let result = session.finished().await?;
//!     println!("winner: {:?}", result.winner().map(|car| &car.name));
//!     Ok(())
//! }
//! ```

use futures::future::ready;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::adapters::SnapshotView;
use crate::driver::{Driver, DriverCommand, Pacing};
use crate::provider::InputSource;
use crate::result::RaceResult;
use crate::sim::RaceSimulation;
use crate::stream::SampleExt;
use crate::types::{CarId, FrameRate, RaceSnapshot};
use crate::{RaceConfig, Result, SimError};


/// A race running on a background task.
pub struct RaceSession {
    config: Arc<RaceConfig>,
    /// Wall-clock time between published ticks, `None` when unthrottled
    tick_period: Option<Duration>,
    snapshots: watch::Receiver<Option<Arc<RaceSnapshot>>>,
    results: watch::Receiver<Option<Arc<RaceResult>>>,
    commands: mpsc::UnboundedSender<DriverCommand>,
    cancel: CancellationToken,
}

impl RaceSession {
    /// Validate `config` and start the simulation task.
    ///
    /// `inputs[i]` drives car `i`. Must be called from within a tokio runtime.
    pub fn start(
        config: RaceConfig,
        inputs: Vec<Box<dyn InputSource>>,
        pacing: Pacing,
    ) -> Result<Self> {
        let simulation = RaceSimulation::new(config)?;
        let config = simulation.config_arc();
        let tick_period = pacing.period(config.tick_rate_hz);
        let channels = Driver::spawn(simulation, inputs, pacing);
        info!(
            entrants = config.entrants.len(),
            laps = config.total_laps,
            tick_rate = config.tick_rate_hz,
            "Race session started"
        );

        Ok(Self {
            config,
            tick_period,
            snapshots: channels.snapshots,
            results: channels.results,
            commands: channels.commands,
            cancel: channels.cancel,
        })
    }

    /// Subscribe to one car through a view, sampled at `rate`.
    ///
    /// `rate` is measured in wall-clock time against the session's pacing, so a
    /// `Max` rate at or above the publication rate delivers every tick.
    ///
    /// Fails if the view cannot bind to the car. The stream ends when the
    /// session stops.
    pub fn subscribe<V>(&self, car: CarId, rate: FrameRate) -> Result<BoxStream<'static, V>>
    where
        V: SnapshotView,
    {
        let binding = V::bind(&self.config, car)?;
        let snapshots = self.watch();

        Ok(snapshots
            .at_rate(rate, self.tick_period)
            .filter_map(move |snapshot| ready(V::adapt(&snapshot, &binding)))
            .boxed())
    }

    /// Every published snapshot a consumer keeps up with, newest first wins.
    pub fn snapshots(&self) -> impl Stream<Item = Arc<RaceSnapshot>> + 'static {
        self.watch().dedup_ticks()
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> Option<Arc<RaceSnapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Final classification, once the task has stopped.
    pub fn result(&self) -> Option<Arc<RaceResult>> {
        self.results.borrow().clone()
    }

    /// Wait for the race to end and return its classification.
    pub async fn finished(&self) -> Result<Arc<RaceResult>> {
        let mut results = self.results.clone();
        let result = results.wait_for(Option::is_some).await.map_err(|_| SimError::SessionClosed)?;
        result.clone().ok_or(SimError::SessionClosed)
    }

    /// Stop the simulation and return the classification as it stood.
    pub async fn stop(&self) -> Result<Arc<RaceResult>> {
        debug!("Stopping race session");
        self.cancel.cancel();
        self.finished().await
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.results.borrow().is_none()
    }

    /// Inject damage and a speed penalty, applied on the next tick.
    pub fn queue_incident(&self, car: CarId, damage: f32, speed_penalty: f32) -> Result<()> {
        let entrants = self.config.entrants.len();
        if car.index() >= entrants {
            return Err(SimError::UnknownCar { car: car.index(), entrants });
        }
        self.send(DriverCommand::Incident { car, damage, speed_penalty })
    }

    pub fn pause(&self) -> Result<()> {
        self.send(DriverCommand::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(DriverCommand::Resume)
    }

    /// Put every car back on the grid and restart the clock.
    pub fn reset(&self) -> Result<()> {
        self.send(DriverCommand::Reset)
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Simulation ticks per second
    pub fn tick_rate(&self) -> f64 {
        self.config.tick_rate_hz
    }

    fn send(&self, command: DriverCommand) -> Result<()> {
        if !self.is_running() {
            return Err(SimError::SessionClosed);
        }
        self.commands.send(command).map_err(|_| SimError::SessionClosed)
    }

    fn watch(&self) -> impl Stream<Item = Arc<RaceSnapshot>> + Send + 'static {
        WatchStream::new(self.snapshots.clone()).filter_map(|opt| async move { opt })
    }
}

impl Drop for RaceSession {
    fn drop(&mut self) {
        debug!("Dropping race session");
        self.cancel.cancel();
    }
}
