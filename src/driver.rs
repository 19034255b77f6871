//! Driver spawns and runs the fixed-step simulation task

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Interval, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::TICK_RATE_RANGE;
use crate::provider::InputSource;
use crate::result::RaceResult;
use crate::sim::RaceSimulation;
use crate::types::{CarId, InputCommand, RaceSnapshot};

/// How fast the driver advances simulated time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacing {
    /// One tick per `1 / tick_rate_hz` of wall-clock time
    Realtime,
    /// Wall-clock speed multiplier, clamped to 0.1..=100
    Scaled(f64),
    /// As fast as possible, yielding to the runtime between ticks
    Unthrottled,
}

impl Pacing {
    /// Wall-clock period of one tick, `None` when unthrottled.
    ///
    /// Rates outside [`TICK_RATE_RANGE`] are clamped into it, so the period is
    /// always finite and non-zero.
    pub fn period(self, tick_rate_hz: f64) -> Option<Duration> {
        let speed = match self {
            Pacing::Realtime => 1.0,
            Pacing::Scaled(speed) => speed.max(0.1).min(100.0),
            Pacing::Unthrottled => return None,
        };
        let rate = tick_rate_hz.max(*TICK_RATE_RANGE.start()).min(*TICK_RATE_RANGE.end());
        Some(Duration::from_secs_f64(1.0 / (rate * speed)))
    }
}

/// Control messages for a running driver task.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCommand {
    /// Forwarded to [`RaceSimulation::queue_incident`]
    Incident { car: CarId, damage: f32, speed_penalty: f32 },
    /// Stop advancing time; inputs are not read while paused
    Pause,
    Resume,
    /// Back to the grid
    Reset,
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Latest published snapshot
    pub snapshots: watch::Receiver<Option<Arc<RaceSnapshot>>>,
    /// Classification, published once the task stops
    pub results: watch::Receiver<Option<Arc<RaceResult>>>,
    /// Control messages into the task
    pub commands: mpsc::UnboundedSender<DriverCommand>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Runs a [`RaceSimulation`] on its own task.
///
/// The task owns the simulation and the input sources. It stops when the race
/// reaches `Finished`, when cancelled, or when every snapshot receiver is gone,
/// and always publishes a [`RaceResult`] on the way out.
pub struct Driver;

impl Driver {
    /// Spawn the simulation task. `inputs[i]` drives car `i`; cars without a
    /// source get no input.
    pub fn spawn(
        simulation: RaceSimulation,
        inputs: Vec<Box<dyn InputSource>>,
        pacing: Pacing,
    ) -> DriverChannels {
        if inputs.len() != simulation.car_count() {
            warn!(
                sources = inputs.len(),
                cars = simulation.car_count(),
                "Input source count does not match entrant count"
            );
        }

        let (snapshot_tx, snapshot_rx) = watch::channel(Some(simulation.snapshot()));
        let (result_tx, result_rx) = watch::channel(None);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task = DriverTask {
            simulation,
            inputs,
            ticker: None,
            pacing,
            snapshot_tx,
            result_tx,
            commands: command_rx,
            cancel: cancel.clone(),
        };
        tokio::spawn(task.run());

        DriverChannels {
            snapshots: snapshot_rx,
            results: result_rx,
            commands: command_tx,
            cancel,
        }
    }
}

struct DriverTask {
    simulation: RaceSimulation,
    inputs: Vec<Box<dyn InputSource>>,
    pacing: Pacing,
    ticker: Option<Interval>,
    snapshot_tx: watch::Sender<Option<Arc<RaceSnapshot>>>,
    result_tx: watch::Sender<Option<Arc<RaceResult>>>,
    commands: mpsc::UnboundedReceiver<DriverCommand>,
    cancel: CancellationToken,
}

impl DriverTask {
    async fn run(mut self) {
        let tick_rate = self.simulation.config().tick_rate_hz;
        self.ticker = self.pacing.period(tick_rate).map(|period| {
            let mut ticker = interval(period);
            // Catch up after a stall so simulated time keeps pace with the wall clock
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            ticker
        });
        info!(tick_rate, pacing = ?self.pacing, "Simulation task started");

        let mut paused = false;
        let mut commands_open = true;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("Simulation task cancelled");
                    break;
                }
                command = self.commands.recv(), if commands_open => {
                    match command {
                        Some(command) => self.apply(command, &mut paused),
                        None => commands_open = false,
                    }
                    continue;
                }
                _ = pace(&mut self.ticker), if !paused => {}
            }

            let snapshot = self.tick();
            let finished = snapshot.phase.is_finished();
            if self.snapshot_tx.send(Some(snapshot)).is_err() {
                debug!("Snapshot receivers dropped, shutting down");
                break;
            }
            if finished {
                info!(tick = self.simulation.tick(), "Race finished");
                break;
            }
        }

        let result = self.simulation.result();
        info!(
            ticks = self.simulation.tick(),
            complete = result.complete,
            "Simulation task ended"
        );
        let _ = self.result_tx.send(Some(Arc::new(result)));
    }

    fn tick(&mut self) -> Arc<RaceSnapshot> {
        let previous = self.simulation.snapshot();
        let commands: Vec<InputCommand> = previous
            .cars
            .iter()
            .zip(self.inputs.iter_mut())
            .map(|(car, source)| source.command(car))
            .collect();
        let snapshot = self.simulation.step(&commands);
        trace!(tick = snapshot.tick, events = snapshot.events.len(), "Tick published");
        snapshot
    }

    fn apply(&mut self, command: DriverCommand, paused: &mut bool) {
        debug!(?command, "Driver command");
        match command {
            DriverCommand::Incident { car, damage, speed_penalty } => {
                if let Err(e) = self.simulation.queue_incident(car, damage, speed_penalty) {
                    warn!("Dropped incident: {}", e);
                }
            }
            DriverCommand::Pause => *paused = true,
            DriverCommand::Resume => *paused = false,
            DriverCommand::Reset => {
                self.simulation.reset();
                let _ = self.snapshot_tx.send(Some(self.simulation.snapshot()));
            }
        }
    }
}

async fn pace(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => tokio::task::yield_now().await,
    }
}
