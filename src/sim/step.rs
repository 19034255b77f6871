//! The fixed-timestep race loop.

use nalgebra::Vector2;
use std::sync::Arc;
use tracing::{debug, info, trace};

use super::{
    CollisionResolver, Impact, LapProgress, PitStopController, ProgressEvent,
    RaceProgressTracker, ResourceManager, VehicleDynamics,
};
use crate::config::RaceConfig;
use crate::result::{ClassifiedCar, RaceResult};
use crate::types::{
    CarId, CarSnapshot, InputCommand, RaceEvent, RacePhase, RaceSnapshot, ResourceState, Vehicle,
};
use crate::{Result, SimError};

const PHASE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
struct QueuedIncident {
    car: CarId,
    damage: f32,
    speed_penalty: f32,
}

/// Single owner of all race state.
///
/// Each [`step`](RaceSimulation::step) runs one tick in a fixed order: resource
/// gates, dynamics, collisions, pit lane, race progress, then publishes an
/// immutable [`RaceSnapshot`]. Nothing inside a step blocks or fails.
#[derive(Debug)]
pub struct RaceSimulation {
    config: Arc<RaceConfig>,
    dt: f64,
    tick: u64,
    time: f64,
    phase: RacePhase,
    dynamics: VehicleDynamics,
    resources: ResourceManager,
    pit: PitStopController,
    progress: RaceProgressTracker,
    collisions: CollisionResolver,
    vehicles: Vec<Vehicle>,
    names: Vec<String>,
    wear_delta: Vec<f32>,
    incidents: Vec<QueuedIncident>,
    snapshot: Arc<RaceSnapshot>,
}

impl RaceSimulation {
    /// Validate the configuration and put every car on its grid slot.
    pub fn new(config: RaceConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let track = &config.track;
        let cars = config.entrants.len();

        let dynamics = VehicleDynamics::new(config.vehicle.clone(), &config.pit);
        let vehicles: Vec<Vehicle> =
            track.grid.iter().take(cars).map(|slot| dynamics.spawn(slot)).collect();
        let starts = config
            .entrants
            .iter()
            .map(|entrant| {
                ResourceState::new(
                    entrant.starting_fuel,
                    entrant.starting_tire_wear,
                    entrant.starting_energy.unwrap_or(config.resources.max_energy),
                    config.resources.ambient_temperature,
                )
            })
            .collect();

        let mut simulation = Self {
            dt: config.dt(),
            tick: 0,
            time: 0.0,
            phase: initial_phase(&config),
            resources: ResourceManager::new(config.resources.clone(), starts),
            pit: PitStopController::new(config.pit.clone(), track.pit_lane, track.service_box, cars),
            progress: RaceProgressTracker::new(
                track.checkpoints.clone(),
                track.start_finish,
                config.total_laps,
                cars,
            ),
            collisions: CollisionResolver::new(config.collision.clone(), track.bounds),
            dynamics,
            vehicles,
            names: config.entrants.iter().map(|entrant| entrant.name.clone()).collect(),
            wear_delta: vec![0.0; cars],
            incidents: Vec::new(),
            snapshot: Arc::new(RaceSnapshot {
                tick: 0,
                time: 0.0,
                phase: RacePhase::Green,
                total_laps: config.total_laps,
                cars: Vec::new(),
                events: Vec::new(),
            }),
            config,
        };
        simulation.publish(Vec::new());

        info!(
            entrants = cars,
            laps = simulation.config.total_laps,
            tick_rate_hz = simulation.config.tick_rate_hz,
            "Race simulation created"
        );
        Ok(simulation)
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Shared handle to the configuration, for collaborators that outlive a borrow.
    pub fn config_arc(&self) -> Arc<RaceConfig> {
        Arc::clone(&self.config)
    }

    /// Fixed timestep in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn car_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn vehicle(&self, car: CarId) -> Result<&Vehicle> {
        self.vehicles.get(car.index()).ok_or_else(|| self.unknown(car))
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn pit(&self) -> &PitStopController {
        &self.pit
    }

    pub fn progress(&self) -> &RaceProgressTracker {
        &self.progress
    }

    /// Latest published snapshot. Calling this repeatedly within a tick returns the
    /// same snapshot and changes nothing.
    pub fn snapshot(&self) -> Arc<RaceSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Inject damage and a speed penalty for one car, applied in the next tick's
    /// collision phase. `speed_penalty` is the fraction of speed lost.
    pub fn queue_incident(&mut self, car: CarId, damage: f32, speed_penalty: f32) -> Result<()> {
        if car.index() >= self.vehicles.len() {
            return Err(self.unknown(car));
        }
        self.incidents.push(QueuedIncident {
            car,
            damage: damage.max(0.0),
            speed_penalty: speed_penalty.clamp(0.0, 1.0),
        });
        Ok(())
    }

    /// Advance one fixed tick.
    ///
    /// `inputs` is indexed by car; missing entries count as no input. Once the race
    /// is finished this returns the final snapshot without advancing.
    pub fn step(&mut self, inputs: &[InputCommand]) -> Arc<RaceSnapshot> {
        if self.phase.is_finished() {
            return self.snapshot();
        }
        let dt = self.dt;
        self.tick += 1;
        self.time += dt;
        let mut events = Vec::new();

        if let RacePhase::Countdown { remaining } = self.phase {
            let remaining = remaining - dt;
            if remaining > PHASE_EPSILON {
                self.phase = RacePhase::Countdown { remaining };
                return self.publish(events);
            }
            self.set_phase(RacePhase::Green, &mut events);
        }
        let was_finishing = matches!(self.phase, RacePhase::Finishing { .. });

        let cars = self.vehicles.len();
        let previous: Vec<Vector2<f32>> =
            self.vehicles.iter().map(Vehicle::plane_position).collect();
        let active: Vec<bool> =
            (0..cars).map(|i| !self.progress.is_finished(CarId(i))).collect();

        // Resource gates, pit override and dynamics
        for (i, vehicle) in self.vehicles.iter_mut().enumerate() {
            let car = CarId(i);
            if !active[i] {
                self.wear_delta[i] = 0.0;
                continue;
            }
            let Some(gates) = self.resources.gates_for(car) else {
                continue;
            };
            let input = inputs.get(i).copied().unwrap_or_default().clamped();
            let pit = self.pit.override_for(car);
            let in_drs_zone = self.config.track.in_drs_zone(vehicle.plane_position());
            let loads = self.dynamics.update(vehicle, &input, &gates, pit, in_drs_zone, dt as f32);
            let used = self.resources.consume(car, dt as f32, &loads);
            self.wear_delta[i] = used.tire_wear_delta;
            if used.boost_exhausted {
                events.push(RaceEvent::BoostExhausted { car });
            }
        }

        // Contacts, resolved atomically against post-integration positions
        for contact in self.collisions.detect(&self.vehicles, &active) {
            self.dynamics.apply_impact(&mut self.vehicles[contact.car.index()], &contact.impact);
            self.resources.apply_damage(contact.car, contact.damage);
            if contact.damage > 0.0 {
                debug!(car = %contact.car, damage = contact.damage, "Collision");
            }
            events.push(RaceEvent::Collision {
                car: contact.car,
                other: contact.other,
                impact_speed: contact.impact_speed,
                damage: contact.damage,
            });
        }
        for incident in self.incidents.drain(..) {
            let index = incident.car.index();
            if !active[index] {
                continue;
            }
            self.dynamics
                .apply_impact(&mut self.vehicles[index], &Impact::slowdown(incident.speed_penalty));
            self.resources.apply_damage(incident.car, incident.damage);
            events.push(RaceEvent::Incident {
                car: incident.car,
                damage: incident.damage,
                speed_penalty: incident.speed_penalty,
            });
        }

        // Pit lane
        for (i, vehicle) in self.vehicles.iter().enumerate() {
            if active[i] {
                self.pit.evaluate(
                    CarId(i),
                    vehicle.plane_position(),
                    vehicle.speed(),
                    dt,
                    &mut self.resources,
                    &mut events,
                );
            }
        }

        // Checkpoints and laps
        for (i, vehicle) in self.vehicles.iter().enumerate() {
            if !active[i] {
                continue;
            }
            let car = CarId(i);
            match self.progress.on_tick(car, previous[i], vehicle.plane_position(), dt) {
                Some(ProgressEvent::CheckpointPassed { index }) => {
                    events.push(RaceEvent::CheckpointPassed { car, index });
                }
                Some(ProgressEvent::LapCompleted { lap, time, personal_best }) => {
                    self.resources.on_lap_start(car);
                    events.push(RaceEvent::LapCompleted { car, lap, time, personal_best });
                }
                Some(ProgressEvent::RaceFinished { position, total_time, lap_time, .. }) => {
                    debug!(car = %car, position, lap_time, "Final lap");
                    events.push(RaceEvent::RaceFinished { car, position, total_time });
                }
                None => {}
            }
        }

        if self.progress.all_finished() {
            self.set_phase(RacePhase::Finished, &mut events);
        } else if let RacePhase::Finishing { remaining } = self.phase {
            if was_finishing {
                let remaining = remaining - dt;
                if remaining > PHASE_EPSILON {
                    self.phase = RacePhase::Finishing { remaining };
                } else {
                    self.set_phase(RacePhase::Finished, &mut events);
                }
            }
        } else if self.progress.finishers() > 0 {
            let grace = self.config.finish_grace_seconds;
            let next = if grace > PHASE_EPSILON {
                RacePhase::Finishing { remaining: grace }
            } else {
                RacePhase::Finished
            };
            self.set_phase(next, &mut events);
        }

        trace!(tick = self.tick, events = events.len(), "Tick complete");
        self.publish(events)
    }

    /// Put every car back on the grid and restart the clock.
    pub fn reset(&mut self) {
        self.vehicles.iter_mut().for_each(Vehicle::reset);
        self.resources.reset();
        self.pit.reset();
        self.progress.reset();
        self.wear_delta.iter_mut().for_each(|delta| *delta = 0.0);
        self.incidents.clear();
        self.tick = 0;
        self.time = 0.0;
        self.phase = initial_phase(&self.config);
        self.publish(Vec::new());
        info!("Race reset");
    }

    /// Classification as it stands. Final once the phase is `Finished`.
    pub fn result(&self) -> RaceResult {
        let positions: Vec<Vector2<f32>> =
            self.vehicles.iter().map(Vehicle::plane_position).collect();
        let classification = self
            .progress
            .standings(&positions)
            .into_iter()
            .enumerate()
            .filter_map(|(rank, car)| {
                let progress = self.progress.progress(car)?;
                let state = self.resources.state(car)?;
                Some(ClassifiedCar {
                    position: rank + 1,
                    car,
                    name: self.names[car.index()].clone(),
                    finished: progress.finished(),
                    total_time: progress.finished().then_some(progress.race_time),
                    lap_times: progress.record.completed().to_vec(),
                    best_lap: progress.record.best(),
                    damage: state.damage,
                    fuel: state.fuel,
                    tire_wear: state.tire_wear,
                    energy_reserve: state.energy_reserve,
                })
            })
            .collect();
        RaceResult {
            total_laps: self.config.total_laps,
            session_time: self.time,
            complete: self.phase.is_finished(),
            classification,
        }
    }

    fn set_phase(&mut self, phase: RacePhase, events: &mut Vec<RaceEvent>) {
        if std::mem::discriminant(&phase) == std::mem::discriminant(&self.phase) {
            return;
        }
        info!(from = ?self.phase, to = ?phase, tick = self.tick, "Race phase changed");
        self.phase = phase;
        events.push(RaceEvent::PhaseChanged { phase });
    }

    fn publish(&mut self, events: Vec<RaceEvent>) -> Arc<RaceSnapshot> {
        let positions: Vec<Vector2<f32>> =
            self.vehicles.iter().map(Vehicle::plane_position).collect();
        let mut running_order = vec![0; self.vehicles.len()];
        for (rank, car) in self.progress.standings(&positions).into_iter().enumerate() {
            running_order[car.index()] = rank + 1;
        }

        let cars = self
            .resources
            .states()
            .iter()
            .zip(self.progress.all())
            .enumerate()
            .map(|(i, (state, progress))| {
                self.car_snapshot(CarId(i), state, progress, running_order[i])
            })
            .collect();
        self.snapshot = Arc::new(RaceSnapshot {
            tick: self.tick,
            time: self.time,
            phase: self.phase,
            total_laps: self.config.total_laps,
            cars,
            events,
        });
        self.snapshot()
    }

    fn car_snapshot(
        &self,
        car: CarId,
        state: &ResourceState,
        progress: &LapProgress,
        position_in_race: usize,
    ) -> CarSnapshot {
        let i = car.index();
        let kinematics = self.vehicles[i].kinematics();
        CarSnapshot {
            id: car,
            name: self.names[i].clone(),
            position: [kinematics.position.x, kinematics.position.y, kinematics.position.z],
            yaw: kinematics.yaw,
            steering_angle: kinematics.steering_angle,
            speed_kmh: kinematics.speed_kmh,
            gear: kinematics.gear,
            rpm: kinematics.rpm,
            drs_active: kinematics.drs_active,
            fuel: state.fuel,
            tire_wear: state.tire_wear,
            tire_wear_delta: self.wear_delta[i],
            tire_temperature: state.tire_temperature,
            energy_reserve: state.energy_reserve,
            boost_used_this_lap: state.boost_used_this_lap,
            boost_available: self
                .resources
                .gates_for(car)
                .is_some_and(|gates| gates.boost_available),
            damage: state.damage,
            pit: self.pit.phase(car),
            lap: progress.lap.min(self.config.total_laps),
            laps_completed: progress.record.laps_completed(),
            next_checkpoint: progress.cursor,
            current_lap_time: progress.record.current(),
            last_lap_time: progress.record.last(),
            best_lap_time: progress.record.best().map(|best| best.time),
            race_time: progress.race_time,
            position_in_race,
            finished: progress.finished(),
        }
    }

    fn unknown(&self, car: CarId) -> SimError {
        SimError::UnknownCar { car: car.index(), entrants: self.vehicles.len() }
    }
}

fn initial_phase(config: &RaceConfig) -> RacePhase {
    if config.countdown_seconds > PHASE_EPSILON {
        RacePhase::Countdown { remaining: config.countdown_seconds }
    } else {
        RacePhase::Green
    }
}
