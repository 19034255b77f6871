//! Pit-lane state machine.
//!
//! A [`PitSession`] exists from the moment a car enters the pit-lane zone until it
//! leaves it. While a session exists the car's longitudinal control is
//! overridden: a speed cap in every phase, a full hold while servicing.

use nalgebra::Vector2;
use tracing::{debug, info};

use super::ResourceManager;
use crate::config::PitConfig;
use crate::types::{CarId, PitOverride, PitPhase, RaceEvent, Zone};

/// Slack on the service timer so accumulated float steps still land on the tick.
const SERVICE_EPSILON: f64 = 1e-6;

/// One car's visit to the pit lane.
#[derive(Debug, Clone, PartialEq)]
pub struct PitSession {
    pub phase: PitPhase,
    /// Seconds spent in `Servicing`
    pub elapsed: f64,
    pub duration: f64,
    pub serviced: bool,
}

impl PitSession {
    fn new(duration: f64) -> Self {
        Self { phase: PitPhase::ApproachingPit, elapsed: 0.0, duration, serviced: false }
    }
}

#[derive(Debug, Clone)]
pub struct PitStopController {
    config: PitConfig,
    pit_lane: Zone,
    service_box: Zone,
    sessions: Vec<Option<PitSession>>,
}

impl PitStopController {
    pub fn new(config: PitConfig, pit_lane: Zone, service_box: Zone, cars: usize) -> Self {
        Self { config, pit_lane, service_box, sessions: vec![None; cars] }
    }

    pub fn config(&self) -> &PitConfig {
        &self.config
    }

    /// Current phase; cars without a session, or not in the race, are on track.
    pub fn phase(&self, car: CarId) -> PitPhase {
        self.session(car).map_or(PitPhase::OnTrack, |session| session.phase)
    }

    pub fn session(&self, car: CarId) -> Option<&PitSession> {
        self.sessions.get(car.index()).and_then(Option::as_ref)
    }

    /// Longitudinal constraint for the next integration step.
    pub fn override_for(&self, car: CarId) -> PitOverride {
        match self.phase(car) {
            PitPhase::OnTrack => PitOverride::Free,
            PitPhase::Servicing => PitOverride::Hold,
            _ => PitOverride::SpeedCap(self.config.speed_limit()),
        }
    }

    /// Advance the state machine for one car after it has moved.
    ///
    /// At most one transition happens per tick. Service (repair, tires, fuel) is
    /// applied exactly once, on the tick the timer completes.
    pub fn evaluate(
        &mut self,
        car: CarId,
        position: Vector2<f32>,
        speed: f32,
        dt: f64,
        resources: &mut ResourceManager,
        events: &mut Vec<RaceEvent>,
    ) {
        let in_lane = self.pit_lane.contains(position);
        let Some(slot) = self.sessions.get_mut(car.index()) else {
            return;
        };
        let from = slot.as_ref().map_or(PitPhase::OnTrack, |session| session.phase);

        match slot {
            None => {
                if in_lane {
                    *slot = Some(PitSession::new(self.config.service_duration));
                }
            }
            Some(session) => match session.phase {
                PitPhase::ApproachingPit | PitPhase::InPitLane if !in_lane => {
                    *slot = None;
                    info!(car = %car, "Pit stop aborted");
                    events.push(RaceEvent::PitAborted { car });
                }
                PitPhase::ApproachingPit => {
                    if speed <= self.config.entry_speed() {
                        session.phase = PitPhase::InPitLane;
                    }
                }
                PitPhase::InPitLane => {
                    if self.service_box.contains(position) {
                        session.phase = PitPhase::Servicing;
                        session.elapsed = 0.0;
                    }
                }
                PitPhase::Servicing => {
                    session.elapsed += dt;
                    if session.elapsed + SERVICE_EPSILON >= session.duration && !session.serviced {
                        service(&self.config, car, resources);
                        session.serviced = true;
                        session.phase = PitPhase::Released;
                        info!(car = %car, seconds = session.elapsed, "Pit service complete");
                        events.push(RaceEvent::PitStopCompleted { car, service_time: session.elapsed });
                    }
                }
                PitPhase::Released => {
                    if !in_lane {
                        *slot = None;
                    }
                }
                PitPhase::OnTrack => *slot = None,
            },
        }

        let to = slot.as_ref().map_or(PitPhase::OnTrack, |session| session.phase);
        if to != from {
            debug!(car = %car, from = from.label(), to = to.label(), "Pit phase changed");
            events.push(RaceEvent::PitPhaseChanged { car, from, to });
        }
    }

    pub(crate) fn reset(&mut self) {
        self.sessions.iter_mut().for_each(|session| *session = None);
    }
}

fn service(config: &PitConfig, car: CarId, resources: &mut ResourceManager) {
    if config.repair {
        resources.repair(car);
    }
    if config.change_tires {
        resources.change_tires(car);
    }
    let added = resources.state_mut(car).refuel(config.refuel_to);
    debug!(car = %car, fuel_added = added, "Refuelled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceConfig;
    use crate::types::ResourceState;

    const DT: f64 = 1.0 / 60.0;
    const CAR: CarId = CarId(0);

    fn controller() -> PitStopController {
        PitStopController::new(
            PitConfig::default(),
            Zone::new([-10.0, 100.0], [10.0, 400.0]),
            Zone::new([-10.0, 300.0], [10.0, 310.0]),
            1,
        )
    }

    fn resources() -> ResourceManager {
        let mut resources = ResourceManager::new(
            ResourceConfig::default(),
            vec![ResourceState::new(40.0, 35.0, 100.0, 25.0)],
        );
        resources.apply_damage(CAR, 30.0);
        resources
    }

    fn at(z: f32) -> Vector2<f32> {
        Vector2::new(0.0, z)
    }

    #[test]
    fn unknown_car_reads_as_on_track() {
        let mut pit = controller();
        let mut resources = resources();
        let mut events = Vec::new();
        pit.evaluate(CarId(3), at(120.0), 5.0, DT, &mut resources, &mut events);
        assert!(pit.session(CarId(3)).is_none());
        assert_eq!(pit.phase(CarId(3)), PitPhase::OnTrack);
        assert!(pit.override_for(CarId(3)).is_free());
        assert!(events.is_empty());
    }

    #[test]
    fn full_stop_cycle() {
        let mut pit = controller();
        let mut resources = resources();
        let mut events = Vec::new();
        let slow = PitConfig::default().speed_limit();

        pit.evaluate(CAR, at(50.0), 50.0, DT, &mut resources, &mut events);
        assert_eq!(pit.phase(CAR), PitPhase::OnTrack);
        assert!(pit.override_for(CAR).is_free());

        pit.evaluate(CAR, at(120.0), 50.0, DT, &mut resources, &mut events);
        assert_eq!(pit.phase(CAR), PitPhase::ApproachingPit);
        assert_eq!(pit.override_for(CAR).speed_cap(), Some(slow));

        // Still too fast
        pit.evaluate(CAR, at(150.0), 30.0, DT, &mut resources, &mut events);
        assert_eq!(pit.phase(CAR), PitPhase::ApproachingPit);

        pit.evaluate(CAR, at(180.0), slow, DT, &mut resources, &mut events);
        assert_eq!(pit.phase(CAR), PitPhase::InPitLane);

        pit.evaluate(CAR, at(305.0), slow, DT, &mut resources, &mut events);
        assert_eq!(pit.phase(CAR), PitPhase::Servicing);
        assert!(pit.override_for(CAR).is_hold());

        let mut ticks = 0;
        while pit.phase(CAR) == PitPhase::Servicing {
            assert_eq!(resources.state(CAR).unwrap().tire_wear, 35.0);
            pit.evaluate(CAR, at(306.0), 0.0, DT, &mut resources, &mut events);
            ticks += 1;
        }
        assert_eq!(ticks, 180);
        assert_eq!(pit.phase(CAR), PitPhase::Released);
        let state = resources.state(CAR).unwrap();
        assert_eq!(state.tire_wear, 100.0);
        assert_eq!(state.damage, 0.0);
        assert_eq!(state.fuel, 100.0);

        pit.evaluate(CAR, at(350.0), slow, DT, &mut resources, &mut events);
        assert_eq!(pit.phase(CAR), PitPhase::Released);
        pit.evaluate(CAR, at(410.0), slow, DT, &mut resources, &mut events);
        assert_eq!(pit.phase(CAR), PitPhase::OnTrack);
        assert!(pit.session(CAR).is_none());

        let completed = events
            .iter()
            .filter(|event| matches!(event, RaceEvent::PitStopCompleted { .. }))
            .count();
        assert_eq!(completed, 1);
        let transitions = events
            .iter()
            .filter(|event| matches!(event, RaceEvent::PitPhaseChanged { .. }))
            .count();
        assert_eq!(transitions, 5);
    }

    #[test]
    fn leaving_early_aborts_without_service() {
        let mut pit = controller();
        let mut resources = resources();
        let mut events = Vec::new();

        pit.evaluate(CAR, at(120.0), 10.0, DT, &mut resources, &mut events);
        pit.evaluate(CAR, at(130.0), 10.0, DT, &mut resources, &mut events);
        assert_eq!(pit.phase(CAR), PitPhase::InPitLane);

        // Swerve out of the lane before the box
        pit.evaluate(CAR, Vector2::new(20.0, 140.0), 10.0, DT, &mut resources, &mut events);
        assert_eq!(pit.phase(CAR), PitPhase::OnTrack);
        assert!(events.contains(&RaceEvent::PitAborted { car: CAR }));
        assert_eq!(resources.state(CAR).unwrap().tire_wear, 35.0);
        assert_eq!(resources.state(CAR).unwrap().damage, 30.0);
    }

    #[test]
    fn fast_car_never_reaches_service() {
        let mut pit = controller();
        let mut resources = resources();
        let mut events = Vec::new();

        for z in (110..400).step_by(10) {
            pit.evaluate(CAR, at(z as f32), 60.0, DT, &mut resources, &mut events);
            assert_eq!(pit.phase(CAR), PitPhase::ApproachingPit);
        }
        pit.evaluate(CAR, at(420.0), 60.0, DT, &mut resources, &mut events);
        assert_eq!(pit.phase(CAR), PitPhase::OnTrack);
        assert!(!events.iter().any(|event| matches!(event, RaceEvent::PitStopCompleted { .. })));
    }

    #[test]
    fn zero_duration_service_releases_next_tick() {
        let mut pit = PitStopController::new(
            PitConfig { service_duration: 0.0, ..PitConfig::default() },
            Zone::new([-10.0, 100.0], [10.0, 400.0]),
            Zone::new([-10.0, 300.0], [10.0, 310.0]),
            1,
        );
        let mut resources = resources();
        let mut events = Vec::new();
        for z in [120.0, 130.0, 305.0, 305.0] {
            pit.evaluate(CAR, at(z), 5.0, DT, &mut resources, &mut events);
        }
        assert_eq!(pit.phase(CAR), PitPhase::Released);
        assert_eq!(resources.state(CAR).unwrap().damage, 0.0);
    }
}
