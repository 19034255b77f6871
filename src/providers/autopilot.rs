//! Computer driver that chases the next checkpoint

use std::sync::Arc;

use nalgebra::Vector2;

use crate::config::TrackConfig;
use crate::provider::InputSource;
use crate::types::{CarSnapshot, InputCommand, geometry};

/// Simple AI driver.
///
/// Steers proportionally toward the midpoint of the next gate, lifts through
/// tight corrections and brakes when the target is well off the nose at speed.
/// It does not plan pit stops.
#[derive(Debug, Clone)]
pub struct Autopilot {
    track: Arc<TrackConfig>,
    /// Steering per radian of heading error
    pub steer_gain: f32,
    /// Heading error (rad) above which the car brakes
    pub brake_angle: f32,
    /// Speed (km/h) below which it never brakes
    pub corner_speed_kmh: f32,
    /// Use ERS whenever the car is pointed at its target
    pub use_boost: bool,
}

impl Autopilot {
    pub fn new(track: Arc<TrackConfig>) -> Self {
        Self { track, steer_gain: 2.0, brake_angle: 0.6, corner_speed_kmh: 90.0, use_boost: false }
    }

    pub fn with_boost(mut self, use_boost: bool) -> Self {
        self.use_boost = use_boost;
        self
    }

    /// Signed heading error to the next target, positive to the right.
    pub fn heading_error(&self, car: &CarSnapshot) -> f32 {
        let target = self.track.target(car.next_checkpoint).midpoint();
        let position = Vector2::new(car.position[0], car.position[2]);
        let to_target = target - position;
        if to_target.norm_squared() <= f32::EPSILON {
            return 0.0;
        }
        let forward = geometry::heading(car.yaw);
        let right = Vector2::new(forward.y, -forward.x);
        to_target.dot(&right).atan2(to_target.dot(&forward))
    }
}

impl InputSource for Autopilot {
    fn command(&mut self, car: &CarSnapshot) -> InputCommand {
        if car.finished {
            return InputCommand::full_brake();
        }
        let error = self.heading_error(car);
        let steer = (error * self.steer_gain).clamp(-1.0, 1.0);

        let braking = error.abs() > self.brake_angle && car.speed_kmh > self.corner_speed_kmh;
        if braking {
            return InputCommand::full_brake().with_steer(steer);
        }
        let throttle = 1.0 - 0.6 * steer.abs();
        let straight = error.abs() < 0.1;
        InputCommand {
            throttle,
            steer,
            drs_request: straight,
            ers_request: self.use_boost && straight,
            ..InputCommand::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RaceSimulation;
    use crate::test_utils::{circuit_race, drag_strip_race};
    use crate::types::CarId;

    fn first_car(config: crate::RaceConfig) -> (Arc<TrackConfig>, CarSnapshot) {
        let track = Arc::new(config.track.clone());
        let simulation = RaceSimulation::new(config).unwrap();
        let car = simulation.snapshot().cars[0].clone();
        (track, car)
    }

    #[test]
    fn full_throttle_when_target_dead_ahead() {
        let (track, mut car) = first_car(drag_strip_race(1));
        // Line up on the checkpoint midpoint
        car.position = [0.0, 0.0, -5.0];
        let mut autopilot = Autopilot::new(track);
        let input = autopilot.command(&car);
        assert_eq!(input.steer, 0.0);
        assert_eq!(input.throttle, 1.0);
        assert!(input.drs_request);
        assert!(!input.ers_request);
    }

    #[test]
    fn steers_toward_offset_target() {
        let (track, mut car) = first_car(drag_strip_race(1));
        // Target at x = 0 is to the right of a car at x = -15 facing +z
        car.position = [-15.0, 0.0, 550.0];
        let mut autopilot = Autopilot::new(track.clone());
        assert!(autopilot.heading_error(&car) > 0.0);
        assert!(autopilot.command(&car).steer > 0.0);

        car.position = [15.0, 0.0, 550.0];
        assert!(autopilot.command(&car).steer < 0.0);
    }

    #[test]
    fn brakes_for_sharp_turn_at_speed() {
        let (track, mut car) = first_car(drag_strip_race(1));
        // Checkpoint behind the car
        car.position = [0.0, 0.0, 700.0];
        car.speed_kmh = 200.0;
        let mut autopilot = Autopilot::new(track);
        let input = autopilot.command(&car);
        assert_eq!(input.brake, 1.0);
        assert_eq!(input.throttle, 0.0);

        car.speed_kmh = 40.0;
        assert_eq!(autopilot.command(&car).brake, 0.0);
    }

    #[test]
    fn drives_the_circuit_grid_forward() {
        let config = circuit_race(1, 1);
        let track = Arc::new(config.track.clone());
        let mut simulation = RaceSimulation::new(config).unwrap();
        let mut autopilot = Autopilot::new(track).with_boost(true);

        for _ in 0..120 {
            let car = simulation.snapshot().cars[0].clone();
            let input = autopilot.command(&car);
            simulation.step(&[input]);
        }
        let car = simulation.snapshot().car(CarId(0)).cloned().unwrap();
        assert!(car.position[2] > 0.0);
        assert!(car.speed_kmh > 50.0);
    }
}
