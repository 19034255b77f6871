//! Kinematic vehicle state

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::Gear;
use super::geometry::{heading, plane};

/// Metres per second to kilometres per hour.
pub const MPS_TO_KMH: f32 = 3.6;

/// Everything the dynamics model integrates for one car.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// World position; y stays 0 on the flat track plane
    pub position: Vector3<f32>,
    /// Heading in radians (0 faces +z)
    pub yaw: f32,
    /// World-space linear velocity (m/s)
    pub velocity: Vector3<f32>,
    /// Yaw rate (rad/s), positive turns right
    pub yaw_rate: f32,
    /// Front wheel angle (rad), positive is right
    pub steering_angle: f32,
    pub gear: Gear,
    pub rpm: f32,
    /// Derived from |velocity|, never negative
    pub speed_kmh: f32,
    /// Drag reduction engaged this tick
    pub drs_active: bool,
}

/// One car's kinematic state plus the race-start values it resets to.
///
/// Mutated only by [`VehicleDynamics`](crate::sim::VehicleDynamics); everything
/// else reads it through the accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub(crate) state: Kinematics,
    start: Kinematics,
}

impl Vehicle {
    pub(crate) fn new(start: Kinematics) -> Self {
        Self { state: start, start }
    }

    /// Restore every field to its race-start value.
    pub fn reset(&mut self) {
        self.state = self.start;
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.state
    }

    pub fn position(&self) -> Vector3<f32> {
        self.state.position
    }

    pub fn plane_position(&self) -> Vector2<f32> {
        plane(&self.state.position)
    }

    pub fn yaw(&self) -> f32 {
        self.state.yaw
    }

    pub fn velocity(&self) -> Vector3<f32> {
        self.state.velocity
    }

    pub fn yaw_rate(&self) -> f32 {
        self.state.yaw_rate
    }

    pub fn steering_angle(&self) -> f32 {
        self.state.steering_angle
    }

    pub fn gear(&self) -> Gear {
        self.state.gear
    }

    pub fn rpm(&self) -> f32 {
        self.state.rpm
    }

    pub fn speed_kmh(&self) -> f32 {
        self.state.speed_kmh
    }

    /// Speed in m/s.
    pub fn speed(&self) -> f32 {
        self.state.velocity.norm()
    }

    /// Signed speed along the car's heading (m/s); negative when reversing.
    pub fn forward_speed(&self) -> f32 {
        plane(&self.state.velocity).dot(&heading(self.state.yaw))
    }

    pub fn drs_active(&self) -> bool {
        self.state.drs_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rolling(speed: f32, yaw: f32) -> Kinematics {
        let dir = heading(yaw);
        Kinematics {
            position: Vector3::new(1.0, 0.0, 2.0),
            yaw,
            velocity: Vector3::new(dir.x * speed, 0.0, dir.y * speed),
            yaw_rate: 0.0,
            steering_angle: 0.0,
            gear: Gear::Forward(1),
            rpm: 4_000.0,
            speed_kmh: speed * MPS_TO_KMH,
            drs_active: false,
        }
    }

    #[test]
    fn forward_speed_is_signed_along_heading() {
        let vehicle = Vehicle::new(rolling(10.0, 0.3));
        assert!((vehicle.forward_speed() - 10.0).abs() < 1e-4);
        assert!((vehicle.speed() - 10.0).abs() < 1e-4);

        let mut reversed = rolling(10.0, 0.3);
        reversed.velocity = -reversed.velocity;
        let vehicle = Vehicle::new(reversed);
        assert!((vehicle.forward_speed() + 10.0).abs() < 1e-4);
    }

    #[test]
    fn reset_restores_start_state() {
        let mut vehicle = Vehicle::new(rolling(5.0, 0.0));
        vehicle.state.position.z += 40.0;
        vehicle.state.gear = Gear::Forward(4);
        vehicle.reset();
        assert_eq!(vehicle.position(), Vector3::new(1.0, 0.0, 2.0));
        assert_eq!(vehicle.gear(), Gear::Forward(1));
    }
}
