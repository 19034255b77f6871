//! Per-tick vehicle integration.
//!
//! The model is a single body on a flat plane. Velocity is split into a
//! longitudinal part (engine, brakes, drag) and a lateral part that tire grip
//! bleeds away; yaw comes from a steering torque proportional to forward speed.
//! After integration speed, gear and RPM are re-derived from the new velocity.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{GridSlot, PitConfig, VehicleConfig};
use crate::types::geometry::{heading, plane, wrap_angle};
use crate::types::{
    Gear, InputCommand, Kinematics, MPS_TO_KMH, PitOverride, ResourceGates, STEER_EPSILON, Vehicle,
};

/// Per-frame decay of an unattended steering angle, referenced to 60 Hz.
const STEER_DECAY: f32 = 0.9;

/// What the car asked of its consumables this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveLoads {
    /// Throttle applied with the engine running, 0..=1
    pub throttle: f32,
    /// Throttle fraction backed by ERS boost, 0..=1
    pub boost: f32,
    /// Lateral acceleration carried by the tires (m/s^2)
    pub lateral_load: f32,
    /// Brake pedal used for deceleration (not reverse), 0..=1
    pub brake_load: f32,
    /// -1 steering left, 1 steering right, 0 straight
    pub steer_side: f32,
}

/// An instantaneous correction from a wall, another car or a race incident.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    /// Position correction on the track plane
    pub correction: Vector2<f32>,
    /// Unit direction that is blocked; velocity into it is removed
    pub normal: Option<Vector2<f32>>,
    /// Multiplier applied to the remaining speed, 0..=1
    pub speed_scale: f32,
}

impl Impact {
    /// Pure speed loss, no movement.
    pub fn slowdown(penalty: f32) -> Self {
        Self { correction: Vector2::zeros(), normal: None, speed_scale: 1.0 - penalty.clamp(0.0, 1.0) }
    }
}

/// The vehicle model. Holds constants only; every [`Vehicle`] it updates carries its
/// own state.
#[derive(Debug, Clone)]
pub struct VehicleDynamics {
    config: VehicleConfig,
    max_speed: f32,
    limiter_deceleration: f32,
    hold_deceleration: f32,
}

impl VehicleDynamics {
    pub fn new(config: VehicleConfig, pit: &PitConfig) -> Self {
        Self {
            max_speed: config.max_speed(),
            config,
            limiter_deceleration: pit.limiter_deceleration,
            hold_deceleration: pit.hold_deceleration,
        }
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// Build a car sitting in its grid slot; rolling starts get velocity along the slot yaw.
    pub fn spawn(&self, slot: &GridSlot) -> Vehicle {
        let yaw = wrap_angle(slot.yaw);
        let velocity = heading(yaw) * (slot.speed_kmh / MPS_TO_KMH);
        let mut start = Kinematics {
            position: Vector3::new(slot.position[0], 0.0, slot.position[1]),
            yaw,
            velocity: Vector3::new(velocity.x, 0.0, velocity.y),
            yaw_rate: 0.0,
            steering_angle: 0.0,
            gear: Gear::Neutral,
            rpm: self.config.gearbox.idle_rpm,
            speed_kmh: 0.0,
            drs_active: false,
        };
        self.refresh_derived(&mut start);
        Vehicle::new(start)
    }

    /// Integrate one tick and report the loads applied.
    pub fn update(
        &self,
        vehicle: &mut Vehicle,
        input: &InputCommand,
        gates: &ResourceGates,
        pit: PitOverride,
        in_drs_zone: bool,
        dt: f32,
    ) -> DriveLoads {
        let cfg = &self.config;
        let input = input.clamped();
        let mut loads = DriveLoads::default();
        if dt <= 0.0 {
            return loads;
        }
        let state = &mut vehicle.state;

        // Steering
        if input.is_steering() {
            let target = input.steer * cfg.max_steering_angle;
            let step = cfg.steering_speed * gates.steering_penalty * dt;
            state.steering_angle = approach(state.steering_angle, target, step);
        } else {
            state.steering_angle *= STEER_DECAY.powf(dt * 60.0);
        }

        let forward = heading(state.yaw);
        let right = Vector2::new(forward.y, -forward.x);
        let velocity = plane(&state.velocity);
        let mut v_long = velocity.dot(&forward);
        let mut v_lat = velocity.dot(&right);
        let speed = velocity.norm();

        let braking = input.brake > 0.0;
        let drs_active = input.drs_request
            && !braking
            && in_drs_zone
            && v_long > cfg.drs_min_speed
            && pit.is_free();

        if pit.is_hold() {
            v_long = approach(v_long, 0.0, self.hold_deceleration * dt);
        } else {
            let cap = pit.speed_cap();
            let mut drive = 0.0;
            let mut resist = 0.0;

            if gates.fuel_available {
                loads.throttle = input.throttle;
            }
            let engine_allowed = gates.fuel_available
                && v_long < self.max_speed
                && cap.is_none_or(|cap| v_long < cap);
            if input.throttle > 0.0 && engine_allowed {
                drive += cfg.engine_force * input.throttle * gates.power_factor;
                if input.ers_request && gates.boost_available {
                    drive += cfg.boost_force * input.throttle * gates.power_factor;
                    loads.boost = input.throttle;
                }
            }

            if braking {
                if v_long > cfg.brake_speed_threshold {
                    resist += cfg.brake_coefficient * input.brake * v_long * cfg.mass;
                    loads.brake_load = input.brake;
                } else if v_long > -cfg.max_reverse_speed {
                    drive -= cfg.reverse_force * input.brake;
                }
            }

            let drag_factor = if drs_active { 1.0 - cfg.drs_drag_reduction } else { 1.0 };
            resist += cfg.drag_coefficient * drag_factor * v_long * v_long
                + cfg.rolling_resistance * v_long.abs();

            v_long += drive / cfg.mass * dt;
            // Resistive forces bring the car to rest but never reverse it
            v_long = approach(v_long, 0.0, resist / cfg.mass * dt);

            if drive > 0.0 {
                v_long = v_long.min(self.max_speed);
            } else if drive < 0.0 {
                v_long = v_long.max(-cfg.max_reverse_speed);
            }
            if let Some(cap) = cap
                && v_long > cap
            {
                v_long = (v_long - self.limiter_deceleration * dt).max(cap);
            }
        }

        // Lateral grip, stronger with downforce
        let speed_ratio = (speed / self.max_speed).min(1.0);
        let grip = cfg.base_grip * (1.0 + cfg.downforce * speed_ratio);
        let absorbed = v_lat * (1.0 - (-grip * dt).exp());
        v_lat -= absorbed;

        // Yaw
        let yaw_accel = if v_long.abs() > cfg.min_steering_speed {
            cfg.steering_torque * state.steering_angle * v_long
        } else {
            0.0
        };
        state.yaw_rate += (yaw_accel - cfg.angular_damping * state.yaw_rate) * dt;
        state.yaw = wrap_angle(state.yaw + state.yaw_rate * dt);

        let forward = heading(state.yaw);
        let right = Vector2::new(forward.y, -forward.x);
        let velocity = forward * v_long + right * v_lat;
        state.velocity = Vector3::new(velocity.x, 0.0, velocity.y);
        state.position += state.velocity * dt;
        state.position.y = 0.0;
        state.drs_active = drs_active;

        loads.lateral_load = (state.yaw_rate * v_long).abs() + absorbed.abs() / dt;
        loads.steer_side = if state.steering_angle.abs() > STEER_EPSILON {
            state.steering_angle.signum()
        } else {
            0.0
        };

        self.refresh_derived(state);
        trace!(
            speed_kmh = state.speed_kmh,
            gear = %state.gear,
            rpm = state.rpm,
            "Vehicle integrated"
        );
        loads
    }

    /// Apply a collision or incident correction.
    ///
    /// This is the only path by which contacts move a car.
    pub fn apply_impact(&self, vehicle: &mut Vehicle, impact: &Impact) {
        let state = &mut vehicle.state;
        state.position.x += impact.correction.x;
        state.position.z += impact.correction.y;

        let mut velocity = plane(&state.velocity);
        if let Some(normal) = impact.normal {
            let into = velocity.dot(&normal);
            if into > 0.0 {
                velocity -= normal * into;
            }
        }
        let scale = impact.speed_scale.clamp(0.0, 1.0);
        velocity *= scale;
        state.velocity = Vector3::new(velocity.x, 0.0, velocity.y);
        state.yaw_rate *= scale;
        self.refresh_derived(state);
    }

    fn refresh_derived(&self, state: &mut Kinematics) {
        let velocity = plane(&state.velocity);
        let speed = velocity.norm();
        let ratio = speed / self.max_speed;
        state.speed_kmh = speed * MPS_TO_KMH;
        state.gear = self.config.gearbox.select(ratio, velocity.dot(&heading(state.yaw)));
        state.rpm = self.config.gearbox.rpm(state.gear, ratio);
    }
}

/// Move `value` toward `target` by at most `step`.
fn approach(value: f32, target: f32, step: f32) -> f32 {
    if value > target { (value - step).max(target) } else { (value + step).min(target) }
}
