//! Fuel, tires, energy recovery and damage for every car in the race.

use tracing::{debug, trace};

use super::DriveLoads;
use crate::config::ResourceConfig;
use crate::types::{CarId, Corner, PERCENT, ResourceGates, ResourceState};

/// Result of one tick of consumption.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Consumption {
    /// Tread lost this tick
    pub tire_wear_delta: f32,
    /// Boost was available before this tick and is not any more
    pub boost_exhausted: bool,
}

/// Owns one [`ResourceState`] per car and every rule that changes it.
#[derive(Debug, Clone)]
pub struct ResourceManager {
    config: ResourceConfig,
    states: Vec<ResourceState>,
    starts: Vec<ResourceState>,
}

impl ResourceManager {
    pub fn new(config: ResourceConfig, starts: Vec<ResourceState>) -> Self {
        Self { config, states: starts.clone(), starts }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn state(&self, car: CarId) -> Option<&ResourceState> {
        self.states.get(car.index())
    }

    pub(crate) fn state_mut(&mut self, car: CarId) -> &mut ResourceState {
        &mut self.states[car.index()]
    }

    pub fn states(&self) -> &[ResourceState] {
        &self.states
    }

    /// What the car may use this tick. `None` for a car not in the race.
    pub fn gates_for(&self, car: CarId) -> Option<ResourceGates> {
        let state = self.state(car)?;
        let cfg = &self.config;
        let worn = if state.tires_worn_out() { cfg.worn_steering_factor } else { 1.0 };
        let damage = state.damage / PERCENT;
        Some(ResourceGates {
            fuel_available: state.fuel > 0.0,
            boost_available: boost_available(cfg, state),
            steering_penalty: worn * (1.0 - damage * cfg.damage_steering_loss),
            power_factor: 1.0 - damage * cfg.damage_power_loss,
        })
    }

    /// Apply one tick of consumption for the loads the car drove with.
    pub fn consume(&mut self, car: CarId, dt: f32, loads: &DriveLoads) -> Consumption {
        let cfg = &self.config;
        let state = &mut self.states[car.index()];
        let boost_before = boost_available(cfg, state);

        state.fuel = (state.fuel - cfg.fuel_per_second * loads.throttle * dt).clamp(0.0, PERCENT);

        // Tires
        let wear_rate =
            cfg.tire_wear_lateral * loads.lateral_load + cfg.tire_wear_brake * loads.brake_load;
        let before = state.tire_wear;
        state.tire_wear = (state.tire_wear - wear_rate * dt).clamp(0.0, PERCENT);
        let tire_wear_delta = before - state.tire_wear;

        let relax = 1.0 - (-cfg.tire_cooling_rate * dt).exp();
        for corner in Corner::ALL {
            // Outside tires carry the cornering load, fronts carry the braking
            let side = match (loads.steer_side > 0.0, loads.steer_side < 0.0) {
                (true, _) if corner.is_left() => 1.5,
                (true, _) => 0.5,
                (_, true) if corner.is_left() => 0.5,
                (_, true) => 1.5,
                _ => 1.0,
            };
            let axle = if corner.is_front() { 1.0 + 0.5 * loads.brake_load } else { 1.0 };
            let temperature = &mut state.tire_temperature[corner as usize];
            *temperature += tire_wear_delta * cfg.tire_heat_per_wear * side * axle;
            *temperature += (cfg.ambient_temperature - *temperature) * relax;
        }

        // Energy
        if loads.boost > 0.0 && boost_before {
            let headroom = (cfg.max_boost_per_lap - state.boost_used_this_lap).max(0.0);
            let draw = (cfg.boost_drain_per_second * loads.boost * dt).min(state.energy_reserve);
            if draw >= headroom {
                state.energy_reserve -= headroom;
                state.boost_used_this_lap = cfg.max_boost_per_lap;
            } else {
                state.energy_reserve -= draw;
                state.boost_used_this_lap += draw;
            }
        }
        state.energy_reserve = (state.energy_reserve + cfg.regen_per_second * loads.brake_load * dt)
            .clamp(0.0, cfg.max_energy);
        state.boost_used_this_lap = state.boost_used_this_lap.clamp(0.0, cfg.max_boost_per_lap);

        if state.tires_worn_out() {
            state.damage = (state.damage + cfg.worn_tire_damage_per_second * dt).min(PERCENT);
        }

        let boost_exhausted = boost_before && !boost_available(cfg, state);
        if boost_exhausted {
            debug!(car = %car, used = state.boost_used_this_lap, "Boost exhausted");
        }
        trace!(car = %car, fuel = state.fuel, tire_wear = state.tire_wear, "Resources consumed");
        Consumption { tire_wear_delta, boost_exhausted }
    }

    /// New lap: the per-lap boost allowance refills.
    pub fn on_lap_start(&mut self, car: CarId) {
        self.states[car.index()].boost_used_this_lap = 0.0;
    }

    /// Pit crew repair. Called by the pit controller only.
    pub fn repair(&mut self, car: CarId) {
        self.states[car.index()].damage = 0.0;
    }

    /// Fresh set of tires. Called by the pit controller only.
    pub fn change_tires(&mut self, car: CarId) {
        let ambient = self.config.ambient_temperature;
        let state = &mut self.states[car.index()];
        state.tire_wear = PERCENT;
        state.tire_temperature = [ambient; 4];
    }

    /// Damage from a collision or race incident.
    pub fn apply_damage(&mut self, car: CarId, amount: f32) {
        let state = &mut self.states[car.index()];
        state.damage = (state.damage + amount.max(0.0)).clamp(0.0, PERCENT);
    }

    pub(crate) fn reset(&mut self) {
        self.states.clone_from(&self.starts);
    }
}

fn boost_available(cfg: &ResourceConfig, state: &ResourceState) -> bool {
    state.energy_reserve > 0.0 && state.boost_used_this_lap < cfg.max_boost_per_lap
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;
    const CAR: CarId = CarId(0);

    fn manager(state: ResourceState) -> ResourceManager {
        ResourceManager::new(ResourceConfig::default(), vec![state])
    }

    fn fresh() -> ResourceState {
        ResourceState::new(100.0, 100.0, 100.0, 25.0)
    }

    #[test]
    fn unknown_car_has_no_state() {
        let resources = manager(fresh());
        assert!(resources.state(CarId(2)).is_none());
        assert!(resources.gates_for(CarId(2)).is_none());
    }

    #[test]
    fn fuel_burns_with_throttle() {
        let mut resources = manager(fresh());
        let loads = DriveLoads { throttle: 1.0, ..Default::default() };
        for _ in 0..60 {
            resources.consume(CAR, DT, &loads);
        }
        assert_abs_diff_eq!(resources.state(CAR).unwrap().fuel, 99.5, epsilon = 1e-3);

        let idle = DriveLoads::default();
        resources.consume(CAR, DT, &idle);
        assert_abs_diff_eq!(resources.state(CAR).unwrap().fuel, 99.5, epsilon = 1e-3);
    }

    #[test]
    fn empty_tank_closes_fuel_gate() {
        let mut resources = manager(ResourceState::new(0.01, 100.0, 100.0, 25.0));
        let loads = DriveLoads { throttle: 1.0, ..Default::default() };
        resources.consume(CAR, 1.0, &loads);
        assert_eq!(resources.state(CAR).unwrap().fuel, 0.0);
        assert!(!resources.gates_for(CAR).unwrap().fuel_available);
    }

    #[test]
    fn boost_capped_per_lap_until_lap_start() {
        let mut resources = manager(fresh());
        let loads = DriveLoads { throttle: 1.0, boost: 1.0, ..Default::default() };
        let max = resources.config().max_boost_per_lap;

        let mut exhausted = 0;
        for _ in 0..600 {
            if resources.consume(CAR, DT, &loads).boost_exhausted {
                exhausted += 1;
            }
        }
        assert_eq!(exhausted, 1);
        assert_abs_diff_eq!(resources.state(CAR).unwrap().boost_used_this_lap, max, epsilon = 1e-4);
        assert_abs_diff_eq!(resources.state(CAR).unwrap().energy_reserve, 100.0 - max, epsilon = 1e-3);
        assert!(!resources.gates_for(CAR).unwrap().boost_available);

        resources.on_lap_start(CAR);
        assert_eq!(resources.state(CAR).unwrap().boost_used_this_lap, 0.0);
        assert!(resources.gates_for(CAR).unwrap().boost_available);
    }

    #[test]
    fn no_energy_no_boost() {
        let resources = manager(ResourceState::new(100.0, 100.0, 0.0, 25.0));
        assert!(!resources.gates_for(CAR).unwrap().boost_available);
    }

    #[test]
    fn braking_recovers_energy_and_wears_tires() {
        let mut resources = manager(ResourceState::new(100.0, 100.0, 50.0, 25.0));
        let loads = DriveLoads { brake_load: 1.0, ..Default::default() };
        let used = resources.consume(CAR, 1.0, &loads);
        let state = resources.state(CAR).unwrap();
        assert_abs_diff_eq!(state.energy_reserve, 60.0, epsilon = 1e-4);
        assert_abs_diff_eq!(used.tire_wear_delta, 0.2, epsilon = 1e-5);
        assert!(state.temperature(Corner::FrontLeft) > state.temperature(Corner::RearLeft));
    }

    #[test]
    fn cornering_heats_outside_tires() {
        let mut resources = manager(fresh());
        let loads = DriveLoads { lateral_load: 30.0, steer_side: 1.0, ..Default::default() };
        for _ in 0..120 {
            resources.consume(CAR, DT, &loads);
        }
        let state = resources.state(CAR).unwrap();
        assert!(state.temperature(Corner::FrontLeft) > state.temperature(Corner::FrontRight));
        assert!(state.average_tire_temperature() > 25.0);
        assert!(state.tire_wear < 100.0);
    }

    #[test]
    fn worn_tires_cost_steering_and_accrue_damage() {
        let mut resources = manager(ResourceState::new(100.0, 0.0, 100.0, 25.0));
        assert_abs_diff_eq!(resources.gates_for(CAR).unwrap().steering_penalty, 0.5);
        resources.consume(CAR, 1.0, &DriveLoads::default());
        assert_abs_diff_eq!(resources.state(CAR).unwrap().damage, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn damage_reduces_power_and_saturates() {
        let mut resources = manager(fresh());
        resources.apply_damage(CAR, 50.0);
        assert_abs_diff_eq!(resources.gates_for(CAR).unwrap().power_factor, 0.85, epsilon = 1e-6);
        resources.apply_damage(CAR, 500.0);
        assert_eq!(resources.state(CAR).unwrap().damage, 100.0);
        resources.apply_damage(CAR, -20.0);
        assert_eq!(resources.state(CAR).unwrap().damage, 100.0);
    }

    #[test]
    fn pit_service_restores_tires_and_damage() {
        let mut resources = manager(ResourceState::new(30.0, 20.0, 100.0, 25.0));
        resources.apply_damage(CAR, 40.0);
        resources.repair(CAR);
        resources.change_tires(CAR);
        let state = resources.state(CAR).unwrap();
        assert_eq!(state.damage, 0.0);
        assert_eq!(state.tire_wear, 100.0);
        assert_eq!(state.tire_temperature, [25.0; 4]);
        assert_eq!(state.fuel, 30.0);
    }

    #[test]
    fn reset_restores_starting_state() {
        let mut resources = manager(fresh());
        resources.apply_damage(CAR, 10.0);
        resources.consume(CAR, 1.0, &DriveLoads { throttle: 1.0, ..Default::default() });
        resources.reset();
        assert_eq!(resources.state(CAR), Some(&fresh()));
    }

    proptest! {
        #[test]
        fn quantities_stay_in_range(
            steps in prop::collection::vec(
                (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..80.0, 0.0f32..=1.0, -1i8..=1),
                1..200,
            ),
            lap_every in 1usize..120,
        ) {
            let mut resources = manager(ResourceState::new(5.0, 10.0, 20.0, 25.0));
            let cfg = resources.config().clone();
            for (i, (throttle, boost, lateral, brake, side)) in steps.into_iter().enumerate() {
                let loads = DriveLoads {
                    throttle,
                    boost,
                    lateral_load: lateral,
                    brake_load: brake,
                    steer_side: side as f32,
                };
                resources.consume(CAR, 0.1, &loads);
                if i % lap_every == 0 {
                    resources.on_lap_start(CAR);
                }
                let state = resources.state(CAR).unwrap();
                prop_assert!((0.0..=100.0).contains(&state.fuel));
                prop_assert!((0.0..=100.0).contains(&state.tire_wear));
                prop_assert!((0.0..=100.0).contains(&state.damage));
                prop_assert!((0.0..=cfg.max_energy).contains(&state.energy_reserve));
                prop_assert!((0.0..=cfg.max_boost_per_lap).contains(&state.boost_used_this_lap));
            }
        }

        #[test]
        fn tire_wear_and_damage_monotonic_without_pit(
            loads in prop::collection::vec((0.0f32..80.0, 0.0f32..=1.0), 1..100),
        ) {
            let mut resources = manager(ResourceState::new(100.0, 3.0, 100.0, 25.0));
            let mut wear = resources.state(CAR).unwrap().tire_wear;
            let mut damage = resources.state(CAR).unwrap().damage;
            for (lateral, brake) in loads {
                let loads = DriveLoads { lateral_load: lateral, brake_load: brake, ..Default::default() };
                resources.consume(CAR, 0.1, &loads);
                let state = resources.state(CAR).unwrap();
                prop_assert!(state.tire_wear <= wear);
                prop_assert!(state.damage >= damage);
                wear = state.tire_wear;
                damage = state.damage;
            }
        }
    }
}
