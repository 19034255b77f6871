//! Core value types shared by the simulation, its consumers and its collaborators.
//!
//! ## Architecture
//!
//! - [`InputCommand`] is the normalized per-tick driver intent, clamped at the boundary
//! - [`Vehicle`] holds kinematic state that only the dynamics model mutates
//! - [`ResourceState`] tracks fuel, tires, energy and damage for one car
//! - [`PitPhase`] and [`PitOverride`] describe the pit-lane state machine and the
//!   longitudinal constraint it imposes
//! - [`LapRecord`] keeps append-only lap times with an incremental best lap
//! - [`RaceSnapshot`] is the immutable end-of-tick view published to render, HUD and audio
//!
//! ## Usage Example
//!
//! ```rust
//! use slipstream::types::{Gear, Gearbox, InputCommand};
//!
//! let input = InputCommand { throttle: 1.7, steer: f32::NAN, ..Default::default() }.clamped();
//! assert_eq!(input.throttle, 1.0);
//! assert_eq!(input.steer, 0.0);
//!
//! let gearbox = Gearbox::default();
//! assert_eq!(gearbox.select(0.5, 40.0), Gear::Forward(4));
//! ```

mod gear;
pub mod geometry;
mod input;
mod lap;
mod pit;
mod race;
mod resources;
mod snapshot;
mod vehicle;

pub use gear::{Gear, Gearbox};
pub use geometry::{Gate, Zone};
pub use input::{InputCommand, STEER_EPSILON};
pub use lap::{BestLap, LapRecord};
pub use pit::{PitOverride, PitPhase};
pub use race::{CarId, RaceEvent, RacePhase};
pub use resources::{Corner, PERCENT, ResourceGates, ResourceState};
pub use snapshot::{CarSnapshot, FrameRate, RaceSnapshot};
pub use vehicle::{Kinematics, MPS_TO_KMH, Vehicle};

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn clamped_input_stays_in_range(
            throttle in any::<f32>(),
            brake in any::<f32>(),
            steer in any::<f32>(),
        ) {
            let input = InputCommand { throttle, brake, steer, ..Default::default() }.clamped();
            prop_assert!((0.0..=1.0).contains(&input.throttle));
            prop_assert!((0.0..=1.0).contains(&input.brake));
            prop_assert!((-1.0..=1.0).contains(&input.steer));
        }

        #[test]
        fn gear_rpm_within_band(ratio in 0.0f32..1.5, forward in -50.0f32..100.0) {
            let gearbox = Gearbox::default();
            let gear = gearbox.select(ratio, forward);
            let rpm = gearbox.rpm(gear, ratio);
            prop_assert!(rpm >= gearbox.idle_rpm && rpm <= gearbox.redline_rpm);
        }
    }

    #[test]
    fn snapshot_events_filter_by_car() {
        let snapshot = RaceSnapshot {
            tick: 3,
            time: 0.05,
            phase: RacePhase::Green,
            total_laps: 3,
            cars: Vec::new(),
            events: vec![
                RaceEvent::PhaseChanged { phase: RacePhase::Green },
                RaceEvent::PitAborted { car: CarId(1) },
                RaceEvent::BoostExhausted { car: CarId(0) },
            ],
        };
        let events: Vec<_> = snapshot.events_for(CarId(1)).collect();
        assert_eq!(events, vec![&RaceEvent::PitAborted { car: CarId(1) }]);
        assert!(snapshot.leader().is_none());
    }

    #[test]
    fn pit_override_accessors() {
        assert_eq!(PitOverride::SpeedCap(22.0).speed_cap(), Some(22.0));
        assert!(PitOverride::Hold.is_hold());
        assert!(PitOverride::default().is_free());
        assert!(!PitPhase::OnTrack.in_pit());
        assert!(PitPhase::Released.in_pit());
    }
}
