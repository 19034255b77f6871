//! End-to-end race scenarios driven through the public API

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use slipstream::config::{EntrantConfig, GridSlot, TrackConfig};
use slipstream::sim::{ProgressEvent, RaceProgressTracker};
use slipstream::types::{CarId, Gear, InputCommand, PitPhase, RaceEvent, RacePhase, RaceSnapshot};
use slipstream::{RaceConfig, RaceSimulation};

fn drag_strip(entrants: Vec<EntrantConfig>) -> RaceConfig {
    RaceConfig { total_laps: 1, track: TrackConfig::drag_strip(), entrants, ..RaceConfig::default() }
}

fn run(simulation: &mut RaceSimulation, input: InputCommand, ticks: usize) -> Vec<Arc<RaceSnapshot>> {
    (0..ticks).map(|_| simulation.step(&[input])).collect()
}

#[test]
fn standing_start_full_throttle_for_one_second() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut simulation = RaceSimulation::new(drag_strip(vec![EntrantConfig::named("Ada")])).unwrap();
    let grid = simulation.snapshot();
    assert_eq!(grid.cars[0].gear, Gear::Neutral);
    assert_eq!(grid.cars[0].speed_kmh, 0.0);

    let snapshots = run(&mut simulation, InputCommand::full_throttle(), 60);

    // Speed rises every tick
    let mut previous = 0.0;
    for snapshot in &snapshots {
        assert!(snapshot.cars[0].speed_kmh > previous);
        previous = snapshot.cars[0].speed_kmh;
    }

    // Neutral, then first gear, then upward without ever shifting down
    let gears: Vec<i8> = snapshots.iter().map(|snapshot| snapshot.cars[0].gear.number()).collect();
    assert_eq!(gears[0], 1);
    assert!(gears.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(*gears.last().unwrap() >= 2);

    let fuel_rate = simulation.config().resources.fuel_per_second;
    assert_abs_diff_eq!(snapshots[59].cars[0].fuel, 100.0 - fuel_rate, epsilon = 1e-3);
    assert_abs_diff_eq!(snapshots[59].time, 1.0, epsilon = 1e-9);
}

#[test]
fn pit_entry_at_speed_is_slowed_then_serviced() {
    let _ = tracing_subscriber::fmt::try_init();
    let entrant = EntrantConfig { starting_tire_wear: 60.0, ..EntrantConfig::named("Ada") };
    let mut config = drag_strip(vec![entrant]);
    config.track.grid[0] = GridSlot { position: [0.0, 40.0], yaw: 0.0, speed_kmh: 200.0 };
    let mut simulation = RaceSimulation::new(config).unwrap();
    let cap_kmh = simulation.config().pit.entry_speed() * 3.6;
    let service_ticks =
        (simulation.config().pit.service_duration * simulation.config().tick_rate_hz).round();

    simulation.queue_incident(CarId(0), 25.0, 0.0).unwrap();
    let snapshots = run(&mut simulation, InputCommand::full_throttle(), 60 * 30);
    let phase = |i: usize| snapshots[i].cars[0].pit;

    let entered = (0..snapshots.len()).find(|&i| phase(i) == PitPhase::ApproachingPit).unwrap();
    assert!(snapshots[entered].cars[0].speed_kmh > cap_kmh);
    assert!(snapshots[entered].cars[0].damage > 0.0);

    let servicing = (0..snapshots.len()).find(|&i| phase(i) == PitPhase::Servicing).unwrap();
    assert!(servicing > entered);
    for snapshot in &snapshots[entered..servicing] {
        if snapshot.cars[0].pit == PitPhase::InPitLane {
            assert!(snapshot.cars[0].speed_kmh <= cap_kmh + 0.01);
        }
    }
    assert!(snapshots[servicing - 1].cars[0].speed_kmh <= cap_kmh + 0.01);

    let released = (servicing..snapshots.len()).find(|&i| phase(i) == PitPhase::Released).unwrap();
    assert_eq!((released - servicing) as f64, service_ticks);
    for snapshot in &snapshots[servicing..released] {
        // Nothing is serviced before the timer runs out
        assert!(snapshot.cars[0].tire_wear < 100.0);
    }

    let car = &snapshots[released].cars[0];
    assert_eq!(car.tire_wear, 100.0);
    assert_eq!(car.damage, 0.0);
    assert_eq!(car.fuel, 100.0);

    let completed = snapshots
        .iter()
        .flat_map(|snapshot| snapshot.events.iter())
        .filter(|event| matches!(event, RaceEvent::PitStopCompleted { .. }))
        .count();
    assert_eq!(completed, 1);

    // Out of the lane and back on track
    assert!(snapshots[released..].iter().any(|snapshot| snapshot.cars[0].pit == PitPhase::OnTrack));
}

#[test]
fn reversing_through_the_finish_does_not_complete_a_lap() {
    let track = TrackConfig::default();
    assert_eq!(track.checkpoints.len(), 5);
    let mut tracker =
        RaceProgressTracker::new(track.checkpoints.clone(), track.start_finish, 3, 1);
    let car = CarId(0);
    let step = |tracker: &mut RaceProgressTracker, from: [f32; 2], to: [f32; 2]| {
        tracker.on_tick(car, from.into(), to.into(), 1.0 / 60.0)
    };

    assert_eq!(
        step(&mut tracker, [0.0, 240.0], [0.0, 260.0]),
        Some(ProgressEvent::CheckpointPassed { index: 0 })
    );
    assert_eq!(
        step(&mut tracker, [90.0, 500.0], [110.0, 500.0]),
        Some(ProgressEvent::CheckpointPassed { index: 1 })
    );

    // Backwards over the line, then forwards over it again out of sequence
    assert_eq!(step(&mut tracker, [0.0, 5.0], [0.0, -5.0]), None);
    assert_eq!(step(&mut tracker, [0.0, -5.0], [0.0, 5.0]), None);

    let progress = tracker.progress(car).unwrap();
    assert_eq!(progress.lap, 1);
    assert_eq!(progress.cursor, 2);
    assert!(progress.record.completed().is_empty());
}

#[test]
fn reversing_car_in_simulation_never_laps() {
    let mut config = RaceConfig { total_laps: 1, ..RaceConfig::default() };
    // Just past the line, facing forward
    config.track.grid[0] = GridSlot::standing(0.0, 10.0);
    let mut simulation = RaceSimulation::new(config).unwrap();

    let snapshots = run(&mut simulation, InputCommand::full_brake(), 60 * 4);
    assert!(snapshots.last().unwrap().cars[0].position[2] < 0.0);
    assert_eq!(snapshots.last().unwrap().cars[0].gear, Gear::Reverse);
    assert!(snapshots.iter().flat_map(|snapshot| snapshot.events.iter()).all(|event| !matches!(
        event,
        RaceEvent::LapCompleted { .. } | RaceEvent::RaceFinished { .. }
    )));
    assert_eq!(simulation.phase(), RacePhase::Green);
}

#[test]
fn empty_energy_store_gives_no_boost() {
    let flat = EntrantConfig { starting_energy: Some(0.0), ..EntrantConfig::named("Flat") };
    let mut boosted = RaceSimulation::new(drag_strip(vec![flat.clone()])).unwrap();
    let mut plain = RaceSimulation::new(drag_strip(vec![flat])).unwrap();

    let with_ers = run(&mut boosted, InputCommand::full_throttle().with_ers(true), 90);
    let without = run(&mut plain, InputCommand::full_throttle(), 90);
    for (a, b) in with_ers.iter().zip(&without) {
        assert_eq!(a.cars[0].speed_kmh, b.cars[0].speed_kmh);
        assert_eq!(a.cars[0].energy_reserve, 0.0);
        assert!(!a.cars[0].boost_available);
    }

    // A charged store does make a difference
    let mut charged = RaceSimulation::new(drag_strip(vec![EntrantConfig::named("Full")])).unwrap();
    let charged = run(&mut charged, InputCommand::full_throttle().with_ers(true), 90);
    assert!(charged[89].cars[0].speed_kmh > without[89].cars[0].speed_kmh);
}

#[test]
fn sprint_produces_a_classification() {
    let entrants = vec![EntrantConfig::named("Ada"), EntrantConfig::named("Grace")];
    let config = RaceConfig {
        total_laps: 1,
        finish_grace_seconds: 2.0,
        track: TrackConfig::sprint(),
        entrants,
        ..RaceConfig::default()
    };
    let mut simulation = RaceSimulation::new(config).unwrap();

    let inputs = [InputCommand::full_throttle(), InputCommand::default()];
    let mut ticks = 0;
    while !simulation.phase().is_finished() {
        simulation.step(&inputs);
        ticks += 1;
        assert!(ticks < 60 * 60, "race never finished");
    }

    let result = simulation.result();
    assert!(result.complete);
    let winner = result.winner().unwrap();
    assert_eq!(winner.name, "Ada");
    assert!(winner.finished);
    assert_eq!(winner.lap_times.len(), 1);
    let second = result.entry(CarId(1)).unwrap();
    assert_eq!(second.position, 2);
    assert!(!second.finished);
    assert_eq!(second.total_time, None);
}
