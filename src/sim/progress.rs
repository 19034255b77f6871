//! Checkpoints, laps and classification.

use nalgebra::Vector2;
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::types::{CarId, Gate, LapRecord};

/// What a car achieved on one tick. At most one per car per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    CheckpointPassed { index: usize },
    LapCompleted { lap: u32, time: f64, personal_best: bool },
    /// Final lap completed; the car is classified and frozen
    RaceFinished { position: usize, total_time: f64, lap_time: f64, personal_best: bool },
}

/// Per-car progress around the circuit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapProgress {
    /// Index of the next checkpoint; equal to the checkpoint count once all are
    /// passed and the finish gate is armed
    pub cursor: usize,
    /// 1-based lap being driven
    pub lap: u32,
    pub record: LapRecord,
    /// Seconds since green
    pub race_time: f64,
    /// 1-based finishing position once classified
    pub finish_position: Option<usize>,
}

impl LapProgress {
    fn new() -> Self {
        Self { lap: 1, ..Self::default() }
    }

    pub fn finished(&self) -> bool {
        self.finish_position.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct RaceProgressTracker {
    checkpoints: Vec<Gate>,
    finish: Gate,
    total_laps: u32,
    cars: Vec<LapProgress>,
    finishers: usize,
}

impl RaceProgressTracker {
    pub fn new(checkpoints: Vec<Gate>, finish: Gate, total_laps: u32, cars: usize) -> Self {
        Self { checkpoints, finish, total_laps, cars: vec![LapProgress::new(); cars], finishers: 0 }
    }

    pub fn total_laps(&self) -> u32 {
        self.total_laps
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn progress(&self, car: CarId) -> Option<&LapProgress> {
        self.cars.get(car.index())
    }

    /// Progress of every car in grid order.
    pub fn all(&self) -> &[LapProgress] {
        &self.cars
    }

    pub fn is_finished(&self, car: CarId) -> bool {
        self.progress(car).is_some_and(LapProgress::finished)
    }

    pub fn all_finished(&self) -> bool {
        self.finishers == self.cars.len()
    }

    pub fn finishers(&self) -> usize {
        self.finishers
    }

    /// Gate the car must cross next.
    pub fn next_gate(&self, car: CarId) -> Option<&Gate> {
        let progress = self.progress(car)?;
        Some(self.checkpoints.get(progress.cursor).unwrap_or(&self.finish))
    }

    /// Advance timers and test the movement `previous -> position` against the next gate.
    ///
    /// Checkpoints count only in order and only along their heading. The finish
    /// gate closes a lap only once every checkpoint of the lap has been passed;
    /// any other crossing of it is ignored. A movement that passes the last
    /// checkpoint and then the finish gate closes the lap in the same tick.
    /// Finished cars are frozen. Unknown cars are ignored.
    pub fn on_tick(
        &mut self,
        car: CarId,
        previous: Vector2<f32>,
        position: Vector2<f32>,
        dt: f64,
    ) -> Option<ProgressEvent> {
        let total_laps = self.total_laps;
        let checkpoint_count = self.checkpoints.len();
        let progress = self.cars.get_mut(car.index())?;
        if progress.finished() {
            return None;
        }
        progress.record.tick(dt);
        progress.race_time += dt;

        if let Some(gate) = self.checkpoints.get(progress.cursor) {
            let passed_at = gate.crossing(previous, position)?;
            let index = progress.cursor;
            progress.cursor += 1;
            let finish_too = progress.cursor == checkpoint_count
                && self.finish.crossing(previous, position).is_some_and(|at| at >= passed_at);
            if !finish_too {
                return Some(ProgressEvent::CheckpointPassed { index });
            }
        } else if !self.finish.crossed_by(previous, position) {
            return None;
        }
        let (time, personal_best) = progress.record.complete();
        let lap = progress.lap;
        progress.lap += 1;
        progress.cursor = 0;

        if progress.lap > total_laps {
            self.finishers += 1;
            progress.finish_position = Some(self.finishers);
            info!(
                car = %car,
                position = self.finishers,
                total_time = progress.race_time,
                "Car finished"
            );
            return Some(ProgressEvent::RaceFinished {
                position: self.finishers,
                total_time: progress.race_time,
                lap_time: time,
                personal_best,
            });
        }
        debug!(car = %car, lap, time, personal_best, "Lap completed");
        Some(ProgressEvent::LapCompleted { lap, time, personal_best })
    }

    /// Running order, leader first.
    ///
    /// Finishers by finishing position, then everyone else by laps completed,
    /// checkpoints passed this lap and distance to the next gate.
    pub fn standings(&self, positions: &[Vector2<f32>]) -> Vec<CarId> {
        let distance = |i: usize| {
            let gate = self.checkpoints.get(self.cars[i].cursor).unwrap_or(&self.finish);
            positions.get(i).map_or(f32::INFINITY, |p| (gate.midpoint() - p).norm())
        };
        let mut order: Vec<usize> = (0..self.cars.len()).collect();
        order.sort_by(|&a, &b| {
            let (pa, pb) = (&self.cars[a], &self.cars[b]);
            match (pa.finish_position, pb.finish_position) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => pb
                    .record
                    .laps_completed()
                    .cmp(&pa.record.laps_completed())
                    .then(pb.cursor.cmp(&pa.cursor))
                    .then(distance(a).total_cmp(&distance(b)))
                    .then(a.cmp(&b)),
            }
        });
        order.into_iter().map(CarId).collect()
    }

    pub(crate) fn reset(&mut self) {
        self.cars.iter_mut().for_each(|progress| *progress = LapProgress::new());
        self.finishers = 0;
    }
}
