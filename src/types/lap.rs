//! Lap time bookkeeping

use serde::{Deserialize, Serialize};

/// Completed laps plus the running time of the open lap.
///
/// Completed entries are append-only. The best lap is maintained incrementally
/// on every append; [`LapRecord::recompute_best`] rescans on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LapRecord {
    completed: Vec<f64>,
    current: f64,
    best: Option<BestLap>,
}

/// Fastest completed lap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct BestLap {
    /// 1-based lap number
    pub lap: u32,
    /// Seconds
    pub time: f64,
}

impl LapRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the open lap's clock.
    pub fn tick(&mut self, dt: f64) {
        self.current += dt;
    }

    /// Close the open lap, returning its time and whether it is a new best.
    pub fn complete(&mut self) -> (f64, bool) {
        let time = self.current;
        self.completed.push(time);
        self.current = 0.0;

        let improved = self.best.is_none_or(|best| time < best.time);
        if improved {
            self.best = Some(BestLap { lap: self.completed.len() as u32, time });
        }
        (time, improved)
    }

    pub fn completed(&self) -> &[f64] {
        &self.completed
    }

    pub fn laps_completed(&self) -> u32 {
        self.completed.len() as u32
    }

    /// Running time of the open lap (seconds).
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn last(&self) -> Option<f64> {
        self.completed.last().copied()
    }

    pub fn best(&self) -> Option<BestLap> {
        self.best
    }

    /// Rescan every completed lap for the fastest one.
    pub fn recompute_best(&mut self) -> Option<BestLap> {
        self.best = self
            .completed
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, &time)| BestLap { lap: i as u32 + 1, time });
        self.best
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn incremental_best_matches_rescan(laps in prop::collection::vec(20.0f64..120.0, 1..30)) {
            let mut record = LapRecord::new();
            for lap in &laps {
                record.tick(*lap);
                record.complete();
            }
            let incremental = record.best();
            let rescanned = record.clone().recompute_best();
            prop_assert_eq!(incremental.map(|b| b.time), rescanned.map(|b| b.time));
            prop_assert_eq!(record.laps_completed() as usize, laps.len());
        }
    }

    #[test]
    fn complete_resets_running_time() {
        let mut record = LapRecord::new();
        record.tick(61.5);
        let (time, best) = record.complete();
        assert_eq!(time, 61.5);
        assert!(best);
        assert_eq!(record.current(), 0.0);

        record.tick(63.0);
        let (_, best) = record.complete();
        assert!(!best);
        assert_eq!(record.best(), Some(BestLap { lap: 1, time: 61.5 }));
        assert_eq!(record.last(), Some(63.0));
    }
}
