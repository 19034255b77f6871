//! Pit-lane phases and the longitudinal override they impose

use serde::{Deserialize, Serialize};

/// Where a car is in the pit-stop cycle.
///
/// `OnTrack → ApproachingPit → InPitLane → Servicing → Released → OnTrack`, with an
/// abort edge from `ApproachingPit`/`InPitLane` straight back to `OnTrack`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum PitPhase {
    #[default]
    OnTrack,
    /// Inside the pit-lane zone, still above the lane speed limit
    ApproachingPit,
    /// At or below the lane speed limit, heading for the service box
    InPitLane,
    /// Stationary timed stop in the service box
    Servicing,
    /// Service done, driving out of the lane
    Released,
}

impl PitPhase {
    pub fn in_pit(self) -> bool {
        !matches!(self, PitPhase::OnTrack)
    }

    /// Short label for HUD/pit boards.
    pub fn label(self) -> &'static str {
        match self {
            PitPhase::OnTrack => "TRACK",
            PitPhase::ApproachingPit => "PIT ENTRY",
            PitPhase::InPitLane => "PIT LANE",
            PitPhase::Servicing => "SERVICE",
            PitPhase::Released => "PIT EXIT",
        }
    }
}

/// Constraint the pit controller places on longitudinal control this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PitOverride {
    /// Driver has full control
    #[default]
    Free,
    /// Forward force is cut at the cap (m/s) and a limiter pulls speed back down
    SpeedCap(f32),
    /// Speed is forced toward zero regardless of input
    Hold,
}

impl PitOverride {
    pub fn speed_cap(self) -> Option<f32> {
        match self {
            PitOverride::SpeedCap(cap) => Some(cap),
            _ => None,
        }
    }

    pub fn is_hold(self) -> bool {
        matches!(self, PitOverride::Hold)
    }

    pub fn is_free(self) -> bool {
        matches!(self, PitOverride::Free)
    }
}
