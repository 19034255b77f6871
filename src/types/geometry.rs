//! Track-plane geometry: timing gates and rectangular zones
//!
//! The track is flat. Positions live on the x/z plane with y up; a yaw of 0
//! faces +z and positive yaw turns toward +x.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Project a world position onto the track plane.
pub fn plane(v: &Vector3<f32>) -> Vector2<f32> {
    Vector2::new(v.x, v.z)
}

/// Unit heading on the track plane for a yaw angle.
pub fn heading(yaw: f32) -> Vector2<f32> {
    Vector2::new(yaw.sin(), yaw.cos())
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + std::f32::consts::PI).rem_euclid(std::f32::consts::TAU);
    wrapped - std::f32::consts::PI
}

/// A timing line with a valid crossing direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Gate {
    /// First endpoint `[x, z]`
    pub a: [f32; 2],
    /// Second endpoint `[x, z]`
    pub b: [f32; 2],
    /// Yaw of the valid crossing direction (radians)
    pub heading: f32,
}

impl Gate {
    pub fn new(a: [f32; 2], b: [f32; 2], heading: f32) -> Self {
        Self { a, b, heading }
    }

    pub fn length(&self) -> f32 {
        (Vector2::from(self.b) - Vector2::from(self.a)).norm()
    }

    pub fn midpoint(&self) -> Vector2<f32> {
        (Vector2::from(self.a) + Vector2::from(self.b)) * 0.5
    }

    /// Whether the movement `from -> to` crosses the gate along its heading.
    ///
    /// Crossing against the heading, or touching the line without moving along
    /// the heading, does not count.
    pub fn crossed_by(&self, from: Vector2<f32>, to: Vector2<f32>) -> bool {
        self.crossing(from, to).is_some()
    }

    /// Fraction of the movement `from -> to` at which it crosses the gate along
    /// its heading, in `0.0..=1.0`.
    pub fn crossing(&self, from: Vector2<f32>, to: Vector2<f32>) -> Option<f32> {
        let travel = to - from;
        if travel.dot(&heading(self.heading)) <= 0.0 {
            return None;
        }
        segment_intersection(from, to, Vector2::from(self.a), Vector2::from(self.b))
    }
}

/// Axis-aligned rectangle on the track plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Zone {
    /// Minimum corner `[x, z]`
    pub min: [f32; 2],
    /// Maximum corner `[x, z]`
    pub max: [f32; 2],
}

impl Zone {
    pub fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Vector2<f32>) -> bool {
        p.x >= self.min[0] && p.x <= self.max[0] && p.y >= self.min[1] && p.y <= self.max[1]
    }

    pub fn contains_zone(&self, other: &Zone) -> bool {
        self.contains(Vector2::from(other.min)) && self.contains(Vector2::from(other.max))
    }

    pub fn area(&self) -> f32 {
        (self.max[0] - self.min[0]).max(0.0) * (self.max[1] - self.min[1]).max(0.0)
    }

    /// Closest point inside the zone.
    pub fn clamp(&self, p: Vector2<f32>) -> Vector2<f32> {
        Vector2::new(p.x.clamp(self.min[0], self.max[0]), p.y.clamp(self.min[1], self.max[1]))
    }
}

fn cross(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Proper or touching intersection of segments `p1-p2` and `q1-q2`, as the
/// fraction along `p1-p2`.
pub fn segment_intersection(
    p1: Vector2<f32>,
    p2: Vector2<f32>,
    q1: Vector2<f32>,
    q2: Vector2<f32>,
) -> Option<f32> {
    let r = p2 - p1;
    let s = q2 - q1;
    let denom = cross(r, s);
    let qp = q1 - p1;

    if denom.abs() < f32::EPSILON {
        // Parallel movement never counts as a crossing
        return None;
    }

    let t = cross(qp, s) / denom;
    let u = cross(qp, r) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn finish_line() -> Gate {
        // Line across the z axis at z = 0, valid when driving toward +z
        Gate::new([-10.0, 0.0], [10.0, 0.0], 0.0)
    }

    #[test]
    fn forward_crossing_counts() {
        let gate = finish_line();
        assert!(gate.crossed_by(Vector2::new(0.0, -0.5), Vector2::new(0.0, 0.5)));
    }

    #[test]
    fn reverse_crossing_is_rejected() {
        let gate = finish_line();
        assert!(!gate.crossed_by(Vector2::new(0.0, 0.5), Vector2::new(0.0, -0.5)));
    }

    #[test]
    fn crossing_outside_the_segment_misses() {
        let gate = finish_line();
        assert!(!gate.crossed_by(Vector2::new(15.0, -0.5), Vector2::new(15.0, 0.5)));
    }

    #[test]
    fn movement_parallel_to_gate_is_not_a_crossing() {
        let gate = Gate::new([0.0, -5.0], [0.0, 5.0], FRAC_PI_2);
        assert!(!gate.crossed_by(Vector2::new(0.0, -1.0), Vector2::new(0.0, 1.0)));
    }

    #[test]
    fn crossing_reports_fraction_of_movement() {
        let gate = finish_line();
        let t = gate.crossing(Vector2::new(0.0, -1.0), Vector2::new(0.0, 3.0)).unwrap();
        assert!((t - 0.25).abs() < 1e-6);
        assert_eq!(gate.crossing(Vector2::new(0.0, 1.0), Vector2::new(0.0, 3.0)), None);
    }

    #[test]
    fn zone_containment_and_clamp() {
        let zone = Zone::new([0.0, 0.0], [10.0, 20.0]);
        assert!(zone.contains(Vector2::new(5.0, 5.0)));
        assert!(!zone.contains(Vector2::new(-0.1, 5.0)));
        assert_eq!(zone.clamp(Vector2::new(12.0, -3.0)), Vector2::new(10.0, 0.0));
        assert!(zone.contains_zone(&Zone::new([1.0, 1.0], [2.0, 2.0])));
        assert!(!zone.contains_zone(&Zone::new([1.0, 1.0], [12.0, 2.0])));
    }

    #[test]
    fn heading_follows_yaw_convention() {
        let ahead = heading(0.0);
        assert!((ahead - Vector2::new(0.0, 1.0)).norm() < 1e-6);
        let right = heading(FRAC_PI_2);
        assert!((right - Vector2::new(1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn wrap_angle_stays_in_half_turn() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-4 || (wrap_angle(3.0 * PI) + PI).abs() < 1e-4);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-6);
        assert!((wrap_angle(-0.25 - 2.0 * PI) + 0.25).abs() < 1e-5);
    }
}
