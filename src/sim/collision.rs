//! Wall and car-to-car contact detection.
//!
//! Contacts are not rigid-body collisions. Each one becomes an [`Impact`]
//! (separation plus speed loss) and a damage amount, applied atomically by the
//! simulation step.

use nalgebra::Vector2;

use super::Impact;
use crate::config::CollisionConfig;
use crate::types::geometry::plane;
use crate::types::{CarId, Vehicle, Zone};

/// One car's share of a contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub car: CarId,
    /// `None` for a wall
    pub other: Option<CarId>,
    pub impact: Impact,
    /// Closing speed along the contact normal (m/s)
    pub impact_speed: f32,
    pub damage: f32,
}

#[derive(Debug, Clone)]
pub struct CollisionResolver {
    config: CollisionConfig,
    bounds: Zone,
}

impl CollisionResolver {
    pub fn new(config: CollisionConfig, bounds: Zone) -> Self {
        Self { config, bounds }
    }

    /// Find every contact for the cars marked active.
    ///
    /// Walls are checked first in car order, then every pair `(i, j)` with
    /// `i < j` in index order. All tests use the positions as they stood after
    /// integration, so the result does not depend on the order it is applied in.
    pub fn detect(&self, vehicles: &[Vehicle], active: &[bool]) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let is_active = |i: usize| active.get(i).copied().unwrap_or(false);

        for (i, vehicle) in vehicles.iter().enumerate().filter(|(i, _)| is_active(*i)) {
            if let Some(contact) = self.wall_contact(CarId(i), vehicle) {
                contacts.push(contact);
            }
        }

        let diameter = self.config.car_radius * 2.0;
        for i in 0..vehicles.len() {
            if !is_active(i) {
                continue;
            }
            for j in (i + 1)..vehicles.len() {
                if !is_active(j) {
                    continue;
                }
                let pi = vehicles[i].plane_position();
                let pj = vehicles[j].plane_position();
                let offset = pi - pj;
                let distance = offset.norm();
                if distance >= diameter {
                    continue;
                }
                // Unit vector from j toward i
                let normal =
                    if distance > f32::EPSILON { offset / distance } else { Vector2::new(1.0, 0.0) };
                let overlap = diameter - distance;
                let relative = plane(&vehicles[j].velocity()) - plane(&vehicles[i].velocity());
                let impact_speed = relative.dot(&normal).max(0.0);
                let (damage, speed_scale) = self.response(
                    impact_speed,
                    self.config.car_damage_per_mps,
                    self.config.car_speed_penalty,
                );

                contacts.push(Contact {
                    car: CarId(i),
                    other: Some(CarId(j)),
                    impact: Impact {
                        correction: normal * (overlap * 0.5),
                        normal: Some(-normal),
                        speed_scale,
                    },
                    impact_speed,
                    damage,
                });
                contacts.push(Contact {
                    car: CarId(j),
                    other: Some(CarId(i)),
                    impact: Impact {
                        correction: -normal * (overlap * 0.5),
                        normal: Some(normal),
                        speed_scale,
                    },
                    impact_speed,
                    damage,
                });
            }
        }
        contacts
    }

    fn wall_contact(&self, car: CarId, vehicle: &Vehicle) -> Option<Contact> {
        let position = vehicle.plane_position();
        if self.bounds.contains(position) {
            return None;
        }
        let inside = self.bounds.clamp(position);
        let correction = inside - position;
        let outward = -correction.try_normalize(f32::EPSILON)?;
        let impact_speed = plane(&vehicle.velocity()).dot(&outward).max(0.0);
        let (damage, speed_scale) = self.response(
            impact_speed,
            self.config.wall_damage_per_mps,
            self.config.wall_speed_penalty,
        );
        Some(Contact {
            car,
            other: None,
            impact: Impact { correction, normal: Some(outward), speed_scale },
            impact_speed,
            damage,
        })
    }

    fn response(&self, impact_speed: f32, damage_per_mps: f32, penalty: f32) -> (f32, f32) {
        if impact_speed < self.config.min_impact_speed {
            (0.0, 1.0)
        } else {
            (impact_speed * damage_per_mps, 1.0 - penalty)
        }
    }
}
