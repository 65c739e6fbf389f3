//! Pairwise collision detection over the debris population.

use super::fragments::DebrisFragment;

/// Separation below which two fragments collide, km.
pub const COLLISION_RADIUS_KM: f64 = 5.0;

/// Flat-earth conversion used for horizontal separation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Approximate horizontal separation, treating degrees as a flat grid.
///
/// Deliberately cruder than [`crate::proximity::distance_km`]; longitude
/// seam and latitude shrink are ignored.
pub fn planar_separation_km(a: &DebrisFragment, b: &DebrisFragment) -> f64 {
    let dlat = a.lat - b.lat;
    let dlng = a.lng - b.lng;
    (dlat * dlat + dlng * dlng).sqrt() * KM_PER_DEGREE
}

/// Whether two fragments are within `radius_km` both vertically and horizontally.
pub fn is_colliding(a: &DebrisFragment, b: &DebrisFragment, radius_km: f64) -> bool {
    (a.alt_km - b.alt_km).abs() <= radius_km && planar_separation_km(a, b) < radius_km
}

/// First colliding pair in population order, `i < j`.
pub fn find_collision(population: &[DebrisFragment], radius_km: f64) -> Option<(usize, usize)> {
    for (i, a) in population.iter().enumerate() {
        for (j, b) in population.iter().enumerate().skip(i + 1) {
            if is_colliding(a, b, radius_km) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Record of a resolved collision, newest first in the cascade log.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionEvent {
    pub simulated_year: f64,
    pub first_origin: String,
    pub second_origin: String,
    pub fragments_created: usize,
}
