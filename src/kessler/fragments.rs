//! Synthetic debris fragments: seeding, motion and fragmentation.
//!
//! Motion is a visual approximation (longitude drift plus a sinusoidal
//! latitude wobble), not an orbital integrator.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::types::wrap_longitude;

/// Longitude drift per (km/s × simulated time unit), degrees.
pub const LONGITUDE_RATE: f64 = 0.1;
/// Amplitude of the latitude wobble per simulated time unit, degrees.
pub const LATITUDE_WOBBLE: f64 = 0.5;
/// Spread of seed phase angles within one band, degrees.
const SEED_PHASE_JITTER_DEG: f64 = 20.0;
/// Seed latitudes stay inside this band, degrees.
const SEED_LATITUDE_LIMIT: f64 = 70.0;
/// Half-width of seed altitude jitter, km.
const SEED_ALTITUDE_JITTER_KM: f64 = 25.0;

/// Number of fragments spawned by one collision.
pub const FRAGMENTS_PER_COLLISION: RangeInclusive<usize> = 3..=8;
/// Half-width of fragment lat/lng jitter around the impact midpoint, degrees.
const SPAWN_ANGLE_JITTER_DEG: f64 = 5.0;
/// Half-width of fragment altitude jitter around the impact midpoint, km.
const SPAWN_ALTITUDE_JITTER_KM: f64 = 15.0;
/// Label carried by every collision product.
pub const COLLISION_FRAGMENT_LABEL: &str = "Collision Fragment";

/// One synthetic debris object.
#[derive(Clone, Debug, PartialEq)]
pub struct DebrisFragment {
    /// Unique within a run; never reused.
    pub id: u64,
    /// Degrees, [-90, 90]
    pub lat: f64,
    /// Degrees, [-180, 180)
    pub lng: f64,
    pub alt_km: f64,
    pub size_m: f64,
    pub velocity_km_s: f64,
    /// Seed band name or [`COLLISION_FRAGMENT_LABEL`]
    pub origin: String,
    /// Simulated time units since creation
    pub age: f64,
    pub recently_created: bool,
}

impl DebrisFragment {
    /// Advance motion and age by `dt` simulated time units.
    ///
    /// The recently-created flag clears once age exceeds `recent_age`.
    pub fn advance(&mut self, dt: f64, recent_age: f64) {
        self.lng = wrap_longitude(self.lng + self.velocity_km_s * dt * LONGITUDE_RATE);
        self.lat = (self.lat + (self.lng * 0.1).sin() * dt * LATITUDE_WOBBLE).clamp(-90.0, 90.0);
        self.age += dt;
        self.recently_created = self.recently_created && self.age <= recent_age;
    }
}

/// A shell of seed debris at a representative altitude.
#[derive(Clone, Debug, PartialEq)]
pub struct AltitudeBand {
    pub name: String,
    pub altitude_km: f64,
    pub count: usize,
}

impl AltitudeBand {
    pub fn new(name: impl Into<String>, altitude_km: f64, count: usize) -> Self {
        Self {
            name: name.into(),
            altitude_km,
            count,
        }
    }
}

/// The four common low-orbit shells used to seed a run (75 objects).
pub fn default_bands() -> Vec<AltitudeBand> {
    vec![
        AltitudeBand::new("LEO Lower", 400.0, 15),
        AltitudeBand::new("Starlink Shell", 550.0, 20),
        AltitudeBand::new("Iridium Shell", 780.0, 25),
        AltitudeBand::new("LEO Upper", 850.0, 15),
    ]
}

/// Seed a population across `bands`, numbering ids from `first_id`.
///
/// Fragments within a band are spread evenly in phase with a small random
/// offset so the shell starts roughly uniform.
pub fn seed_population<R: Rng + ?Sized>(
    rng: &mut R,
    bands: &[AltitudeBand],
    first_id: u64,
) -> Vec<DebrisFragment> {
    let mut id = first_id;
    let mut population = Vec::with_capacity(bands.iter().map(|b| b.count).sum());

    for band in bands {
        for i in 0..band.count {
            let angle = (i as f64 / band.count as f64) * 360.0
                + rng.gen_range(0.0..SEED_PHASE_JITTER_DEG);
            population.push(DebrisFragment {
                id,
                lat: rng.gen_range(-SEED_LATITUDE_LIMIT..SEED_LATITUDE_LIMIT),
                lng: angle.rem_euclid(360.0) - 180.0,
                alt_km: band.altitude_km
                    + rng.gen_range(-SEED_ALTITUDE_JITTER_KM..SEED_ALTITUDE_JITTER_KM),
                size_m: rng.gen_range(0.5..2.5),
                velocity_km_s: rng.gen_range(7.5..8.0),
                origin: band.name.clone(),
                age: 0.0,
                recently_created: false,
            });
            id += 1;
        }
    }
    population
}

/// Fragments spawned by a collision between `pair`.
///
/// Pure apart from the injected random source: 3-8 smaller, faster-spread
/// fragments scattered around the pair's midpoint, with consecutive ids
/// starting at `next_id`.
pub fn generate_fragments<R: Rng + ?Sized>(
    rng: &mut R,
    pair: (&DebrisFragment, &DebrisFragment),
    next_id: u64,
) -> Vec<DebrisFragment> {
    let (a, b) = pair;
    let count = rng.gen_range(FRAGMENTS_PER_COLLISION);

    let center_lat = (a.lat + b.lat) / 2.0;
    let center_lng = (a.lng + b.lng) / 2.0;
    let center_alt = (a.alt_km + b.alt_km) / 2.0;

    (0..count as u64)
        .map(|i| DebrisFragment {
            id: next_id + i,
            lat: (center_lat + rng.gen_range(-SPAWN_ANGLE_JITTER_DEG..SPAWN_ANGLE_JITTER_DEG))
                .clamp(-90.0, 90.0),
            lng: wrap_longitude(
                center_lng + rng.gen_range(-SPAWN_ANGLE_JITTER_DEG..SPAWN_ANGLE_JITTER_DEG),
            ),
            alt_km: center_alt
                + rng.gen_range(-SPAWN_ALTITUDE_JITTER_KM..SPAWN_ALTITUDE_JITTER_KM),
            size_m: rng.gen_range(0.1..0.6),
            velocity_km_s: rng.gen_range(7.0..8.5),
            origin: COLLISION_FRAGMENT_LABEL.to_string(),
            age: 0.0,
            recently_created: true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kessler::test_fragment;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_default_bands_total() {
        let bands = default_bands();
        assert_eq!(bands.len(), 4);
        let counts: Vec<usize> = bands.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![15, 20, 25, 15]);
    }

    #[test]
    fn test_seed_population_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let bands = default_bands();
        let population = seed_population(&mut rng, &bands, 0);

        assert_eq!(population.len(), 75);
        for (i, f) in population.iter().enumerate() {
            assert_eq!(f.id, i as u64);
            assert!((-70.0..70.0).contains(&f.lat));
            assert!((-180.0..180.0).contains(&f.lng));
            assert!((0.5..2.5).contains(&f.size_m));
            assert!((7.5..8.0).contains(&f.velocity_km_s));
            assert!(!f.recently_created);
            assert_eq!(f.age, 0.0);
        }
        for band in &bands {
            let members: Vec<_> = population.iter().filter(|f| f.origin == band.name).collect();
            assert_eq!(members.len(), band.count);
            assert!(members.iter().all(|f| (f.alt_km - band.altitude_km).abs() <= 25.0));
        }
    }

    #[test]
    fn test_generate_fragments_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = test_fragment(1, 10.0, 20.0, 550.0);
        let b = test_fragment(2, 10.0, 20.0, 552.0);

        for round in 0..50 {
            let base = 100 + round * 10;
            let fragments = generate_fragments(&mut rng, (&a, &b), base);
            assert!(FRAGMENTS_PER_COLLISION.contains(&fragments.len()));
            for (i, f) in fragments.iter().enumerate() {
                assert_eq!(f.id, base + i as u64);
                assert!(f.recently_created);
                assert_eq!(f.origin, COLLISION_FRAGMENT_LABEL);
                assert!((0.1..0.6).contains(&f.size_m));
                assert!((7.0..8.5).contains(&f.velocity_km_s));
                assert!((f.lat - 10.0).abs() <= 5.0);
                assert!((f.lng - 20.0).abs() <= 5.0);
                assert!((f.alt_km - 551.0).abs() <= 15.0);
            }
        }
    }

    #[test]
    fn test_generate_fragments_deterministic() {
        let a = test_fragment(1, 0.0, 0.0, 400.0);
        let b = test_fragment(2, 0.0, 0.0, 400.0);
        let first = generate_fragments(&mut StdRng::seed_from_u64(9), (&a, &b), 10);
        let second = generate_fragments(&mut StdRng::seed_from_u64(9), (&a, &b), 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_advance_drifts_longitude() {
        let mut f = test_fragment(1, 0.0, 0.0, 500.0);
        f.velocity_km_s = 8.0;
        f.advance(1.0, 2.0);
        assert!((f.lng - 0.8).abs() < 1e-12);
        assert_eq!(f.age, 1.0);
    }

    #[test]
    fn test_advance_wraps_longitude() {
        let mut f = test_fragment(1, 0.0, 179.9, 500.0);
        f.velocity_km_s = 8.0;
        f.advance(1.0, 2.0);
        assert!(f.lng < -179.0 && f.lng >= -180.0, "lng {}", f.lng);
    }

    #[test]
    fn test_advance_clamps_latitude() {
        let mut f = test_fragment(1, 89.99, 50.0, 500.0);
        for _ in 0..100 {
            f.advance(5.0, 2.0);
            assert!((-90.0..=90.0).contains(&f.lat));
        }
    }

    #[test]
    fn test_recent_flag_clears_after_age() {
        let mut f = test_fragment(1, 0.0, 0.0, 500.0);
        f.recently_created = true;
        f.advance(1.5, 2.0);
        assert!(f.recently_created);
        f.advance(0.5, 2.0);
        assert!(f.recently_created);
        f.advance(0.1, 2.0);
        assert!(!f.recently_created);
        // Never comes back
        f.age = 0.0;
        f.advance(0.1, 2.0);
        assert!(!f.recently_created);
    }
}
