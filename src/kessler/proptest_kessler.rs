//! Property-based tests for the cascade simulator using proptest.
//!
//! These tests drive seeded runs through random control sequences and check
//! the bookkeeping invariants that must hold regardless of the dice.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::fragments::{FRAGMENTS_PER_COLLISION, generate_fragments};
use super::{CascadeConfig, CascadeState, DebrisCascade, PopulationSample, test_fragment};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Ids stay unique across many ticks, including collision products.
    #[test]
    fn prop_ids_unique(seed in any::<u64>(), steps in 1usize..100, dt in 0.1f64..5.0) {
        let mut cascade = DebrisCascade::with_seed(CascadeConfig::default(), seed);
        cascade.start(0.0);
        cascade.set_speed(10.0).unwrap();

        for _ in 0..steps {
            cascade.advance(dt);
            // Force extra resolutions so collisions actually happen
            if cascade.state() == CascadeState::Running {
                cascade.detect_and_resolve();
            }
        }

        let ids: HashSet<u64> = cascade.population().iter().map(|f| f.id).collect();
        prop_assert_eq!(ids.len(), cascade.population().len());
    }

    /// History years strictly increase, start at year zero, and the recorded
    /// population never shrinks since every collision replaces 2 with 3-8.
    #[test]
    fn prop_history_monotonic(
        seed in any::<u64>(),
        dts in prop::collection::vec(0.0f64..20.0, 1..100),
    ) {
        let mut cascade = DebrisCascade::with_seed(CascadeConfig::default(), seed);
        cascade.start(0.0);

        for dt in dts {
            cascade.advance(dt);
        }

        let history = cascade.history();
        prop_assert_eq!(history[0], PopulationSample { year: 0, count: 75 });
        for pair in history.windows(2) {
            prop_assert!(pair[0].year < pair[1].year);
            prop_assert!(pair[0].count <= pair[1].count);
        }
        prop_assert!(history.last().unwrap().year as f64 <= cascade.elapsed_years());
    }

    /// Every fragment stays within valid coordinate ranges.
    #[test]
    fn prop_coordinates_in_range(
        seed in any::<u64>(),
        dts in prop::collection::vec(0.0f64..30.0, 1..60),
    ) {
        let mut cascade = DebrisCascade::with_seed(CascadeConfig::default(), seed);
        cascade.start(0.0);

        for dt in dts {
            cascade.advance(dt);
            for f in cascade.population() {
                prop_assert!((-90.0..=90.0).contains(&f.lat), "lat {}", f.lat);
                prop_assert!((-180.0..180.0).contains(&f.lng), "lng {}", f.lng);
            }
        }
    }

    /// Restart always yields the same fresh shape, whatever came before.
    #[test]
    fn prop_restart_shape(seed in any::<u64>(), steps in 0usize..50, pause in any::<bool>()) {
        let mut cascade = DebrisCascade::with_seed(CascadeConfig::default(), seed);
        cascade.start(0.0);
        for _ in 0..steps {
            cascade.advance(2.0);
            if cascade.state() == CascadeState::Running {
                cascade.detect_and_resolve();
            }
        }
        if pause {
            cascade.pause();
        }

        cascade.restart(1.0);
        prop_assert_eq!(cascade.state(), CascadeState::Running);
        prop_assert_eq!(cascade.population().len(), 75);
        prop_assert_eq!(cascade.collisions(), 0);
        prop_assert_eq!(cascade.elapsed_years(), 0.0);
        prop_assert_eq!(cascade.history(), &[PopulationSample { year: 0, count: 75 }][..]);
        prop_assert_eq!(cascade.recent_collisions().count(), 0);
    }

    /// Collision products scatter within their documented ranges.
    #[test]
    fn prop_fragment_ranges(
        seed in any::<u64>(),
        lat in -85.0f64..85.0,
        lng in -170.0f64..170.0,
        alt in 300.0f64..900.0,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = test_fragment(0, lat, lng, alt);
        let b = test_fragment(1, lat, lng, alt + 2.0);
        let spawned = generate_fragments(&mut rng, (&a, &b), 2);

        prop_assert!(FRAGMENTS_PER_COLLISION.contains(&spawned.len()));
        for f in &spawned {
            prop_assert!((f.lat - lat).abs() <= 5.0 + 1e-9);
            prop_assert!((f.lng - lng).abs() <= 5.0 + 1e-9);
            prop_assert!((f.alt_km - (alt + 1.0)).abs() <= 15.0);
            prop_assert!((0.1..0.6).contains(&f.size_m));
            prop_assert!((7.0..8.5).contains(&f.velocity_km_s));
        }
    }
}
