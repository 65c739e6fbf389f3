//! Test utilities for position, proximity and cascade tests.
//!
//! Provides deterministic stand-in propagators, catalog fixtures and
//! hand-placed debris fragments.

use bevy::math::DVec3;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::propagation::{PropagatedState, Propagator, Unresolvable};
use crate::types::{ObjectCategory, OrbitalElements, TrackedObject, WGS84_A_KM};

/// Fixtures for creating test catalog objects and propagators.
pub mod fixtures {
    use super::*;

    pub const ISS_LINE1: &str =
        "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
    pub const ISS_LINE2: &str =
        "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    /// The ISS with real two-line elements.
    pub fn iss() -> TrackedObject {
        TrackedObject::new(
            25544,
            "ISS (ZARYA)",
            ObjectCategory::Stations,
            OrbitalElements::new(ISS_LINE1, ISS_LINE2),
        )
    }

    /// Epoch of the ISS element set (2020 day 194.886).
    pub fn iss_epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 7, 12, 21, 16, 0).unwrap()
    }

    /// Placeholder elements for propagators that ignore them.
    pub fn dummy_elements() -> OrbitalElements {
        OrbitalElements::new("1 0", "2 0")
    }

    /// Reference instant for synthetic orbits.
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    /// Always reports the same Earth-fixed position.
    pub struct FixedPropagator(pub DVec3);

    impl Propagator for FixedPropagator {
        fn propagate(
            &self,
            _elements: &OrbitalElements,
            _instant: DateTime<Utc>,
        ) -> Result<PropagatedState, Unresolvable> {
            Ok(PropagatedState {
                position_ecef_km: self.0,
                velocity_km_s: DVec3::new(0.0, 7.5, 0.0),
            })
        }
    }

    /// Equatorial circular orbits encoded in the element lines.
    ///
    /// Line 1 holds the altitude in km, line 2 the longitude (degrees) at
    /// [`epoch`]. Every object completes one revolution per `period_minutes`.
    /// When `gap_every` is set, whole minutes divisible by it are unresolvable.
    pub struct CircularPropagator {
        pub period_minutes: f64,
        pub gap_every: Option<i64>,
    }

    impl Default for CircularPropagator {
        fn default() -> Self {
            Self {
                period_minutes: 90.0,
                gap_every: None,
            }
        }
    }

    impl Propagator for CircularPropagator {
        fn propagate(
            &self,
            elements: &OrbitalElements,
            instant: DateTime<Utc>,
        ) -> Result<PropagatedState, Unresolvable> {
            let altitude: f64 = elements
                .line1()
                .trim()
                .parse()
                .map_err(|_| Unresolvable::MalformedElements(elements.line1().to_string()))?;
            let phase: f64 = elements
                .line2()
                .trim()
                .parse()
                .map_err(|_| Unresolvable::MalformedElements(elements.line2().to_string()))?;

            let elapsed_ms = (instant - epoch()).num_milliseconds();
            if let Some(n) = self.gap_every {
                if elapsed_ms % 60_000 == 0 && (elapsed_ms / 60_000) % n == 0 {
                    return Err(Unresolvable::PropagationFailed("gap".to_string()));
                }
            }

            let minutes = elapsed_ms as f64 / 60_000.0;
            let angle = (phase + 360.0 * minutes / self.period_minutes).to_radians();
            let r = WGS84_A_KM + altitude;
            let speed = std::f64::consts::TAU * r / (self.period_minutes * 60.0);
            Ok(PropagatedState {
                position_ecef_km: DVec3::new(r * angle.cos(), r * angle.sin(), 0.0),
                velocity_km_s: DVec3::new(-speed * angle.sin(), speed * angle.cos(), 0.0),
            })
        }
    }

    /// A synthetic object on an equatorial circular orbit for [`CircularPropagator`].
    pub fn circular_object(id: u32, altitude_km: f64, phase_deg: f64) -> TrackedObject {
        TrackedObject::new(
            id,
            format!("SYNTH-{id}"),
            ObjectCategory::Active,
            OrbitalElements::new(altitude_km.to_string(), phase_deg.to_string()),
        )
    }

    /// Minutes after [`epoch`].
    pub fn at_minutes(minutes: i64) -> DateTime<Utc> {
        epoch() + Duration::minutes(minutes)
    }
}

/// Utilities for creating headless Bevy apps for testing.
pub mod bevy_test {
    use bevy::prelude::*;

    /// Create a minimal Bevy app for testing without rendering.
    pub fn headless_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::propagation::resolve_position;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_circular_object_altitude() {
        let obj = circular_object(1, 550.0, 30.0);
        let pos = resolve_position(&CircularPropagator::default(), &obj.elements, epoch()).unwrap();
        assert_abs_diff_eq!(pos.altitude_km, 550.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pos.longitude, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.latitude, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circular_object_moves() {
        let obj = circular_object(1, 550.0, 0.0);
        let prop = CircularPropagator::default();
        let at = at_minutes(22) + chrono::Duration::seconds(30);
        let quarter = resolve_position(&prop, &obj.elements, at).unwrap();
        assert_abs_diff_eq!(quarter.longitude, 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gap_propagator() {
        let obj = circular_object(1, 550.0, 0.0);
        let prop = CircularPropagator {
            gap_every: Some(5),
            ..Default::default()
        };
        assert!(resolve_position(&prop, &obj.elements, at_minutes(5)).is_err());
        assert!(resolve_position(&prop, &obj.elements, at_minutes(6)).is_ok());
    }
}
