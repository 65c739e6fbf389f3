//! Common test utilities for integration tests.

#![allow(dead_code)]

use bevy::math::DVec3;
use bevy::prelude::*;
use chrono::{DateTime, Duration, TimeZone, Utc};
use kessler_core::kessler::DebrisFragment;
use kessler_core::propagation::{PropagatedState, Propagator, Unresolvable};
use kessler_core::types::{ObjectCategory, OrbitalElements, TrackedObject, WGS84_A_KM};

/// Reference instant for synthetic orbits.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

pub fn at_minutes(minutes: i64) -> DateTime<Utc> {
    epoch() + Duration::minutes(minutes)
}

/// Equatorial circular orbits: line 1 is altitude (km), line 2 is longitude
/// at [`epoch`] (degrees). One revolution per `period_minutes`.
pub struct RingPropagator {
    pub period_minutes: f64,
}

impl Default for RingPropagator {
    fn default() -> Self {
        Self { period_minutes: 90.0 }
    }
}

impl Propagator for RingPropagator {
    fn propagate(
        &self,
        elements: &OrbitalElements,
        instant: DateTime<Utc>,
    ) -> Result<PropagatedState, Unresolvable> {
        let parse = |line: &str| {
            line.trim()
                .parse::<f64>()
                .map_err(|_| Unresolvable::MalformedElements(line.to_string()))
        };
        let altitude = parse(elements.line1())?;
        let phase = parse(elements.line2())?;

        let minutes = (instant - epoch()).num_milliseconds() as f64 / 60_000.0;
        let angle = (phase + 360.0 * minutes / self.period_minutes).to_radians();
        let r = WGS84_A_KM + altitude;
        let speed = std::f64::consts::TAU * r / (self.period_minutes * 60.0);
        Ok(PropagatedState {
            position_ecef_km: DVec3::new(r * angle.cos(), r * angle.sin(), 0.0),
            velocity_km_s: DVec3::new(-speed * angle.sin(), speed * angle.cos(), 0.0),
        })
    }
}

/// A synthetic object for [`RingPropagator`].
pub fn ring_object(id: u32, altitude_km: f64, phase_deg: f64) -> TrackedObject {
    TrackedObject::new(
        id,
        format!("RING-{id}"),
        ObjectCategory::Cosmos2251Debris,
        OrbitalElements::new(altitude_km.to_string(), phase_deg.to_string()),
    )
}

/// A stationary-looking debris fragment.
pub fn fragment(id: u64, lat: f64, lng: f64, alt_km: f64) -> DebrisFragment {
    DebrisFragment {
        id,
        lat,
        lng,
        alt_km,
        size_m: 1.0,
        velocity_km_s: 7.5,
        origin: format!("Fixture {id}"),
        age: 0.0,
        recently_created: false,
    }
}

/// Create a minimal Bevy app for testing without rendering.
pub fn headless_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app
}
