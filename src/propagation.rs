//! Position resolution for tracked objects.
//!
//! Wraps an orbit propagator behind the [`Propagator`] trait and converts its
//! Earth-fixed output into a [`GeodeticPosition`]. Every failure mode is
//! reported as [`Unresolvable`] so batch callers can omit the object for that
//! instant and carry on.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bevy::math::DVec3;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::types::{GeodeticPosition, OrbitalElements, RAD_TO_DEG, WGS84_A_KM, WGS84_B_KM};

/// J2000.0 epoch as Unix milliseconds (January 1, 2000, 12:00 UTC)
const J2000_UNIX_MS: i64 = 946_728_000_000;

/// Altitudes below zero but above this floor are treated as numeric noise and clamped.
pub const ALTITUDE_NOISE_FLOOR_KM: f64 = -1.0;

/// Iterations of the geodetic latitude fixed-point solve.
const GEODETIC_ITERATIONS: usize = 20;

/// Reasons a position could not be produced for an object at an instant.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Unresolvable {
    #[error("object has no orbital elements")]
    MissingElements,

    #[error("malformed orbital elements: {0}")]
    MalformedElements(String),

    #[error("propagation failed: {0}")]
    PropagationFailed(String),

    #[error("propagated state is not finite")]
    NonFinite,

    #[error("resolved altitude {0:.3} km is below the surface")]
    BelowSurface(f64),
}

/// Earth-fixed state reported by a propagator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropagatedState {
    /// Position in the Earth-centered Earth-fixed frame (km)
    pub position_ecef_km: DVec3,
    /// Velocity (km/s). Only its magnitude is consumed.
    pub velocity_km_s: DVec3,
}

/// Black-box orbit propagator.
///
/// Implementations must be pure: the same elements and instant always give
/// the same answer.
pub trait Propagator {
    fn propagate(
        &self,
        elements: &OrbitalElements,
        instant: DateTime<Utc>,
    ) -> Result<PropagatedState, Unresolvable>;
}

/// Element set parsed once and reused for every later instant.
#[derive(Debug)]
struct ParsedElements {
    constants: sgp4::Constants,
    epoch: NaiveDateTime,
}

/// SGP4 propagation backed by the `sgp4` crate.
///
/// Parsed constants are cached per element set, so sampling an arc parses
/// the lines once rather than once per instant.
#[derive(Debug, Default)]
pub struct Sgp4Propagator {
    parsed: RwLock<HashMap<OrbitalElements, Arc<ParsedElements>>>,
}

impl Sgp4Propagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of element sets parsed so far.
    pub fn cached_len(&self) -> usize {
        self.parsed.read().map(|guard| guard.len()).unwrap_or(0)
    }

    fn parse(&self, elements: &OrbitalElements) -> Result<Arc<ParsedElements>, Unresolvable> {
        if let Ok(guard) = self.parsed.read()
            && let Some(parsed) = guard.get(elements)
        {
            return Ok(Arc::clone(parsed));
        }

        let tle = sgp4::Elements::from_tle(
            None,
            elements.line1().trim().as_bytes(),
            elements.line2().trim().as_bytes(),
        )
        .map_err(|e| Unresolvable::MalformedElements(e.to_string()))?;
        let constants = sgp4::Constants::from_elements(&tle)
            .map_err(|e| Unresolvable::MalformedElements(e.to_string()))?;
        let parsed = Arc::new(ParsedElements {
            constants,
            epoch: tle.datetime,
        });

        // Best effort: a poisoned lock only costs a re-parse next time
        if let Ok(mut guard) = self.parsed.write() {
            guard.insert(elements.clone(), Arc::clone(&parsed));
        }
        Ok(parsed)
    }
}

impl Propagator for Sgp4Propagator {
    fn propagate(
        &self,
        elements: &OrbitalElements,
        instant: DateTime<Utc>,
    ) -> Result<PropagatedState, Unresolvable> {
        if !elements.is_present() {
            return Err(Unresolvable::MissingElements);
        }
        let parsed = self.parse(elements)?;

        let minutes_since_epoch =
            (instant.naive_utc() - parsed.epoch).num_milliseconds() as f64 / 60_000.0;

        let prediction = parsed
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes_since_epoch))
            .map_err(|e| Unresolvable::PropagationFailed(e.to_string()))?;

        // TEME -> Earth-fixed is a rotation about the polar axis by GMST
        let gmst = greenwich_mean_sidereal_time(instant);
        Ok(PropagatedState {
            position_ecef_km: teme_to_ecef(DVec3::from_array(prediction.position), gmst),
            velocity_km_s: teme_to_ecef(DVec3::from_array(prediction.velocity), gmst),
        })
    }
}

/// Greenwich mean sidereal time in radians (IAU-82 polynomial).
pub fn greenwich_mean_sidereal_time(instant: DateTime<Utc>) -> f64 {
    let days = (instant.timestamp_millis() - J2000_UNIX_MS) as f64 / 86_400_000.0;
    let centuries = days / 36525.0;
    let degrees = 280.46061837 + 360.98564736629 * days + 0.000387933 * centuries * centuries
        - centuries * centuries * centuries / 38_710_000.0;
    degrees.rem_euclid(360.0).to_radians()
}

/// Rotate a TEME vector into the Earth-fixed frame.
pub fn teme_to_ecef(v: DVec3, gmst: f64) -> DVec3 {
    let (sin_g, cos_g) = gmst.sin_cos();
    DVec3::new(
        v.x * cos_g + v.y * sin_g,
        -v.x * sin_g + v.y * cos_g,
        v.z,
    )
}

/// Convert an Earth-fixed position (km) into geodetic latitude, longitude
/// (degrees) and height above the WGS-84 ellipsoid (km).
pub fn ecef_to_geodetic(p: DVec3) -> (f64, f64, f64) {
    let a = WGS84_A_KM;
    let f = (WGS84_A_KM - WGS84_B_KM) / WGS84_A_KM;
    let e2 = 2.0 * f - f * f;

    let r = (p.x * p.x + p.y * p.y).sqrt();
    let longitude = p.y.atan2(p.x);

    let mut latitude = p.z.atan2(r);
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = latitude.sin();
        let c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (p.z + a * c * e2 * sin_lat).atan2(r);
    }

    // Projected form stays well-conditioned over the poles
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let height = r * cos_lat + p.z * sin_lat - a * (1.0 - e2 * sin_lat * sin_lat).sqrt();

    (latitude * RAD_TO_DEG, longitude * RAD_TO_DEG, height)
}

/// Resolve an object's geodetic position at `instant`.
///
/// Pure function of the elements and the instant.
pub fn resolve_position<P: Propagator + ?Sized>(
    propagator: &P,
    elements: &OrbitalElements,
    instant: DateTime<Utc>,
) -> Result<GeodeticPosition, Unresolvable> {
    let state = propagator.propagate(elements, instant)?;
    if !state.position_ecef_km.is_finite() {
        return Err(Unresolvable::NonFinite);
    }

    let (latitude, longitude, altitude_km) = ecef_to_geodetic(state.position_ecef_km);
    if !(latitude.is_finite() && longitude.is_finite() && altitude_km.is_finite()) {
        return Err(Unresolvable::NonFinite);
    }
    if altitude_km < ALTITUDE_NOISE_FLOOR_KM {
        return Err(Unresolvable::BelowSurface(altitude_km));
    }

    Ok(GeodeticPosition::new(latitude, longitude, altitude_km.max(0.0))
        .with_speed(state.velocity_km_s.length()))
}
