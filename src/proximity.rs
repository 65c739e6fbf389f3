//! Proximity analysis between tracked objects.
//!
//! All operations share one distance primitive: both geodetic positions are
//! lifted onto a spherical Earth (R = 6371 km plus altitude) and compared
//! with a straight-line Euclidean distance. This is not geodesy-grade, but
//! risk tiers only need kilometre granularity.

use bevy::math::DVec3;
use chrono::{DateTime, TimeDelta, Utc};

use crate::propagation::{Propagator, resolve_position};
use crate::types::{DEG_TO_RAD, EARTH_RADIUS_KM, GeodeticPosition, TrackedObject, minutes_to_delta};

/// Below this separation a pair is critical (km).
pub const CRITICAL_DISTANCE_KM: f64 = 1.0;
/// Below this separation a pair is dangerous (km).
pub const DANGER_DISTANCE_KM: f64 = 10.0;
/// Below this separation a pair warrants a warning (km).
pub const WARNING_DISTANCE_KM: f64 = 50.0;
/// Default search radius around a selected object (km).
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 100.0;

/// Collision risk tier, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
    Critical,
}

impl RiskLevel {
    /// Classify a separation. Boundary values fall into the less severe tier.
    pub fn from_distance(distance_km: f64) -> Self {
        if distance_km < CRITICAL_DISTANCE_KM {
            RiskLevel::Critical
        } else if distance_km < DANGER_DISTANCE_KM {
            RiskLevel::Danger
        } else if distance_km < WARNING_DISTANCE_KM {
            RiskLevel::Warning
        } else {
            RiskLevel::Safe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Warning => "Warning",
            RiskLevel::Danger => "Danger",
            RiskLevel::Critical => "Critical",
        }
    }
}

/// Lift a geodetic position onto a spherical Earth in Cartesian km.
pub fn to_cartesian(pos: &GeodeticPosition) -> DVec3 {
    let lat = pos.latitude * DEG_TO_RAD;
    let lon = pos.longitude * DEG_TO_RAD;
    let r = EARTH_RADIUS_KM + pos.altitude_km;
    DVec3::new(
        r * lat.cos() * lon.cos(),
        r * lat.cos() * lon.sin(),
        r * lat.sin(),
    )
}

/// Straight-line separation between two positions (km).
pub fn distance_km(a: &GeodeticPosition, b: &GeodeticPosition) -> f64 {
    to_cartesian(a).distance(to_cartesian(b))
}

/// A catalog object paired with its position at one shared instant.
///
/// `position` is `None` when the object could not be resolved at that instant.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedObject<'a> {
    pub object: &'a TrackedObject,
    pub position: Option<GeodeticPosition>,
}

/// Resolve every object in `objects` at `instant`.
///
/// Unresolvable objects are kept with `position: None` so one bad entry
/// never aborts the batch.
pub fn resolve_catalog<'a, P: Propagator + ?Sized>(
    propagator: &P,
    objects: &'a [TrackedObject],
    instant: DateTime<Utc>,
) -> Vec<ResolvedObject<'a>> {
    objects
        .iter()
        .map(|object| ResolvedObject {
            object,
            position: resolve_position(propagator, &object.elements, instant).ok(),
        })
        .collect()
}

/// An object near a query target.
#[derive(Clone, Debug, PartialEq)]
pub struct ProximityResult<'a> {
    pub object: &'a TrackedObject,
    pub distance_km: f64,
    pub risk: RiskLevel,
}

/// Every candidate within `max_distance_km` of `target`, nearest first.
///
/// The target itself (same `id`) and unresolved candidates are skipped.
/// No result limit is applied.
pub fn find_nearby_objects<'a>(
    target: &ResolvedObject<'_>,
    pool: &[ResolvedObject<'a>],
    max_distance_km: f64,
) -> Vec<ProximityResult<'a>> {
    let Some(target_pos) = target.position else {
        return Vec::new();
    };

    let mut nearby: Vec<ProximityResult<'a>> = pool
        .iter()
        .filter(|candidate| candidate.object.id != target.object.id)
        .filter_map(|candidate| {
            let pos = candidate.position?;
            let distance = distance_km(&target_pos, &pos);
            (distance <= max_distance_km).then(|| ProximityResult {
                object: candidate.object,
                distance_km: distance,
                risk: RiskLevel::from_distance(distance),
            })
        })
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

/// Configuration for closest-approach search.
#[derive(Clone, Debug, PartialEq)]
pub struct ApproachSettings {
    /// How far ahead to search (minutes).
    pub horizon_minutes: f64,
    /// Spacing between evaluated instants (minutes).
    pub step_minutes: f64,
}

impl Default for ApproachSettings {
    fn default() -> Self {
        Self {
            horizon_minutes: 60.0,
            step_minutes: 1.0,
        }
    }
}

/// Minimum separation found by [`predict_closest_approach`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClosestApproach {
    pub min_distance_km: f64,
    pub time: DateTime<Utc>,
    pub position_a: GeodeticPosition,
    pub position_b: GeodeticPosition,
}

impl ClosestApproach {
    pub fn risk(&self) -> RiskLevel {
        RiskLevel::from_distance(self.min_distance_km)
    }
}

/// Discrete search for the minimum separation of two objects.
///
/// Evaluates every step from `start` to `start + horizon` inclusive. Steps
/// where either object is unresolvable are skipped. Returns `None` when no
/// step resolved both objects. Minima falling between steps can be missed.
pub fn predict_closest_approach<P: Propagator + ?Sized>(
    propagator: &P,
    a: &TrackedObject,
    b: &TrackedObject,
    start: DateTime<Utc>,
    settings: &ApproachSettings,
) -> Option<ClosestApproach> {
    let step = minutes_to_delta(settings.step_minutes).filter(|d| *d > TimeDelta::zero())?;
    if settings.horizon_minutes < 0.0 {
        return None;
    }
    let end = minutes_to_delta(settings.horizon_minutes).and_then(|d| start.checked_add_signed(d))?;

    let mut best: Option<ClosestApproach> = None;
    let mut next = Some(start);
    while let Some(time) = next.filter(|t| *t <= end) {
        next = time.checked_add_signed(step);

        let (Ok(pos_a), Ok(pos_b)) = (
            resolve_position(propagator, &a.elements, time),
            resolve_position(propagator, &b.elements, time),
        ) else {
            continue;
        };

        let distance = distance_km(&pos_a, &pos_b);
        if best.as_ref().is_none_or(|c| distance < c.min_distance_km) {
            best = Some(ClosestApproach {
                min_distance_km: distance,
                time,
                position_a: pos_a,
                position_b: pos_b,
            });
        }
    }
    best
}
