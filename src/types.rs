//! Core types and constants shared by the position, proximity and cascade modules.

use std::fmt;

use chrono::TimeDelta;

/// Mean Earth radius used by the spherical distance approximation (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS-84 equatorial radius (km).
pub const WGS84_A_KM: f64 = 6378.137;

/// WGS-84 polar radius (km).
pub const WGS84_B_KM: f64 = 6356.752_314_2;

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees conversion factor
pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

/// Altitude boundary between LEO and MEO (km).
pub const LEO_CEILING_KM: f64 = 2000.0;

/// Geostationary band (km). Altitudes inside this range classify as GEO.
pub const GEO_BAND_KM: (f64, f64) = (35786.0, 35800.0);

/// Rejected control input.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("invalid speed multiplier {0} (must be finite and positive)")]
    InvalidSpeed(f64),
}

/// Validate a speed multiplier, returning it unchanged when usable.
pub fn validate_speed(multiplier: f64) -> Result<f64, ControlError> {
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(multiplier)
    } else {
        Err(ControlError::InvalidSpeed(multiplier))
    }
}

/// Two-line element pair for one tracked object.
///
/// Opaque to everything except the propagator. Empty lines are allowed here
/// and rejected at resolution time so one bad catalog entry never aborts a batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrbitalElements {
    line1: String,
    line2: String,
}

impl OrbitalElements {
    pub fn new(line1: impl Into<String>, line2: impl Into<String>) -> Self {
        Self {
            line1: line1.into(),
            line2: line2.into(),
        }
    }

    pub fn line1(&self) -> &str {
        &self.line1
    }

    pub fn line2(&self) -> &str {
        &self.line2
    }

    /// Both lines carry content.
    pub fn is_present(&self) -> bool {
        !self.line1.trim().is_empty() && !self.line2.trim().is_empty()
    }
}

/// Catalog grouping a tracked object was fetched under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    Korea,
    Starlink,
    Stations,
    Active,
    Cosmos2251Debris,
    Iridium33Debris,
    Fengyun1cDebris,
}

impl ObjectCategory {
    pub const ALL: [ObjectCategory; 7] = [
        ObjectCategory::Korea,
        ObjectCategory::Starlink,
        ObjectCategory::Stations,
        ObjectCategory::Active,
        ObjectCategory::Cosmos2251Debris,
        ObjectCategory::Iridium33Debris,
        ObjectCategory::Fengyun1cDebris,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Korea => "Korean Satellites",
            Self::Starlink => "Starlink",
            Self::Stations => "Space Stations (ISS/CSS)",
            Self::Active => "Active Satellites",
            Self::Cosmos2251Debris => "Debris (Cosmos 2251)",
            Self::Iridium33Debris => "Debris (Iridium 33)",
            Self::Fengyun1cDebris => "Debris (Fengyun 1C)",
        }
    }

    /// CelesTrak group the category is served from.
    ///
    /// Korean satellites have no group of their own; they are filtered out of `active`.
    pub fn celestrak_group(&self) -> &'static str {
        match self {
            Self::Korea | Self::Active => "active",
            Self::Starlink => "starlink",
            Self::Stations => "stations",
            Self::Cosmos2251Debris => "cosmos-2251-debris",
            Self::Iridium33Debris => "iridium-33-debris",
            Self::Fengyun1cDebris => "fengyun-1c-debris",
        }
    }

    pub fn is_debris(&self) -> bool {
        matches!(
            self,
            Self::Cosmos2251Debris | Self::Iridium33Debris | Self::Fengyun1cDebris
        )
    }
}

/// One object from the catalog. Immutable for the process lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedObject {
    /// NORAD catalog number
    pub id: u32,
    pub name: String,
    pub category: ObjectCategory,
    pub elements: OrbitalElements,
}

impl TrackedObject {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        category: ObjectCategory,
        elements: OrbitalElements,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            elements,
        }
    }
}

/// Latitude/longitude/altitude of an object at one instant.
///
/// Derived on demand; never cached across time changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeodeticPosition {
    /// Degrees, [-90, 90]
    pub latitude: f64,
    /// Degrees, [-180, 180]
    pub longitude: f64,
    /// Kilometers above the ellipsoid, >= 0
    pub altitude_km: f64,
    /// Inertial speed in km/s, if the propagator reported a usable velocity
    pub speed_km_s: Option<f64>,
}

impl GeodeticPosition {
    pub fn new(latitude: f64, longitude: f64, altitude_km: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude_km,
            speed_km_s: None,
        }
    }

    pub fn with_speed(mut self, speed_km_s: f64) -> Self {
        self.speed_km_s = speed_km_s.is_finite().then_some(speed_km_s);
        self
    }

    pub fn orbit_class(&self) -> OrbitClass {
        OrbitClass::from_altitude(self.altitude_km)
    }
}

/// Coarse orbit regime derived from altitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrbitClass {
    Leo,
    Meo,
    Geo,
    Heo,
}

impl OrbitClass {
    pub const ALL: [OrbitClass; 4] = [
        OrbitClass::Leo,
        OrbitClass::Meo,
        OrbitClass::Geo,
        OrbitClass::Heo,
    ];

    pub fn from_altitude(altitude_km: f64) -> Self {
        if altitude_km < LEO_CEILING_KM {
            OrbitClass::Leo
        } else if altitude_km < GEO_BAND_KM.0 {
            OrbitClass::Meo
        } else if altitude_km <= GEO_BAND_KM.1 {
            OrbitClass::Geo
        } else {
            OrbitClass::Heo
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrbitClass::Leo => "LEO (Low Earth Orbit)",
            OrbitClass::Meo => "MEO (Medium Earth Orbit)",
            OrbitClass::Geo => "GEO (Geostationary)",
            OrbitClass::Heo => "HEO (High Earth Orbit)",
        }
    }
}

impl fmt::Display for OrbitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            OrbitClass::Leo => "LEO",
            OrbitClass::Meo => "MEO",
            OrbitClass::Geo => "GEO",
            OrbitClass::Heo => "HEO",
        };
        f.write_str(id)
    }
}

/// Format an altitude for display: metres below 1 km, otherwise km with one decimal.
pub fn format_altitude(altitude_km: f64) -> String {
    if altitude_km < 1.0 {
        format!("{:.0} m", altitude_km * 1000.0)
    } else {
        format!("{:.1} km", altitude_km)
    }
}

/// Convert fractional minutes into whole milliseconds.
///
/// `None` for non-finite input or spans chrono cannot represent.
pub fn minutes_to_delta(minutes: f64) -> Option<TimeDelta> {
    let ms = (minutes * 60_000.0).round();
    if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(ms as i64)
}

/// Wrap a longitude in degrees into [-180, 180).
pub fn wrap_longitude(longitude: f64) -> f64 {
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to the modulus for tiny negative inputs
    if wrapped >= 180.0 { -180.0 } else { wrapped }
}
