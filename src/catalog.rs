//! Catalog ingestion and visibility filtering.
//!
//! Parses CelesTrak-style three-line element text into [`TrackedObject`]s
//! and selects which objects are shown at an instant. Fetching the text is
//! the caller's concern.

use std::collections::HashSet;

use bevy::log::debug;
use chrono::{DateTime, Utc};

use crate::propagation::{Propagator, resolve_position};
use crate::types::{GeodeticPosition, ObjectCategory, OrbitClass, OrbitalElements, TrackedObject};

/// Name fragments identifying Korean satellites inside the `active` group.
pub const KOREA_NAME_PATTERNS: [&str; 9] = [
    "ARIRANG",
    "KOMPSAT",
    "KOREASAT",
    "COMS",
    "GEO-KOMPSAT",
    "MUGUNGWHA",
    "NEXTSAT",
    "KITSAT",
    "STSAT",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("invalid element set: {0}")]
    InvalidElements(#[from] sgp4::TleError),

    #[error("element set cannot be propagated: {0}")]
    UnusableElements(String),

    #[error("catalog number {0} out of range")]
    CatalogNumberOutOfRange(u64),

    #[error("no valid element sets found")]
    NoValidEntries,
}

/// Parse and validate one name/line 1/line 2 group.
///
/// The lines must form a complete element set (length, field layout and
/// checksums) from which SGP4 constants can be built.
pub fn parse_entry(
    name: &str,
    line1: &str,
    line2: &str,
    category: ObjectCategory,
) -> Result<TrackedObject, CatalogError> {
    let name = name.trim();
    let line1 = line1.trim();
    let line2 = line2.trim();

    let elements =
        sgp4::Elements::from_tle(Some(name.to_string()), line1.as_bytes(), line2.as_bytes())?;
    sgp4::Constants::from_elements(&elements)
        .map_err(|e| CatalogError::UnusableElements(e.to_string()))?;
    let id = u32::try_from(elements.norad_id)
        .map_err(|_| CatalogError::CatalogNumberOutOfRange(elements.norad_id))?;

    Ok(TrackedObject::new(
        id,
        name,
        category,
        OrbitalElements::new(line1, line2),
    ))
}

/// Parse three-line element text, skipping malformed groups.
///
/// Groups are read three lines at a time; a trailing partial group is ignored.
pub fn parse_catalog(
    text: &str,
    category: ObjectCategory,
) -> Result<Vec<TrackedObject>, CatalogError> {
    let lines: Vec<&str> = text.trim().lines().collect();
    let mut objects = Vec::new();

    for group in lines.chunks_exact(3) {
        match parse_entry(group[0], group[1], group[2], category) {
            Ok(object) => objects.push(object),
            Err(e) => debug!("Skipping catalog entry {:?}: {}", group[0].trim(), e),
        }
    }

    if objects.is_empty() {
        Err(CatalogError::NoValidEntries)
    } else {
        Ok(objects)
    }
}

/// Whether a satellite name belongs to a Korean program.
pub fn is_korean_satellite(name: &str) -> bool {
    let upper = name.to_uppercase();
    KOREA_NAME_PATTERNS.iter().any(|p| upper.contains(p))
}

/// Derive the Korea category from an `active` catalog.
pub fn korean_subset(active: &[TrackedObject]) -> Vec<TrackedObject> {
    active
        .iter()
        .filter(|o| is_korean_satellite(&o.name))
        .map(|o| TrackedObject {
            category: ObjectCategory::Korea,
            ..o.clone()
        })
        .collect()
}

/// Which categories and orbit regimes are shown.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityFilter {
    pub categories: HashSet<ObjectCategory>,
    pub orbit_classes: HashSet<OrbitClass>,
}

/// Korean satellites only, in every orbit regime.
impl Default for VisibilityFilter {
    fn default() -> Self {
        Self {
            categories: HashSet::from([ObjectCategory::Korea]),
            orbit_classes: OrbitClass::ALL.into_iter().collect(),
        }
    }
}

impl VisibilityFilter {
    /// Every category and orbit regime shown.
    pub fn all() -> Self {
        Self {
            categories: ObjectCategory::ALL.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn toggle_category(&mut self, category: ObjectCategory) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
    }

    pub fn toggle_orbit_class(&mut self, class: OrbitClass) {
        if !self.orbit_classes.remove(&class) {
            self.orbit_classes.insert(class);
        }
    }
}

/// An object shown at an instant together with its position there.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleObject<'a> {
    pub object: &'a TrackedObject,
    pub position: GeodeticPosition,
}

/// Resolve and filter a catalog at `instant`.
///
/// Objects in a hidden category are not propagated at all; unresolvable
/// objects and objects in a hidden orbit regime are omitted.
pub fn visible_objects<'a, P: Propagator + ?Sized>(
    propagator: &P,
    objects: &'a [TrackedObject],
    filter: &VisibilityFilter,
    instant: DateTime<Utc>,
) -> Vec<VisibleObject<'a>> {
    objects
        .iter()
        .filter(|o| filter.categories.contains(&o.category))
        .filter_map(|object| {
            let position = resolve_position(propagator, &object.elements, instant).ok()?;
            filter
                .orbit_classes
                .contains(&position.orbit_class())
                .then_some(VisibleObject { object, position })
        })
        .collect()
}
