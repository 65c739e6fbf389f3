//! Orbit arc sampling around a center instant.
//!
//! Produces the past/future ground-track arc drawn for a selected object.
//! The default window of ±45 minutes at 1-minute resolution covers roughly
//! one low-orbit period.

use chrono::{DateTime, TimeDelta, Utc};

use crate::propagation::{Propagator, resolve_position};
use crate::types::{GeodeticPosition, TrackedObject, minutes_to_delta};

/// Configuration for trajectory sampling.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleWindow {
    /// Minutes sampled before the center instant.
    pub minutes_before: f64,
    /// Minutes sampled after the center instant.
    pub minutes_after: f64,
    /// Spacing between samples (minutes).
    pub step_minutes: f64,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self {
            minutes_before: 45.0,
            minutes_after: 45.0,
            step_minutes: 1.0,
        }
    }
}

/// A single point on a sampled orbit arc.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitSample {
    pub position: GeodeticPosition,
    pub time: DateTime<Utc>,
    /// Strictly before the sampler's center instant.
    pub is_past: bool,
}

/// Sample an object's positions across `window` around `center`.
///
/// One sample per step from `center - minutes_before` to
/// `center + minutes_after`, both ends inclusive when they land on a step.
/// Unresolvable instants are skipped, never padded. Output is time-ascending.
pub fn sample_orbit<P: Propagator + ?Sized>(
    propagator: &P,
    object: &TrackedObject,
    center: DateTime<Utc>,
    window: &SampleWindow,
) -> Vec<OrbitSample> {
    let Some(step) = minutes_to_delta(window.step_minutes).filter(|d| *d > TimeDelta::zero()) else {
        return Vec::new();
    };
    if window.minutes_before < 0.0 || window.minutes_after < 0.0 {
        return Vec::new();
    }
    // Windows that leave the representable calendar yield nothing
    let bounds = minutes_to_delta(window.minutes_before)
        .and_then(|d| center.checked_sub_signed(d))
        .zip(minutes_to_delta(window.minutes_after).and_then(|d| center.checked_add_signed(d)));
    let Some((start, end)) = bounds else {
        return Vec::new();
    };

    let mut samples = Vec::new();
    let mut next = Some(start);
    while let Some(time) = next.filter(|t| *t <= end) {
        if let Ok(position) = resolve_position(propagator, &object.elements, time) {
            samples.push(OrbitSample {
                position,
                time,
                is_past: time < center,
            });
        }
        next = time.checked_add_signed(step);
    }
    samples
}

/// A sampled arc split into the segments already flown and still to come.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrbitArc {
    pub past: Vec<OrbitSample>,
    pub future: Vec<OrbitSample>,
}

impl OrbitArc {
    pub fn split(samples: Vec<OrbitSample>) -> Self {
        let (past, future) = samples.into_iter().partition(|s| s.is_past);
        Self { past, future }
    }

    pub fn len(&self) -> usize {
        self.past.len() + self.future.len()
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty() && self.future.is_empty()
    }
}

/// Sample with [`SampleWindow::default`] and split into past and future.
pub fn orbit_arc<P: Propagator + ?Sized>(
    propagator: &P,
    object: &TrackedObject,
    center: DateTime<Utc>,
) -> OrbitArc {
    OrbitArc::split(sample_orbit(propagator, object, center, &SampleWindow::default()))
}
