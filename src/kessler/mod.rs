//! Kessler syndrome cascade simulator.
//!
//! A stochastic, visual model of runaway debris growth: a seeded population
//! drifts around the globe, close pairs shatter into new fragments, and the
//! run terminates once the population passes a ceiling. Independent of the
//! real catalog.

pub mod collision;
pub mod fragments;
pub mod scheduler;

#[cfg(test)]
mod proptest_kessler;

use std::collections::VecDeque;

use bevy::log::{debug, info, warn};
use bevy::prelude::{App, Deref, DerefMut, Plugin, Res, ResMut, Resource, Time, Update};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use collision::{COLLISION_RADIUS_KM, CollisionEvent, find_collision};
pub use fragments::{
    AltitudeBand, DebrisFragment, default_bands, generate_fragments, seed_population,
};
pub use scheduler::{CascadeRunner, FrameScheduler, IntervalScheduler, TickHandle, TickScheduler};

use crate::types::{ControlError, validate_speed};

/// Speed multipliers offered by the cascade controls.
pub const SPEED_PRESETS: [f64; 4] = [1.0, 2.0, 5.0, 10.0];

/// Population above which the severity reads elevated.
pub const ELEVATED_POPULATION: usize = 100;
/// Population above which the severity reads critical.
pub const CRITICAL_POPULATION: usize = 200;
/// Population above which a runaway warning is shown.
pub const RUNAWAY_WARNING_POPULATION: usize = 150;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CascadeState {
    #[default]
    Idle,
    Running,
    Paused,
    Terminated,
}

/// Tunables for a cascade run.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct CascadeConfig {
    /// Run terminates once the population exceeds this.
    pub population_ceiling: usize,
    pub collision_radius_km: f64,
    /// Per-tick detection probability at 1x, scaled by speed and capped at 1.
    pub detection_chance: f64,
    /// Simulated years per simulated time unit.
    pub years_per_unit: f64,
    /// Length of the recent-collision log.
    pub recent_collision_limit: usize,
    /// Age after which a fragment stops counting as recently created.
    pub recent_age: f64,
    pub bands: Vec<AltitudeBand>,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            population_ceiling: 500,
            collision_radius_km: COLLISION_RADIUS_KM,
            detection_chance: 0.02,
            years_per_unit: 0.1,
            recent_collision_limit: 5,
            recent_age: 2.0,
            bands: default_bands(),
        }
    }
}

/// Population size recorded at an integer simulated year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PopulationSample {
    pub year: u32,
    pub count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PopulationSeverity {
    Nominal,
    Elevated,
    Critical,
}

impl PopulationSeverity {
    pub fn from_count(count: usize) -> Self {
        if count > CRITICAL_POPULATION {
            Self::Critical
        } else if count > ELEVATED_POPULATION {
            Self::Elevated
        } else {
            Self::Nominal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Nominal => "Nominal",
            Self::Elevated => "Elevated",
            Self::Critical => "Critical",
        }
    }
}

/// Read-only view of a run for display.
#[derive(Clone, Debug, PartialEq)]
pub struct CascadeSnapshot {
    pub state: CascadeState,
    pub population: usize,
    pub collisions: u32,
    pub elapsed_years: f64,
    pub speed: f64,
    pub severity: PopulationSeverity,
    pub approaching_runaway: bool,
    pub history: Vec<PopulationSample>,
    pub recent_collisions: Vec<CollisionEvent>,
}

/// The cascade simulator.
///
/// Generic over its random source so runs can be replayed from a seed.
pub struct DebrisCascade<R: Rng = StdRng> {
    config: CascadeConfig,
    state: CascadeState,
    population: Vec<DebrisFragment>,
    next_id: u64,
    collisions: u32,
    elapsed_years: f64,
    history: Vec<PopulationSample>,
    recent_collisions: VecDeque<CollisionEvent>,
    speed: f64,
    /// Timestamp of the last tick or resume, seconds.
    last_tick: Option<f64>,
    rng: R,
}

impl DebrisCascade<StdRng> {
    pub fn new(config: CascadeConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: CascadeConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DebrisCascade<R> {
    /// An idle cascade with an empty population.
    pub fn with_rng(config: CascadeConfig, rng: R) -> Self {
        Self {
            config,
            state: CascadeState::Idle,
            population: Vec::new(),
            next_id: 0,
            collisions: 0,
            elapsed_years: 0.0,
            history: Vec::new(),
            recent_collisions: VecDeque::new(),
            speed: 1.0,
            last_tick: None,
            rng,
        }
    }

    /// A running cascade over a caller-supplied population.
    ///
    /// The first tick establishes the time baseline.
    pub fn from_population(config: CascadeConfig, population: Vec<DebrisFragment>, rng: R) -> Self {
        let mut cascade = Self::with_rng(config, rng);
        cascade.next_id = population.iter().map(|f| f.id + 1).max().unwrap_or(0);
        cascade.history.push(PopulationSample {
            year: 0,
            count: population.len(),
        });
        cascade.population = population;
        cascade.state = CascadeState::Running;
        cascade
    }

    pub fn state(&self) -> CascadeState {
        self.state
    }

    pub fn population(&self) -> &[DebrisFragment] {
        &self.population
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    pub fn elapsed_years(&self) -> f64 {
        self.elapsed_years
    }

    pub fn history(&self) -> &[PopulationSample] {
        &self.history
    }

    /// Newest first.
    pub fn recent_collisions(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.recent_collisions.iter()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub fn severity(&self) -> PopulationSeverity {
        PopulationSeverity::from_count(self.population.len())
    }

    pub fn approaching_runaway(&self) -> bool {
        self.population.len() > RUNAWAY_WARNING_POPULATION
    }

    /// Seed and run. Only an idle cascade starts; otherwise a no-op.
    pub fn start(&mut self, now: f64) -> bool {
        if self.state != CascadeState::Idle {
            debug!("Ignoring start in state {:?}", self.state);
            return false;
        }
        self.reinitialize(now);
        true
    }

    /// Re-seed from scratch and run, from any state.
    pub fn restart(&mut self, now: f64) {
        self.reinitialize(now);
    }

    pub fn pause(&mut self) -> bool {
        if self.state != CascadeState::Running {
            return false;
        }
        self.state = CascadeState::Paused;
        info!("Cascade paused at year {:.1}", self.elapsed_years);
        true
    }

    /// Continue a paused run. The paused interval is not simulated.
    pub fn resume(&mut self, now: f64) -> bool {
        if self.state != CascadeState::Paused {
            return false;
        }
        self.state = CascadeState::Running;
        self.last_tick = Some(now);
        info!("Cascade resumed at year {:.1}", self.elapsed_years);
        true
    }

    /// Takes effect on the next tick.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), ControlError> {
        self.speed = validate_speed(speed)?;
        info!("Cascade speed: {}x", self.speed);
        Ok(())
    }

    /// Advance by the real time since the previous tick, scaled by speed.
    pub fn tick(&mut self, now: f64) -> Option<CollisionEvent> {
        if self.state != CascadeState::Running {
            return None;
        }
        let delta = self
            .last_tick
            .map_or(0.0, |last| ((now - last) * self.speed).max(0.0));
        self.last_tick = Some(now);
        self.advance(delta)
    }

    /// Advance the running cascade by `dt` simulated time units.
    pub fn advance(&mut self, dt: f64) -> Option<CollisionEvent> {
        if self.state != CascadeState::Running {
            return None;
        }

        let recent_age = self.config.recent_age;
        for fragment in &mut self.population {
            fragment.advance(dt, recent_age);
        }

        let chance = (self.config.detection_chance * self.speed).clamp(0.0, 1.0);
        let event = if self.rng.gen_bool(chance) {
            self.detect_and_resolve()
        } else {
            None
        };

        let year_before = self.elapsed_years.floor();
        self.elapsed_years += dt * self.config.years_per_unit;
        let year_after = self.elapsed_years.floor();
        if year_after > year_before {
            self.history.push(PopulationSample {
                year: year_after as u32,
                count: self.population.len(),
            });
        }

        if self.population.len() > self.config.population_ceiling {
            self.state = CascadeState::Terminated;
            warn!(
                "Cascade runaway: {} fragments after {:.1} years, {} collisions",
                self.population.len(),
                self.elapsed_years,
                self.collisions
            );
        }

        event
    }

    /// Resolve the first colliding pair, if any.
    ///
    /// Both fragments are removed and replaced by 3-8 new ones with fresh ids.
    pub fn detect_and_resolve(&mut self) -> Option<CollisionEvent> {
        let (i, j) = find_collision(&self.population, self.config.collision_radius_km)?;

        let spawned = generate_fragments(
            &mut self.rng,
            (&self.population[i], &self.population[j]),
            self.next_id,
        );
        self.next_id += spawned.len() as u64;

        // j > i, so removing j first leaves i in place
        let second = self.population.remove(j);
        let first = self.population.remove(i);

        let event = CollisionEvent {
            simulated_year: self.elapsed_years,
            first_origin: first.origin,
            second_origin: second.origin,
            fragments_created: spawned.len(),
        };
        self.population.extend(spawned);
        self.collisions += 1;

        self.recent_collisions.push_front(event.clone());
        self.recent_collisions
            .truncate(self.config.recent_collision_limit);

        debug!(
            "Collision at year {:.2}: {} x {} -> {} fragments",
            event.simulated_year, event.first_origin, event.second_origin, event.fragments_created
        );
        Some(event)
    }

    pub fn snapshot(&self) -> CascadeSnapshot {
        CascadeSnapshot {
            state: self.state,
            population: self.population.len(),
            collisions: self.collisions,
            elapsed_years: self.elapsed_years,
            speed: self.speed,
            severity: self.severity(),
            approaching_runaway: self.approaching_runaway(),
            history: self.history.clone(),
            recent_collisions: self.recent_collisions.iter().cloned().collect(),
        }
    }

    fn reinitialize(&mut self, now: f64) {
        self.population = seed_population(&mut self.rng, &self.config.bands, 0);
        self.next_id = self.population.len() as u64;
        self.collisions = 0;
        self.elapsed_years = 0.0;
        self.history = vec![PopulationSample {
            year: 0,
            count: self.population.len(),
        }];
        self.recent_collisions.clear();
        self.last_tick = Some(now);
        self.state = CascadeState::Running;
        info!("Cascade started with {} fragments", self.population.len());
    }
}

/// Plugin driving a [`KesslerSimulation`] from frame time.
///
/// Uses an existing [`CascadeConfig`] resource if one was inserted first.
/// The simulator keeps its own copy, so later edits to that resource have
/// no effect.
pub struct KesslerPlugin;

impl Plugin for KesslerPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<CascadeConfig>()
            .cloned()
            .unwrap_or_default();
        app.insert_resource(KesslerSimulation::new(config))
            .add_systems(Update, drive_cascade);
    }
}

/// The cascade run owned by the app.
#[derive(Resource, Deref, DerefMut)]
pub struct KesslerSimulation(pub CascadeRunner<FrameScheduler>);

impl KesslerSimulation {
    pub fn new(config: CascadeConfig) -> Self {
        Self(CascadeRunner::new(DebrisCascade::new(config), FrameScheduler::default()))
    }

    pub fn with_seed(config: CascadeConfig, seed: u64) -> Self {
        Self(CascadeRunner::new(
            DebrisCascade::with_seed(config, seed),
            FrameScheduler::default(),
        ))
    }
}

fn drive_cascade(mut sim: ResMut<KesslerSimulation>, time: Res<Time>) {
    sim.frame(time.elapsed_secs_f64());
}

#[cfg(test)]
pub(crate) fn test_fragment(id: u64, lat: f64, lng: f64, alt_km: f64) -> DebrisFragment {
    DebrisFragment {
        id,
        lat,
        lng,
        alt_km,
        size_m: 1.0,
        velocity_km_s: 7.5,
        origin: format!("Test {id}"),
        age: 0.0,
        recently_created: false,
    }
}

/// Fragments on a coarse grid, far apart from each other.
#[cfg(test)]
pub(crate) fn spread_population(count: usize) -> Vec<DebrisFragment> {
    (0..count)
        .map(|i| {
            let row = (i / 30) as f64;
            let col = (i % 30) as f64;
            test_fragment(i as u64, -80.0 + row * 9.0, -180.0 + col * 12.0, 500.0)
        })
        .collect()
}
