//! Simulation clock driving position and proximity queries.
//!
//! Virtual time advances in discrete ticks. The tick *period* lengthens at
//! higher speed multipliers to bound recomputation cost; each tick advances
//! virtual time by `speed × period`.

use std::time::Duration;

use bevy::log::info;
use bevy::prelude::{App, Plugin, Res, ResMut, Resource, Time, Update};
use chrono::{DateTime, TimeDelta, Utc};

use crate::types::{ControlError, validate_speed};

/// Speed multipliers offered by the time controls.
pub const CLOCK_SPEED_PRESETS: [f64; 5] = [1.0, 10.0, 60.0, 600.0, 3600.0];

/// Offsets (minutes) offered by the jump buttons.
pub const JUMP_PRESETS_MINUTES: [i64; 4] = [-60, -10, 10, 60];

/// Maximum drift from wall time still shown as live.
const LIVE_TOLERANCE_MS: i64 = 2000;

/// Plugin advancing [`SimulationClock`] every frame.
pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationClock>()
            .add_systems(Update, advance_clock);
    }
}

/// Feed real frame time into the clock.
fn advance_clock(mut clock: ResMut<SimulationClock>, time: Res<Time>) {
    clock.update(time.delta());
}

/// Tick period for a speed multiplier.
pub fn tick_period(speed: f64) -> Duration {
    if speed <= 1.0 {
        Duration::from_millis(1000)
    } else if speed <= 60.0 {
        Duration::from_millis(500)
    } else {
        Duration::from_millis(250)
    }
}

/// Virtual time shared by trajectory and proximity queries.
#[derive(Resource, Clone, Debug)]
pub struct SimulationClock {
    current: DateTime<Utc>,
    speed: f64,
    playing: bool,
    /// Real time accumulated toward the next tick.
    pending: Duration,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::starting_at(Utc::now())
    }
}

impl SimulationClock {
    /// A playing clock at 1x starting at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            current: start,
            speed: 1.0,
            playing: true,
            pending: Duration::ZERO,
        }
    }

    pub fn current(&self) -> DateTime<Utc> {
        self.current
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn tick_period(&self) -> Duration {
        tick_period(self.speed)
    }

    /// Change the speed multiplier. Restarts the tick period.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), ControlError> {
        self.speed = validate_speed(speed)?;
        self.pending = Duration::ZERO;
        info!("Clock speed: {}x", self.speed);
        Ok(())
    }

    /// Resume ticking. At real-time speed this snaps back to `now` first.
    pub fn play(&mut self, now: DateTime<Utc>) {
        if self.speed == 1.0 {
            self.reset_to(now);
        }
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.pending = Duration::ZERO;
    }

    pub fn toggle_play(&mut self, now: DateTime<Utc>) {
        if self.playing {
            self.pause();
        } else {
            self.play(now);
        }
        info!("Clock {}", if self.playing { "playing" } else { "paused" });
    }

    /// Accumulate real elapsed time, firing every tick period that completed.
    ///
    /// Returns the number of ticks fired.
    pub fn update(&mut self, real_delta: Duration) -> u32 {
        if !self.playing {
            return 0;
        }

        self.pending += real_delta;
        let period = self.tick_period();
        let increment_ms = (self.speed * period.as_millis() as f64).round() as i64;
        let increment = TimeDelta::milliseconds(increment_ms);

        let mut ticks = 0;
        while self.pending >= period {
            self.pending -= period;
            self.current += increment;
            ticks += 1;
        }
        ticks
    }

    /// Move virtual time by a signed number of minutes.
    pub fn jump_minutes(&mut self, minutes: i64) {
        self.current += TimeDelta::minutes(minutes);
    }

    pub fn set_time(&mut self, time: DateTime<Utc>) {
        self.current = time;
        self.pending = Duration::ZERO;
    }

    /// Snap back to wall time.
    pub fn reset_to(&mut self, now: DateTime<Utc>) {
        self.set_time(now);
    }

    /// Tracking wall time at real-time speed.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        (self.current - now).num_milliseconds().abs() < LIVE_TOLERANCE_MS && self.speed == 1.0
    }
}
