//! Kessler Core - headless cascade demo
//!
//! Runs the debris cascade at 10x without a window, logging the population
//! once per simulated year until the run terminates or the wall-clock cap
//! is reached.

use std::time::{Duration, Instant};

use bevy::log::LogPlugin;
use bevy::prelude::*;

use kessler_core::clock::ClockPlugin;
use kessler_core::kessler::{CascadeState, KesslerPlugin, KesslerSimulation};

/// Demo speed multiplier.
const DEMO_SPEED: f64 = 10.0;
/// Wall-clock cap on the demo run.
const MAX_RUN: Duration = Duration::from_secs(120);
/// Sleep between frames.
const FRAME: Duration = Duration::from_millis(16);

fn main() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()))
        .add_plugins((ClockPlugin, KesslerPlugin));

    // One update so Time has a baseline before the run starts
    app.update();
    let now = app.world().resource::<Time>().elapsed_secs_f64();
    {
        let mut sim = app.world_mut().resource_mut::<KesslerSimulation>();
        if let Err(e) = sim.set_speed(DEMO_SPEED) {
            error!("Could not set demo speed: {}", e);
            return;
        }
        sim.start(now);
    }

    let started = Instant::now();
    let mut logged_years = 0;
    loop {
        app.update();
        std::thread::sleep(FRAME);

        let snap = app.world().resource::<KesslerSimulation>().cascade().snapshot();
        if snap.history.len() > logged_years {
            for sample in &snap.history[logged_years..] {
                info!(
                    "Year {:>3}: {} fragments ({}), {} collisions",
                    sample.year,
                    sample.count,
                    snap.severity.label(),
                    snap.collisions
                );
            }
            logged_years = snap.history.len();
        }

        if snap.state == CascadeState::Terminated {
            warn!(
                "Runaway cascade after {:.1} simulated years: {} fragments",
                snap.elapsed_years, snap.population
            );
            break;
        }
        if started.elapsed() >= MAX_RUN {
            info!(
                "Stopping after {:?}: {} fragments at year {:.1}",
                MAX_RUN, snap.population, snap.elapsed_years
            );
            break;
        }
    }

    app.world_mut().resource_mut::<KesslerSimulation>().close();
}
