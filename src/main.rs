//! Headless demo runner
//!
//! Advances the background simulation without a renderer and logs flock
//! statistics, useful for eyeballing behavior and profiling tuning changes.
//!
//! Usage: `aviary-demo [settings.json] [seed]`

use std::env;
use std::error::Error;
use std::fs;

use aviary::{Bounds, EffectSettings, EngineState, FlightState, advance};

const DEMO_FRAMES: u32 = 600;
const REPORT_EVERY: u32 = 120;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let settings = match env::args().nth(1) {
        Some(path) => {
            let settings = EffectSettings::from_json(&fs::read_to_string(&path)?)?;
            log::info!("loaded settings from {path}");
            settings
        }
        None => EffectSettings::default(),
    };
    let seed = env::args()
        .nth(2)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(42);

    let mut engine = EngineState::new(&settings, Bounds::new(1280.0, 720.0), seed)?;
    log::info!(
        "running {DEMO_FRAMES} frames with {} birds and {} fireflies (seed {seed})",
        engine.birds.len(),
        engine.fireflies.len()
    );

    for frame in 1..=DEMO_FRAMES {
        advance(&mut engine, 1.0)?;
        if frame % REPORT_EVERY == 0 {
            let exiting = engine
                .birds
                .iter()
                .filter(|b| matches!(b.state, FlightState::Exiting { .. }))
                .count();
            let (z_min, z_max) = engine
                .birds
                .iter()
                .fold((f32::MAX, f32::MIN), |(lo, hi), b| {
                    (lo.min(b.z), hi.max(b.z))
                });
            log::info!(
                "frame {frame}: {exiting}/{} birds diving, depth span [{z_min:.1}, {z_max:.1}]",
                engine.birds.len()
            );
        }
    }

    let renderables = engine.renderables();
    println!(
        "simulated {DEMO_FRAMES} frames: {} renderables, draw order {}..{}",
        renderables.len(),
        renderables.first().map(|r| r.draw_order).unwrap_or(0),
        renderables.last().map(|r| r.draw_order).unwrap_or(0),
    );

    Ok(())
}
