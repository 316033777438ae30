//! Pool creation and recycle distributions
//!
//! Every random draw flows through the engine's single Pcg32 so a run is
//! reproducible from its seed. Recycle paths re-use the same helpers as
//! initial spawning, keeping the distributions identical either way a bird
//! enters the scene.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use std::f32::consts::PI;

use super::state::{Bird, Bounds, Firefly, FlightState};
use crate::consts::*;

/// Sample a fresh bird anywhere in the viewport at a random depth
pub fn spawn_bird(rng: &mut Pcg32, bounds: Bounds) -> Bird {
    let pos_x = rng.random::<f32>() * bounds.width;
    let drift_anchor = rng.random::<f32>() * bounds.height;
    let vx = roll_vx(rng);
    let drift_speed = roll_drift_speed(rng);
    let amplitude = rng.random::<f32>() * 15.0 + 10.0;
    let frequency = rng.random::<f32>() * 0.04 + 0.03;
    let phase_time = rng.random::<f32>() * 100.0;
    let z = rng.random::<f32>() * Z_FAR_PLANE;
    let vz = roll_depth_sign(rng) * (0.1 + rng.random::<f32>() * 0.3);
    let base_scale = 0.3 + rng.random::<f32>() * 0.5;

    let mut bird = Bird {
        pos: Vec2::new(pos_x, drift_anchor),
        drift_anchor,
        vx,
        drift_speed,
        amplitude,
        frequency,
        phase_time,
        z,
        vz,
        base_scale,
        scale: base_scale,
        alpha: 1.0,
        rotation: facing(vx),
        state: FlightState::Flying,
    };
    bird.apply_projection();
    bird
}

/// Re-synthesize a bird far from the viewer after its exit dive completes.
///
/// Everything re-rolls exactly as at spawn except depth, which pins to the
/// far re-entry point with an inward drift.
pub fn respawn_far(bird: &mut Bird, rng: &mut Pcg32, bounds: Bounds) {
    bird.state = FlightState::Flying;
    bird.z = Z_REAPPEAR_FAR;
    bird.vz = -(0.1 + rng.random::<f32>() * 0.2);
    bird.pos.x = rng.random::<f32>() * bounds.width;
    bird.drift_anchor = rng.random::<f32>() * bounds.height;
    bird.pos.y = bird.drift_anchor;
    bird.phase_time = rng.random::<f32>() * 100.0;
    bird.vx = roll_vx(rng);
    bird.rotation = facing(bird.vx);
    bird.drift_speed = roll_drift_speed(rng);
    bird.apply_projection();
}

/// Wrap a bird that receded past the far plane back to the near side.
///
/// No dive here: fading out in the distance is not jarring, so the bird is
/// repositioned instantly and keeps receding.
pub fn recycle_near(bird: &mut Bird, rng: &mut Pcg32, bounds: Bounds) {
    bird.z = Z_REAPPEAR_NEAR;
    bird.vz = 0.1 + rng.random::<f32>() * 0.2;
    bird.pos.x = rng.random::<f32>() * bounds.width;
    bird.drift_anchor = rng.random::<f32>() * bounds.height;
    bird.pos.y = bird.drift_anchor;
    bird.apply_projection();
}

/// Sample a firefly; drift patterns are dealt round-robin by pool index
pub fn spawn_firefly(rng: &mut Pcg32, index: usize) -> Firefly {
    Firefly {
        anchor: Vec2::new(rng.random::<f32>(), rng.random::<f32>()),
        size: rng.random::<f32>() * 4.0 + 3.0,
        base_alpha: rng.random::<f32>() * 0.2 + 0.1,
        move_period: (15.0 + rng.random::<f32>() * 10.0) * FRAMES_PER_SECOND,
        blink_period: (2.0 + rng.random::<f32>() * 2.0) * FRAMES_PER_SECOND,
        move_delay: rng.random::<f32>() * 5.0 * FRAMES_PER_SECOND,
        blink_delay: rng.random::<f32>() * 3.0 * FRAMES_PER_SECOND,
        pattern: (index % FIREFLY_PATTERNS) as u8 + 1,
        phase_time: 0.0,
    }
}

/// Horizontal speed from a signed range biased away from zero, so no bird
/// hovers in place
fn roll_vx(rng: &mut Pcg32) -> f32 {
    let magnitude = (rng.random::<f32>() - 0.5) * 2.5;
    let bias = if rng.random::<f32>() < 0.5 { -0.5 } else { 0.5 };
    magnitude + bias
}

fn roll_drift_speed(rng: &mut Pcg32) -> f32 {
    (rng.random::<f32>() - 0.5) * 0.8
}

fn roll_depth_sign(rng: &mut Pcg32) -> f32 {
    if rng.random::<f32>() > 0.5 { 1.0 } else { -1.0 }
}

/// Facing snaps to the horizontal: right is 0, left is pi
pub(crate) fn facing(vx: f32) -> f32 {
    if vx > 0.0 { 0.0 } else { PI }
}
