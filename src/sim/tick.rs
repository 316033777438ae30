//! Per-frame simulation step
//!
//! Advances every particle by one frame-relative time step. Delta time comes
//! from the host's frame clock and is resolution-independent: a large delta
//! simply moves particles farther in one call, with the clamps and wrap rules
//! absorbing the overshoot.

use rand::Rng;
use rand_pcg::Pcg32;
use std::f32::consts::{FRAC_PI_8, PI};

use super::spawn;
use super::state::{Bird, Bounds, EngineState, FlightState};
use crate::consts::*;
use crate::ease_out_quad;
use crate::error::EngineError;

/// Advance the whole pool by one time step.
///
/// Called once per rendered frame, never concurrently. Time must not run
/// backward; a zero delta is a legal no-op frame.
pub fn advance(state: &mut EngineState, dt: f32) -> Result<(), EngineError> {
    if !dt.is_finite() || dt < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "delta time must be finite and non-negative, got {dt}"
        )));
    }

    state.frame += 1;
    let bounds = state.bounds;
    let reduced_motion = state.settings.reduced_motion;

    {
        let EngineState { birds, rng, .. } = state;
        for bird in birds.iter_mut() {
            bird.phase_time += dt;
            match bird.state {
                FlightState::Flying => update_flying(bird, rng, bounds, reduced_motion, dt),
                FlightState::Exiting { .. } => update_exiting(bird, rng, bounds, dt),
            }
        }
    }

    for fly in &mut state.fireflies {
        fly.phase_time += dt;
    }

    // Periodic firefly reshuffle, on simulated time rather than wall clock
    state.firefly_timer += dt;
    if state.firefly_timer >= FIREFLY_REGEN_INTERVAL {
        state.firefly_timer = 0.0;
        state.regenerate_fireflies();
    }

    Ok(())
}

/// Steady-state cruising: depth drift, perspective projection, bobbing,
/// screen wrap, and the two depth-overshoot transitions.
fn update_flying(
    bird: &mut Bird,
    rng: &mut Pcg32,
    bounds: Bounds,
    reduced_motion: bool,
    dt: f32,
) {
    bird.z += bird.vz * dt;
    bird.apply_projection();

    // Apparent-size speedup keeps angular speed roughly constant under the
    // projection: birds that look closer cross the screen faster.
    let speed_factor = bird.scale / bird.base_scale;
    bird.pos.x += bird.vx * speed_factor * dt;
    bird.drift_anchor += bird.drift_speed * speed_factor * dt;

    let bob = (bird.phase_time * bird.frequency).sin() * bird.amplitude;
    bird.pos.y = bird.drift_anchor + bob;
    bird.rotation = spawn::facing(bird.vx);

    let sw = bird.scaled_width();
    let sh = bird.scaled_height();
    if bird.pos.x > bounds.width + sw {
        bird.pos.x = -sw;
        bird.drift_anchor = rng.random::<f32>() * bounds.height;
    } else if bird.pos.x < -sw {
        bird.pos.x = bounds.width + sw;
        bird.drift_anchor = rng.random::<f32>() * bounds.height;
    }
    if bird.pos.y > bounds.height + sh {
        bird.pos.y = -sh;
        // Re-derive the anchor so the sinusoid stays continuous at the new edge
        bird.drift_anchor = -sh - bob;
        bird.pos.x = rng.random::<f32>() * bounds.width;
    } else if bird.pos.y < -sh {
        bird.pos.y = bounds.height + sh;
        bird.drift_anchor = bounds.height + sh - bob;
        bird.pos.x = rng.random::<f32>() * bounds.width;
    }

    if bird.vz < 0.0 && bird.z < Z_NEAR_RESET_THRESHOLD {
        // Too close to the camera: animate off-screen instead of popping.
        // Receding birds get no such treatment (the far branch below).
        if reduced_motion {
            spawn::respawn_far(bird, rng, bounds);
        } else {
            let speed_y =
                bounds.height / 250.0 + rng.random::<f32>() * (bounds.height / 300.0);
            bird.state = FlightState::Exiting {
                progress: 0.0,
                speed_x: bird.vx * 0.3,
                speed_y,
            };
            bird.vz = -0.01;
        }
    } else if bird.vz > 0.0 && bird.z > Z_FAR_PLANE {
        spawn::recycle_near(bird, rng, bounds);
    }
}

/// Exit dive: rush up and past the viewer, peel away, fade, then respawn far
fn update_exiting(bird: &mut Bird, rng: &mut Pcg32, bounds: Bounds, dt: f32) {
    let FlightState::Exiting {
        progress,
        speed_x,
        speed_y,
    } = bird.state
    else {
        return;
    };

    let progress = (progress + dt / EXIT_DURATION_FRAMES).min(1.0);
    let eased = ease_out_quad(progress);

    bird.pos.y -= speed_y * eased * dt;
    bird.pos.x += speed_x * (1.0 - eased) * dt;

    let target = if bird.vx > 0.0 {
        -FRAC_PI_8
    } else {
        PI + FRAC_PI_8
    };
    bird.rotation += (target - bird.rotation) * EXIT_TURN_RATE * dt;

    bird.alpha = (1.0 - eased * EXIT_FADE_RATE).max(0.0);
    bird.scale = (bird.scale + (EXIT_SCALE_TARGET - bird.scale) * EXIT_GROW_RATE * dt)
        .min(EXIT_SCALE_TARGET);

    // Invisible or finished, either way the dive is over
    if progress >= 1.0 || bird.alpha <= 0.0 {
        spawn::respawn_far(bird, rng, bounds);
    } else {
        bird.state = FlightState::Exiting {
            progress,
            speed_x,
            speed_y,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EffectSettings;

    const W: f32 = 1280.0;
    const H: f32 = 720.0;

    fn engine(seed: u64) -> EngineState {
        EngineState::new(&EffectSettings::default(), Bounds::new(W, H), seed).unwrap()
    }

    /// Pin the first bird to a known kinematic setup for scenario tests
    fn pin_bird(state: &mut EngineState) -> &mut Bird {
        let bird = &mut state.birds[0];
        bird.pos = glam::Vec2::new(400.0, 300.0);
        bird.drift_anchor = 300.0;
        bird.vx = 1.0;
        bird.drift_speed = 0.0;
        bird.amplitude = 0.0;
        bird.frequency = 0.05;
        bird.phase_time = 0.0;
        bird.z = 0.0;
        bird.vz = 0.1;
        bird.base_scale = 1.0;
        bird.state = FlightState::Flying;
        bird.apply_projection();
        bird
    }

    #[test]
    fn test_advance_rejects_negative_dt() {
        let mut state = engine(1);
        let err = advance(&mut state, -0.5).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_advance_rejects_non_finite_dt() {
        let mut state = engine(1);
        assert!(advance(&mut state, f32::NAN).is_err());
        assert!(advance(&mut state, f32::INFINITY).is_err());
    }

    #[test]
    fn test_zero_dt_is_a_fixpoint() {
        let mut state = engine(3);
        // Settle transients from the randomized spawn first; the extra
        // zero-dt call flushes any anchor re-roll from the last real frame
        for _ in 0..120 {
            advance(&mut state, 1.0).unwrap();
        }
        advance(&mut state, 0.0).unwrap();
        let before = state.renderables();
        advance(&mut state, 0.0).unwrap();
        assert_eq!(state.renderables(), before);
    }

    #[test]
    fn test_near_depth_overshoot_begins_exit() {
        let mut state = engine(5);
        let bird = pin_bird(&mut state);
        bird.vz = -1.0;
        bird.z = Z_NEAR_RESET_THRESHOLD + 0.5;

        advance(&mut state, 1.0).unwrap();

        let bird = &state.birds[0];
        assert!(bird.z < Z_NEAR_RESET_THRESHOLD);
        match bird.state {
            FlightState::Exiting {
                progress,
                speed_x,
                speed_y,
            } => {
                assert_eq!(progress, 0.0);
                assert_eq!(speed_x, 1.0 * 0.3);
                assert!(speed_y >= H / 250.0 && speed_y < H / 250.0 + H / 300.0);
            }
            FlightState::Flying => panic!("bird should be exiting"),
        }
        assert_eq!(bird.vz, -0.01);
    }

    #[test]
    fn test_reduced_motion_skips_exit_dive() {
        let settings = EffectSettings {
            reduced_motion: true,
            ..Default::default()
        };
        let mut state = EngineState::new(&settings, Bounds::new(W, H), 5).unwrap();
        let bird = pin_bird(&mut state);
        bird.vz = -1.0;
        bird.z = Z_NEAR_RESET_THRESHOLD + 0.5;

        advance(&mut state, 1.0).unwrap();

        let bird = &state.birds[0];
        assert_eq!(bird.state, FlightState::Flying);
        assert_eq!(bird.z, Z_REAPPEAR_FAR);
        assert!(bird.vz < 0.0);
    }

    #[test]
    fn test_far_depth_overshoot_recycles_near() {
        let mut state = engine(5);
        let bird = pin_bird(&mut state);
        bird.vz = 1.0;
        bird.z = Z_FAR_PLANE - 0.5;

        advance(&mut state, 1.0).unwrap();

        let bird = &state.birds[0];
        assert_eq!(bird.state, FlightState::Flying);
        assert_eq!(bird.z, Z_REAPPEAR_NEAR);
        assert!(bird.vz > 0.0);
        assert!(bird.pos.x >= 0.0 && bird.pos.x < W);
        assert!(bird.drift_anchor >= 0.0 && bird.drift_anchor < H);
    }

    #[test]
    fn test_horizontal_wrap_is_exact() {
        let mut state = engine(9);
        let bird = pin_bird(&mut state);
        // z = 0, base_scale = 1 projects to scale exactly 1, so the scaled
        // width is the raw sprite width
        bird.vz = 0.0;
        bird.pos.x = W + BIRD_SPRITE_WIDTH + 0.5;

        advance(&mut state, 1.0).unwrap();

        let bird = &state.birds[0];
        assert_eq!(bird.pos.x, -BIRD_SPRITE_WIDTH);
        assert!(bird.drift_anchor >= 0.0 && bird.drift_anchor < H);
    }

    #[test]
    fn test_vertical_wrap_keeps_bob_continuous() {
        let mut state = engine(11);
        let bird = pin_bird(&mut state);
        bird.vz = 0.0;
        bird.amplitude = 20.0;
        bird.drift_anchor = H + 100.0;

        advance(&mut state, 1.0).unwrap();

        let bird = &state.birds[0];
        let sh = bird.scaled_height();
        assert_eq!(bird.pos.y, -sh);
        // The anchor was re-derived so anchor + bob lands exactly on the edge
        let bob = (bird.phase_time * bird.frequency).sin() * bird.amplitude;
        assert!((bird.drift_anchor + bob - bird.pos.y).abs() < 1e-3);
        assert!(bird.pos.x >= 0.0 && bird.pos.x < W);
    }

    #[test]
    fn test_exit_completes_and_respawns_far() {
        let mut state = engine(13);
        let bird = pin_bird(&mut state);
        bird.state = FlightState::Exiting {
            progress: 0.0,
            speed_x: 0.3,
            speed_y: 3.0,
        };

        let mut frames = 0;
        loop {
            advance(&mut state, 1.0).unwrap();
            frames += 1;
            if state.birds[0].state == FlightState::Flying {
                break;
            }
            assert!(frames <= EXIT_DURATION_FRAMES as usize + 1, "dive never completed");
        }

        // The fade hits zero well before the full dive duration
        assert!(frames <= 50);
        let bird = &state.birds[0];
        assert_eq!(bird.z, Z_REAPPEAR_FAR);
        assert!(bird.vz < 0.0);
        assert!(bird.scale >= SCALE_MIN && bird.scale <= SCALE_MAX);
        assert!(bird.alpha >= ALPHA_MIN && bird.alpha <= ALPHA_MAX);
    }

    #[test]
    fn test_exit_scale_never_exceeds_target() {
        let mut state = engine(17);
        let bird = pin_bird(&mut state);
        bird.state = FlightState::Exiting {
            progress: 0.0,
            speed_x: 0.0,
            speed_y: 3.0,
        };
        for _ in 0..30 {
            advance(&mut state, 2.0).unwrap();
            assert!(state.birds[0].scale <= EXIT_SCALE_TARGET);
        }
    }

    #[test]
    fn test_determinism_with_fixed_seed() {
        let mut a = engine(99999);
        let mut b = engine(99999);
        for _ in 0..300 {
            advance(&mut a, 1.0).unwrap();
            advance(&mut b, 1.0).unwrap();
        }
        assert_eq!(a.renderables(), b.renderables());
    }

    #[test]
    fn test_firefly_pool_reshuffles_on_interval() {
        let mut state = engine(21);
        let anchors_before: Vec<glam::Vec2> =
            state.fireflies.iter().map(|f| f.anchor).collect();

        advance(&mut state, FIREFLY_REGEN_INTERVAL).unwrap();

        let anchors_after: Vec<glam::Vec2> =
            state.fireflies.iter().map(|f| f.anchor).collect();
        assert_eq!(anchors_after.len(), anchors_before.len());
        assert_ne!(anchors_before, anchors_after);
        assert!(state.fireflies.iter().all(|f| f.phase_time == 0.0));
    }

    #[test]
    fn test_long_run_keeps_every_bird_in_one_state() {
        let mut state = engine(23);
        for _ in 0..2000 {
            advance(&mut state, 1.0).unwrap();
        }
        for bird in &state.birds {
            match bird.state {
                FlightState::Flying => {
                    assert!(bird.z >= Z_NEAR_RESET_THRESHOLD - 1e-3);
                    assert!(bird.z <= Z_FAR_PLANE + 1e-3);
                }
                FlightState::Exiting { progress, .. } => {
                    assert!((0.0..=1.0).contains(&progress));
                }
            }
        }
    }
}
